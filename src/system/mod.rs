//! Memory Subsystem Facade.
//!
//! Binds the memory specification and the channel controller into one
//! subsystem instance and exposes the transaction endpoint on which demand
//! requests arrive and completions are signaled at simulated-time
//! granularity.

use crate::common::error::{ProtocolError, SimError};
use crate::common::time::SimTime;
use crate::config::SimConfig;
use crate::controller::command::{MemRequest, TransId, TransactionDescriptor};
use crate::controller::{ChannelController, RoundOutcome};
use crate::memspec::MemSpec;
use crate::stats::SimStats;
use std::path::Path;

/// One built memory subsystem: specification plus controller.
pub struct MemorySystem {
    ctrl: ChannelController,
}

impl MemorySystem {
    /// Builds a subsystem from configuration.
    ///
    /// Loads the memory specification resource named in the configuration
    /// (fails fast for unsupported generations) and constructs the per-rank
    /// schedulers (fails fast for invalid policies or flexibility bounds).
    pub fn new(config: &SimConfig, resource_dir: &Path) -> Result<Self, SimError> {
        let spec = MemSpec::from_file(&resource_dir.join(&config.memspec.file))?;
        Self::with_spec(spec, config)
    }

    /// Builds a subsystem around an already-constructed specification.
    pub fn with_spec(spec: MemSpec, config: &SimConfig) -> Result<Self, SimError> {
        let ctrl = ChannelController::new(spec, &config.controller)?;
        Ok(Self { ctrl })
    }

    pub fn spec(&self) -> &MemSpec {
        self.ctrl.spec()
    }

    /// Number of in-flight demand transactions.
    pub fn in_flight(&self) -> usize {
        self.ctrl.in_flight()
    }

    /// Transaction endpoint: accepts a demand request at the given instant.
    ///
    /// The address is validated against the simulated capacity before the
    /// decoded descriptor is routed to its bank machine.
    pub fn push_request(
        &mut self,
        req: MemRequest,
        owner: usize,
        now: SimTime,
    ) -> Result<TransId, SimError> {
        let size = self.ctrl.spec().sim_mem_size_bytes();
        if req.addr >= size {
            return Err(SimError::AddressOutOfRange {
                addr: req.addr,
                size,
            });
        }
        Ok(self.ctrl.push_request(req, owner, now))
    }

    /// Runs one arbitration round.
    pub fn round(
        &mut self,
        now: SimTime,
        stats: &mut SimStats,
    ) -> Result<RoundOutcome, ProtocolError> {
        self.ctrl.round(now, stats)
    }

    /// Signals a transaction's completion, releasing its descriptor.
    pub fn complete(&mut self, id: TransId) -> TransactionDescriptor {
        self.ctrl.complete(id)
    }

    /// Folds controller-internal counters into the statistics.
    pub fn harvest_stats(&self, stats: &mut SimStats) {
        self.ctrl.harvest_stats(stats);
    }
}
