//! Traffic Initiators.
//!
//! External collaborators that drive the subsystem's transaction endpoint.
//! The driver polls each initiator for its next request, binds the request
//! to the endpoint, and reports completions back; an initiator is finished
//! when every request it will ever issue has completed.

use crate::common::error::ConfigError;
use crate::common::time::SimTime;
use crate::config::InitiatorConfig;
use crate::controller::command::{MemRequest, TransId};
use crate::memspec::MemSpec;
use std::path::Path;

/// Synthetic traffic generator.
pub mod generator;

/// Row hammer pattern.
pub mod hammer;

/// STL trace player.
pub mod player;

/// Uniform polling interface every initiator implements.
pub trait Initiator {
    /// User-facing name, for logging and reports.
    fn name(&self) -> &str;

    /// Total number of requests this initiator will issue.
    fn total_requests(&self) -> u64;

    /// Returns the next request if one is ready at `now`.
    ///
    /// `None` when the initiator is pacing, flow-blocked, or done; the
    /// driver re-polls at `next_wake` or on a completion.
    fn next_request(&mut self, now: SimTime) -> Option<MemRequest>;

    /// Earliest instant a new request could become ready.
    ///
    /// `SimTime::NEVER` while blocked on completions or when done.
    fn next_wake(&self) -> SimTime;

    /// Reports a previously-issued request's completion.
    fn request_done(&mut self, id: TransId, now: SimTime);

    /// Whether all requests have been issued and completed.
    fn finished(&self) -> bool;
}

/// Builds every configured initiator against the given specification.
///
/// Trace players resolve their files against `<resource_dir>/traces`; an
/// unknown trace extension is a configuration error.
pub fn build(
    configs: &[InitiatorConfig],
    spec: &MemSpec,
    resource_dir: &Path,
) -> Result<Vec<Box<dyn Initiator>>, ConfigError> {
    let mem_size = spec.sim_mem_size_bytes();
    let bytes_per_burst = spec.default_bytes_per_burst();

    let mut initiators: Vec<Box<dyn Initiator>> = Vec::with_capacity(configs.len());
    for config in configs {
        match config {
            InitiatorConfig::Generator(cfg) => {
                initiators.push(Box::new(generator::TrafficGenerator::new(
                    cfg,
                    mem_size,
                    bytes_per_burst,
                )));
            }
            InitiatorConfig::Player(cfg) => {
                let path = crate::config::trace_path(resource_dir, &cfg.name);
                initiators.push(Box::new(player::StlPlayer::from_file(
                    cfg,
                    &path,
                    bytes_per_burst,
                )?));
            }
            InitiatorConfig::Hammer(cfg) => {
                initiators.push(Box::new(hammer::RowHammer::new(
                    cfg,
                    spec,
                    bytes_per_burst,
                )));
            }
        }
    }
    Ok(initiators)
}
