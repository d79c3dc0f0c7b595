//! Scheduling Protocol Contract.
//!
//! Every rank-level controller sub-component — refresh manager, power-down
//! manager, and each bank machine — implements the identical four-operation
//! polling shape defined here. This uniformity lets the arbitrator poll
//! heterogeneous sub-schedulers each round, validate each proposal, select
//! exactly one winning legal command, issue it, and inform **every**
//! sub-component of the outcome: `update` with the committed command is the
//! only mechanism by which a sub-component learns whether its own proposal
//! actually won.
//!
//! Ordering guarantee within one simulated instant: `evaluate` always
//! precedes `next_command`, and `update` for the chosen command always
//! precedes the next `evaluate`. Once committed, a command is irrevocable.

use crate::common::error::ProtocolError;
use crate::common::time::SimTime;
use crate::controller::command::{IssuedCommand, Proposal, TransArena};

/// Immutable per-round view of the rank, captured by the arbitrator after
/// all owner mutations of the previous round have been applied.
///
/// Shared rank state is mutated only by its owner (bank machines own the
/// open-row state, the power-down manager owns the sleep flag); every other
/// sub-component reads it exclusively through this snapshot, so the
/// mutation-before-read ordering is fixed by construction.
pub struct RankSnapshot<'a> {
    /// Current simulated instant.
    pub now: SimTime,
    /// Number of banks in the rank with an open row.
    pub activated_banks: u32,
    /// Whether demand transactions are queued anywhere in the rank.
    pub queued_demand: bool,
    /// Whether the rank is in a power-saving state.
    pub sleeping: bool,
    /// Whether the refresh manager needs the rank quiesced.
    pub refresh_urgent: bool,
    /// Live transaction descriptors, for bank machines inspecting queue heads.
    pub trans: &'a TransArena,
}

/// Wake-up request line into the rank's power-down manager.
///
/// Latched by any sub-component that needs the rank awake; consumed when the
/// power-down exit issues. No command requiring wakefulness may be proposed
/// without the transition having been requested here first.
#[derive(Debug, Default)]
pub struct WakeLine {
    requested: bool,
}

impl WakeLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) {
        self.requested = true;
    }

    pub fn pending(&self) -> bool {
        self.requested
    }

    pub fn clear(&mut self) {
        self.requested = false;
    }
}

/// The uniform four-operation cooperative-polling contract.
pub trait CommandScheduler {
    /// Re-derives this sub-component's decision from the snapshot.
    ///
    /// Caches the resulting proposal and next trigger time; no external side
    /// effects beyond the cache and the wake line. Returns a fatal protocol
    /// violation when a mandatory obligation can no longer be met.
    fn evaluate(
        &mut self,
        snapshot: &RankSnapshot<'_>,
        wake: &mut WakeLine,
    ) -> Result<(), ProtocolError>;

    /// Returns the cached proposal (NOP if none due).
    ///
    /// Idempotent: repeated calls without an intervening `evaluate` or
    /// `update` return the same value.
    fn next_command(&self) -> Proposal;

    /// Informs the sub-component which command actually won this round.
    ///
    /// Implementations must reconcile strictly against the committed
    /// command, never assuming their own proposal executed unless it equals
    /// the committed one.
    fn update(&mut self, issued: &IssuedCommand);

    /// Earliest instant at which this sub-component's decision might change.
    ///
    /// `SimTime::NEVER` when nothing is outstanding. Lets the arbitrator
    /// skip unnecessary evaluation rounds.
    fn time_for_next_trigger(&self) -> SimTime;
}
