//! Power-Down Management.
//!
//! Owns the rank's sleep flag. The opportunistic policy enters power-down
//! after the rank has been idle for a configured timeout and exits when a
//! sub-component latches the wake line or demand arrives. While the rank
//! sleeps only the power-down exit may be scheduled, so every other
//! sub-component must request the transition before proposing work.

use crate::common::error::ProtocolError;
use crate::common::time::SimTime;
use crate::config::{ControllerConfig, PowerDownPolicy};
use crate::controller::command::{
    Command, CommandBundle, IssuedCommand, Proposal, ProposalKind,
};
use crate::controller::scheduler::{CommandScheduler, RankSnapshot, WakeLine};
use log::debug;

/// Closed set of per-rank power-down policies.
#[derive(Debug)]
pub enum PowerDownManager {
    Off(OffPowerDown),
    Opportunistic(OpportunisticPowerDown),
}

impl PowerDownManager {
    pub fn new(cfg: &ControllerConfig, rank: usize) -> Self {
        match cfg.power_down_policy {
            PowerDownPolicy::Off => PowerDownManager::Off(OffPowerDown::new(rank)),
            PowerDownPolicy::Opportunistic => {
                PowerDownManager::Opportunistic(OpportunisticPowerDown::new(
                    rank,
                    SimTime::from_ns(cfg.power_down_timeout_ns),
                ))
            }
        }
    }

    /// Whether the rank is currently in a power-saving state.
    pub fn sleeping(&self) -> bool {
        match self {
            PowerDownManager::Off(_) => false,
            PowerDownManager::Opportunistic(m) => m.sleeping,
        }
    }
}

impl CommandScheduler for PowerDownManager {
    fn evaluate(
        &mut self,
        snapshot: &RankSnapshot<'_>,
        wake: &mut WakeLine,
    ) -> Result<(), ProtocolError> {
        match self {
            PowerDownManager::Off(m) => m.evaluate(snapshot, wake),
            PowerDownManager::Opportunistic(m) => m.evaluate(snapshot, wake),
        }
    }

    fn next_command(&self) -> Proposal {
        match self {
            PowerDownManager::Off(m) => m.cached,
            PowerDownManager::Opportunistic(m) => m.cached,
        }
    }

    fn update(&mut self, issued: &IssuedCommand) {
        match self {
            PowerDownManager::Off(_) => {}
            PowerDownManager::Opportunistic(m) => m.update(issued),
        }
    }

    fn time_for_next_trigger(&self) -> SimTime {
        match self {
            PowerDownManager::Off(_) => SimTime::NEVER,
            PowerDownManager::Opportunistic(m) => m.trigger,
        }
    }
}

/// Power-down disabled: the rank never sleeps.
#[derive(Debug)]
pub struct OffPowerDown {
    cached: Proposal,
}

impl OffPowerDown {
    fn new(rank: usize) -> Self {
        Self {
            cached: Proposal::nop(rank),
        }
    }

    fn evaluate(
        &mut self,
        _snapshot: &RankSnapshot<'_>,
        _wake: &mut WakeLine,
    ) -> Result<(), ProtocolError> {
        Ok(())
    }
}

/// Enters power-down after a configured idle timeout.
#[derive(Debug)]
pub struct OpportunisticPowerDown {
    rank: usize,
    timeout: SimTime,
    sleeping: bool,
    idle_since: SimTime,
    cached: Proposal,
    trigger: SimTime,
}

impl OpportunisticPowerDown {
    fn new(rank: usize, timeout: SimTime) -> Self {
        Self {
            rank,
            timeout,
            sleeping: false,
            idle_since: SimTime::ZERO,
            cached: Proposal::nop(rank),
            trigger: SimTime::ZERO + timeout,
        }
    }

    fn evaluate(
        &mut self,
        snapshot: &RankSnapshot<'_>,
        wake: &mut WakeLine,
    ) -> Result<(), ProtocolError> {
        self.trigger = SimTime::NEVER;
        self.cached = if self.sleeping {
            if wake.pending() || snapshot.queued_demand {
                Proposal {
                    bundle: CommandBundle::rank_scoped(Command::PowerDownExit, self.rank),
                    kind: ProposalKind::Mandatory,
                }
            } else {
                Proposal::nop(self.rank)
            }
        } else if snapshot.activated_banks == 0
            && !snapshot.queued_demand
            && !snapshot.refresh_urgent
        {
            if snapshot.now >= self.idle_since + self.timeout {
                Proposal {
                    bundle: CommandBundle::rank_scoped(Command::PowerDownEntry, self.rank),
                    kind: ProposalKind::Opportunistic,
                }
            } else {
                self.trigger = self.idle_since + self.timeout;
                Proposal::nop(self.rank)
            }
        } else {
            // The rank is working; restart the idle clock.
            self.idle_since = snapshot.now;
            Proposal::nop(self.rank)
        };
        Ok(())
    }

    fn update(&mut self, issued: &IssuedCommand) {
        if issued.bundle.rank != self.rank {
            return;
        }
        match issued.bundle.command {
            Command::PowerDownEntry => {
                self.sleeping = true;
                debug!("[PowerDown] rank {}: entry at {}", self.rank, issued.at);
            }
            Command::PowerDownExit => {
                self.sleeping = false;
                self.idle_since = issued.at;
                debug!("[PowerDown] rank {}: exit at {}", self.rank, issued.at);
            }
            Command::Nop => {}
            _ => {
                self.idle_since = issued.at;
            }
        }
    }
}
