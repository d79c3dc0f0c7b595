//! Refresh Management.
//!
//! Per-rank state machine deciding when refresh-class commands are due,
//! postponable, or pullable-in, and reporting the next decision deadline.
//!
//! The flexibility counter is a bounded signed ledger of issued-minus-accrued
//! refreshes: every elapsed nominal interval (tREFI) decrements it, every
//! issued all-bank refresh increments it. Postponing a refresh therefore
//! leaves the counter negative (a refresh is owed and stays armed until the
//! rank allows it); issuing one early leaves it positive. The invariant
//! `-max_postponed <= counter <= max_pulledin` holds at every observable
//! point, and running out of postponement room with the rank still busy is a
//! fatal protocol violation, never retried.

use crate::common::error::{ConfigError, ProtocolError};
use crate::common::time::SimTime;
use crate::config::{ControllerConfig, RefreshPolicy};
use crate::controller::command::{
    Command, CommandBundle, IssuedCommand, Proposal, ProposalKind,
};
use crate::controller::scheduler::{CommandScheduler, RankSnapshot, WakeLine};
use crate::memspec::MemSpec;
use log::debug;

/// Refresh manager state.
///
/// `PulledIn` marks the window following an early, credit-consuming refresh;
/// it reverts to `Regular` once the next nominal deadline arrives and is
/// treated as repaid by the early issuance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshState {
    Regular,
    PulledIn,
}

/// Closed set of per-rank refresh policies, chosen at configuration time.
///
/// Same-bank refresh is not included in this build and fails at
/// construction, mirroring the unsupported-generation pattern.
#[derive(Debug)]
pub enum RefreshManager {
    AllBank(AllBankRefresh),
    Disabled(DisabledRefresh),
}

impl RefreshManager {
    /// Builds the policy selected in the configuration.
    ///
    /// Non-positive flexibility bounds are a configuration error reported at
    /// build time.
    pub fn new(cfg: &ControllerConfig, spec: &MemSpec, rank: usize) -> Result<Self, ConfigError> {
        match cfg.refresh_policy {
            RefreshPolicy::AllBank => {
                if cfg.max_postponed == 0 || cfg.max_pulledin == 0 {
                    return Err(ConfigError::InvalidFlexibilityBounds {
                        max_postponed: cfg.max_postponed,
                        max_pulledin: cfg.max_pulledin,
                    });
                }
                Ok(RefreshManager::AllBank(AllBankRefresh::new(
                    rank,
                    spec.refresh_interval_ab(),
                    spec.t_rfc,
                    cfg.refresh_management,
                    cfg.max_postponed as i32,
                    cfg.max_pulledin as i32,
                )))
            }
            RefreshPolicy::SameBank => Err(ConfigError::UnsupportedRefreshPolicy(
                "SameBank".to_string(),
            )),
            RefreshPolicy::Disabled => Ok(RefreshManager::Disabled(DisabledRefresh::new(rank))),
        }
    }

    /// Whether the rank must quiesce so an obligatory refresh can issue.
    ///
    /// True when a refresh is owed, or a deadline is imminent with no
    /// postponement room left. Bank machines stop activating and close open
    /// rows while this holds, which is what keeps the fatal starvation
    /// branch unreachable under demand traffic.
    pub fn is_urgent(&self, now: SimTime) -> bool {
        match self {
            RefreshManager::AllBank(m) => m.is_urgent(now),
            RefreshManager::Disabled(_) => false,
        }
    }

    /// Current flexibility counter value.
    pub fn flexibility_counter(&self) -> i32 {
        match self {
            RefreshManager::AllBank(m) => m.counter,
            RefreshManager::Disabled(_) => 0,
        }
    }

    /// Current manager state.
    pub fn state(&self) -> RefreshState {
        match self {
            RefreshManager::AllBank(m) => m.state,
            RefreshManager::Disabled(_) => RefreshState::Regular,
        }
    }

    /// Total refresh deadlines that elapsed unserved, whether the rank was
    /// busy or asleep (postponement credit spent).
    pub fn postponed_total(&self) -> u64 {
        match self {
            RefreshManager::AllBank(m) => m.postponed_total,
            RefreshManager::Disabled(_) => 0,
        }
    }

    /// Total refreshes issued early on pull-in credit.
    pub fn pulled_in_total(&self) -> u64 {
        match self {
            RefreshManager::AllBank(m) => m.pulled_in_total,
            RefreshManager::Disabled(_) => 0,
        }
    }
}

impl CommandScheduler for RefreshManager {
    fn evaluate(
        &mut self,
        snapshot: &RankSnapshot<'_>,
        wake: &mut WakeLine,
    ) -> Result<(), ProtocolError> {
        match self {
            RefreshManager::AllBank(m) => m.evaluate(snapshot, wake),
            RefreshManager::Disabled(m) => m.evaluate(snapshot, wake),
        }
    }

    fn next_command(&self) -> Proposal {
        match self {
            RefreshManager::AllBank(m) => m.next_command(),
            RefreshManager::Disabled(m) => m.next_command(),
        }
    }

    fn update(&mut self, issued: &IssuedCommand) {
        match self {
            RefreshManager::AllBank(m) => m.update(issued),
            RefreshManager::Disabled(m) => m.update(issued),
        }
    }

    fn time_for_next_trigger(&self) -> SimTime {
        match self {
            RefreshManager::AllBank(m) => m.time_for_next_trigger(),
            RefreshManager::Disabled(m) => m.time_for_next_trigger(),
        }
    }
}

/// All-bank refresh with bounded postpone/pull-in flexibility.
#[derive(Debug)]
pub struct AllBankRefresh {
    rank: usize,
    t_refi: SimTime,
    /// Lead time before a hard deadline at which urgency is asserted, so
    /// open rows can be closed before the accrual check runs.
    urgency_lead: SimTime,
    flexibility: bool,
    max_postponed: i32,
    max_pulledin: i32,

    state: RefreshState,
    counter: i32,
    next_deadline: SimTime,

    cached: Proposal,
    trigger: SimTime,

    postponed_total: u64,
    pulled_in_total: u64,
}

impl AllBankRefresh {
    fn new(
        rank: usize,
        t_refi: SimTime,
        urgency_lead: SimTime,
        flexibility: bool,
        max_postponed: i32,
        max_pulledin: i32,
    ) -> Self {
        Self {
            rank,
            t_refi,
            urgency_lead,
            flexibility,
            max_postponed,
            max_pulledin,
            state: RefreshState::Regular,
            counter: 0,
            next_deadline: t_refi,
            cached: Proposal::nop(rank),
            trigger: t_refi,
            postponed_total: 0,
            pulled_in_total: 0,
        }
    }

    /// Postponement room: how far below zero the counter may go.
    fn postpone_limit(&self) -> i32 {
        if self.flexibility {
            self.max_postponed
        } else {
            0
        }
    }

    fn is_urgent(&self, now: SimTime) -> bool {
        let exhausted = self.counter <= -self.postpone_limit();
        exhausted && (self.counter < 0 || now + self.urgency_lead >= self.next_deadline)
    }

    fn refresh_proposal(&self, kind: ProposalKind) -> Proposal {
        Proposal {
            bundle: CommandBundle::rank_scoped(Command::RefreshAllBank, self.rank),
            kind,
        }
    }

    fn check_invariant(&self) {
        debug_assert!(
            -self.max_postponed <= self.counter && self.counter <= self.max_pulledin,
            "flexibility counter {} out of [{}, {}]",
            self.counter,
            -self.max_postponed,
            self.max_pulledin
        );
    }

    fn evaluate(
        &mut self,
        snapshot: &RankSnapshot<'_>,
        wake: &mut WakeLine,
    ) -> Result<(), ProtocolError> {
        let limit = self.postpone_limit();

        // Accrue every nominal deadline reached since the last round. An
        // interval covered by an earlier pull-in consumes the banked credit
        // and ends the pulled-in window.
        while snapshot.now >= self.next_deadline {
            if self.counter - 1 < -limit {
                // No postponement room left: the refresh bound to this
                // deadline must issue at this very instant.
                if snapshot.activated_banks > 0 {
                    return Err(ProtocolError::RefreshStarved {
                        rank: self.rank,
                        at: snapshot.now,
                    });
                }
                // Leave the deadline due; the proposal below covers it and
                // update() advances the deadline on confirmation.
                break;
            }
            self.counter -= 1;
            // An idle awake rank serves the accrued deadline in this same
            // round; a busy or sleeping rank leaves it owed, which is a
            // postponement.
            if self.counter < 0 && (snapshot.activated_banks > 0 || snapshot.sleeping) {
                self.postponed_total += 1;
                debug!(
                    "[Refresh] rank {}: deadline {} postponed (counter {})",
                    self.rank, self.next_deadline, self.counter
                );
            }
            if self.state == RefreshState::PulledIn {
                self.state = RefreshState::Regular;
            }
            self.next_deadline = self.next_deadline + self.t_refi;
        }
        self.check_invariant();

        let due = self.counter < 0 || snapshot.now >= self.next_deadline;

        self.cached = if snapshot.sleeping {
            // A sleeping rank must wake before any command issues.
            if due {
                wake.request();
            }
            Proposal::nop(self.rank)
        } else if due {
            if snapshot.activated_banks == 0 {
                self.refresh_proposal(ProposalKind::Mandatory)
            } else {
                // Credit already accounted in the accrual above; the owed
                // refresh stays armed for the next round.
                Proposal::nop(self.rank)
            }
        } else if self.flexibility
            && self.counter < self.max_pulledin
            && snapshot.activated_banks == 0
            && !snapshot.queued_demand
        {
            // Optional pull-in: bank a refresh early while the rank idles.
            self.refresh_proposal(ProposalKind::Opportunistic)
        } else {
            Proposal::nop(self.rank)
        };

        // Wake early enough for the quiesce when no credit remains.
        self.trigger = if self.counter <= -limit && snapshot.now + self.urgency_lead < self.next_deadline
        {
            self.next_deadline - self.urgency_lead
        } else {
            self.next_deadline
        };
        Ok(())
    }

    fn next_command(&self) -> Proposal {
        self.cached
    }

    fn update(&mut self, issued: &IssuedCommand) {
        if issued.bundle.rank != self.rank {
            return;
        }
        if issued.bundle.command == Command::RefreshAllBank {
            if self.counter < 0 {
                // Repays an owed interval.
                self.counter += 1;
            } else if issued.at >= self.next_deadline {
                // On-time nominal refresh consumes the due deadline directly.
                self.next_deadline = self.next_deadline + self.t_refi;
            } else {
                // Confirmed early issuance: spend pull-in credit.
                self.counter += 1;
                self.state = RefreshState::PulledIn;
                self.pulled_in_total += 1;
                debug!(
                    "[Refresh] rank {}: pulled in at {} (counter {})",
                    self.rank, issued.at, self.counter
                );
            }
            self.check_invariant();
        }
    }

    fn time_for_next_trigger(&self) -> SimTime {
        self.trigger
    }
}

/// Refresh disabled: never proposes, never triggers.
#[derive(Debug)]
pub struct DisabledRefresh {
    cached: Proposal,
}

impl DisabledRefresh {
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

    fn next_command(&self) -> Proposal {
        self.cached
    }

    fn update(&mut self, _issued: &IssuedCommand) {}

    fn time_for_next_trigger(&self) -> SimTime {
        SimTime::NEVER
    }
}
