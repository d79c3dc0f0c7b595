//! Channel Controller: Command Scheduling Core.
//!
//! The channel controller owns the transaction arena, the timing checker,
//! and one scheduler set per rank (refresh manager, power-down manager, and
//! bank machines). Each arbitration round it captures a per-rank snapshot,
//! evaluates every sub-component through the uniform scheduling contract,
//! validates the collected proposals against the checker, commits exactly
//! one legal command, and informs every sub-component of the outcome.

use crate::common::addr::AddressMapper;
use crate::common::error::{ConfigError, ProtocolError};
use crate::common::time::SimTime;
use crate::config::ControllerConfig;
use crate::memspec::MemSpec;
use crate::stats::SimStats;
use log::debug;

/// Bank machine implementation.
pub mod bank;

/// Command timing checker.
pub mod checker;

/// Command and transaction data model.
pub mod command;

/// Power-down management.
pub mod powerdown;

/// Refresh management.
pub mod refresh;

/// The shared scheduling protocol contract.
pub mod scheduler;

use bank::BankMachine;
use checker::{CommandChecker, TimingChecker};
use command::{
    Command, IssuedCommand, MemRequest, Proposal, TransArena, TransId, TransactionDescriptor,
};
use powerdown::PowerDownManager;
use refresh::RefreshManager;
use scheduler::{CommandScheduler, RankSnapshot, WakeLine};

/// One rank's scheduler set behind the shared polling contract.
pub struct RankScheduler {
    pub refresh: RefreshManager,
    pub powerdown: PowerDownManager,
    pub banks: Vec<BankMachine>,
    pub wake: WakeLine,
}

/// A demand transaction whose data transfer completes at `at`.
#[derive(Clone, Copy, Debug)]
pub struct Completion {
    pub trans: TransId,
    pub owner: usize,
    pub at: SimTime,
}

/// Result of one arbitration round.
#[derive(Debug)]
pub struct RoundOutcome {
    pub issued: Option<IssuedCommand>,
    pub completions: Vec<Completion>,
    /// Earliest instant the next round could change anything;
    /// `SimTime::NEVER` when the controller is fully drained.
    pub next_trigger: SimTime,
}

/// The channel controller: arena, checker, and per-rank schedulers.
pub struct ChannelController {
    spec: MemSpec,
    mapper: AddressMapper,
    arena: TransArena,
    checker: TimingChecker,
    ranks: Vec<RankScheduler>,
}

impl ChannelController {
    /// Builds the controller for the given specification and policies.
    ///
    /// Per-rank refresh managers are constructed here, so invalid refresh
    /// configuration fails before the simulation starts.
    pub fn new(spec: MemSpec, cfg: &ControllerConfig) -> Result<Self, ConfigError> {
        let mut ranks = Vec::with_capacity(spec.ranks);
        for rank in 0..spec.ranks {
            let banks = (0..spec.banks_per_rank)
                .map(|bank| BankMachine::new(rank, bank))
                .collect();
            ranks.push(RankScheduler {
                refresh: RefreshManager::new(cfg, &spec, rank)?,
                powerdown: PowerDownManager::new(cfg, rank),
                banks,
                wake: WakeLine::new(),
            });
        }

        let mapper = AddressMapper::new(
            u64::from(spec.default_bytes_per_burst().max(1)),
            spec.columns / u64::from(spec.burst_length.max(1)),
            spec.banks_per_rank as u64,
            spec.ranks as u64,
        );
        let checker = TimingChecker::new(&spec);

        Ok(Self {
            spec,
            mapper,
            arena: TransArena::new(),
            checker,
            ranks,
        })
    }

    pub fn spec(&self) -> &MemSpec {
        &self.spec
    }

    /// Number of in-flight demand transactions.
    pub fn in_flight(&self) -> usize {
        self.arena.live()
    }

    /// Accepts a demand request, routing it to its bank machine.
    ///
    /// Work arriving on a sleeping rank latches the wake line so the
    /// power-down manager proposes an exit on the next round.
    pub fn push_request(&mut self, req: MemRequest, owner: usize, now: SimTime) -> TransId {
        let addr = self.mapper.decode(req.addr);
        let id = self.arena.alloc(TransactionDescriptor {
            kind: req.kind,
            addr,
            raw_addr: req.addr,
            bytes: req.bytes,
            arrival: now,
            owner,
        });

        let rank = &mut self.ranks[addr.rank];
        rank.banks[addr.bank].enqueue(id);
        if rank.powerdown.sleeping() {
            rank.wake.request();
        }
        debug!(
            "[Ctrl] request {:?} {:#x} -> rank {} bank {} row {} at {}",
            req.kind, req.addr, addr.rank, addr.bank, addr.row, now
        );
        id
    }

    /// Releases a completed transaction's descriptor.
    pub fn complete(&mut self, id: TransId) -> TransactionDescriptor {
        self.arena.release(id)
    }

    /// Runs one arbitration round at the given instant.
    pub fn round(
        &mut self,
        now: SimTime,
        stats: &mut SimStats,
    ) -> Result<RoundOutcome, ProtocolError> {
        let mut candidates: Vec<Proposal> = Vec::new();
        let mut next_trigger = SimTime::NEVER;

        let arena = &self.arena;
        for rank in &mut self.ranks {
            // Owner mutations were applied by previous updates; the snapshot
            // fixes mutation-before-read within this round.
            let activated_banks = rank.banks.iter().filter(|b| b.activated()).count() as u32;
            let queued_demand = rank.banks.iter().any(|b| b.pending() > 0);
            let snapshot = RankSnapshot {
                now,
                activated_banks,
                queued_demand,
                sleeping: rank.powerdown.sleeping(),
                refresh_urgent: rank.refresh.is_urgent(now),
                trans: arena,
            };

            rank.refresh.evaluate(&snapshot, &mut rank.wake)?;
            rank.powerdown.evaluate(&snapshot, &mut rank.wake)?;
            for bank in &mut rank.banks {
                bank.evaluate(&snapshot, &mut rank.wake)?;
            }

            let refresh_prop = rank.refresh.next_command();
            if !refresh_prop.is_nop() {
                candidates.push(refresh_prop);
            }
            for bank in &rank.banks {
                let prop = bank.next_command();
                if !prop.is_nop() {
                    candidates.push(prop);
                }
            }
            let pd_prop = rank.powerdown.next_command();
            if !pd_prop.is_nop() {
                candidates.push(pd_prop);
            }

            next_trigger = next_trigger
                .min(rank.refresh.time_for_next_trigger())
                .min(rank.powerdown.time_for_next_trigger());
        }

        // Select the highest-priority candidate issueable now; collection
        // order breaks ties deterministically.
        let mut winner: Option<Proposal> = None;
        for prop in &candidates {
            let earliest = self.checker.earliest_legal(&prop.bundle);
            if earliest <= now {
                match winner {
                    Some(w) if w.kind >= prop.kind => {}
                    _ => winner = Some(*prop),
                }
            } else if !earliest.is_never() {
                next_trigger = next_trigger.min(earliest);
            }
        }

        let mut outcome = RoundOutcome {
            issued: None,
            completions: Vec::new(),
            next_trigger,
        };

        if let Some(prop) = winner {
            let bundle = prop.bundle;
            if bundle.command.requires_awake() && self.ranks[bundle.rank].powerdown.sleeping() {
                return Err(ProtocolError::IllegalCommand {
                    rank: bundle.rank,
                    command: bundle.command,
                    at: now,
                });
            }

            self.checker.record(&bundle, now);
            let issued = IssuedCommand { bundle, at: now };
            debug!(
                "[Ctrl] issue {:?} rank {} bank {} at {}",
                bundle.command, bundle.rank, bundle.bank, now
            );

            // Every sub-component observes the committed command; this is
            // the only way a proposer learns whether it won.
            for rank in &mut self.ranks {
                rank.refresh.update(&issued);
                rank.powerdown.update(&issued);
                for bank in &mut rank.banks {
                    bank.update(&issued);
                }
            }
            if bundle.command == Command::PowerDownExit {
                self.ranks[bundle.rank].wake.clear();
            }

            self.count_command(&bundle, stats);

            if let (Command::Read | Command::Write, Some(id)) = (bundle.command, bundle.trans) {
                let desc = self.arena.get(id);
                let burst_bytes = self.spec.default_bytes_per_burst().max(1);
                let bursts = desc.bytes.div_ceil(burst_bytes);
                let done = now + self.spec.execution_time(bundle.command, bursts);
                outcome.completions.push(Completion {
                    trans: id,
                    owner: desc.owner,
                    at: done,
                });
            }

            outcome.issued = Some(issued);
            // The command bus frees after one clock; re-arbitrate then.
            outcome.next_trigger = now + self.spec.clk_period;
        }

        Ok(outcome)
    }

    fn count_command(&self, bundle: &command::CommandBundle, stats: &mut SimStats) {
        match bundle.command {
            Command::Activate => stats.cmd_activate += 1,
            Command::Precharge => stats.cmd_precharge += 1,
            Command::Read => stats.cmd_read += 1,
            Command::Write => stats.cmd_write += 1,
            Command::RefreshAllBank => stats.cmd_refresh_ab += 1,
            Command::RefreshSingleBank => stats.cmd_refresh_sb += 1,
            Command::PowerDownEntry => stats.cmd_power_down_entry += 1,
            Command::PowerDownExit => stats.cmd_power_down_exit += 1,
            Command::Nop => {}
        }
    }

    /// Folds sub-component counters into the statistics at end of run.
    pub fn harvest_stats(&self, stats: &mut SimStats) {
        for rank in &self.ranks {
            stats.refreshes_postponed += rank.refresh.postponed_total();
            stats.refreshes_pulled_in += rank.refresh.pulled_in_total();
        }
    }

    /// Test and diagnostic access to a rank's scheduler set.
    pub fn rank(&self, rank: usize) -> &RankScheduler {
        &self.ranks[rank]
    }
}
