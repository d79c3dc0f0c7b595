//! Command Timing Checker.
//!
//! Validates candidate command legality against the timing horizons accrued
//! by previously committed commands. The checker is consulted, never owned,
//! by the arbitration: `earliest_legal` answers when a candidate could issue,
//! `record` advances the horizons once a command is committed.
//!
//! Horizons are tracked per bank (activate, column access, precharge), per
//! rank (activate-to-activate, column turnaround, refresh, power-down), and
//! globally for command-bus occupancy. A sleeping rank accepts nothing but
//! its power-down exit.

use crate::common::time::SimTime;
use crate::controller::command::{Command, CommandBundle};
use crate::memspec::MemSpec;

/// Interface consulted by the arbitration for candidate legality.
pub trait CommandChecker {
    /// Earliest instant the candidate may legally issue.
    ///
    /// `SimTime::NEVER` when the command is categorically illegal in the
    /// current state (e.g. anything but an exit on a sleeping rank).
    fn earliest_legal(&self, bundle: &CommandBundle) -> SimTime;

    /// Advances the timing horizons for a committed command.
    fn record(&mut self, bundle: &CommandBundle, at: SimTime);
}

/// Timing constants the checker needs, copied out of the memory spec.
#[derive(Clone, Debug)]
struct CheckerTimings {
    clk_period: SimTime,
    t_rcd: SimTime,
    t_ras: SimTime,
    t_rp: SimTime,
    t_rc: SimTime,
    t_rrd: SimTime,
    t_ccd: SimTime,
    t_rtp: SimTime,
    t_wr: SimTime,
    t_wtr: SimTime,
    t_rfc: SimTime,
    t_cke: SimTime,
    t_xp: SimTime,
    t_rl: SimTime,
    t_wl: SimTime,
    burst: SimTime,
}

#[derive(Clone, Copy, Debug, Default)]
struct BankTiming {
    next_activate: SimTime,
    next_column: SimTime,
    next_precharge: SimTime,
}

#[derive(Clone, Copy, Debug, Default)]
struct RankTiming {
    next_activate: SimTime,
    next_read: SimTime,
    next_write: SimTime,
    next_refresh: SimTime,
    next_power_down: SimTime,
    asleep: bool,
    wake_earliest: SimTime,
}

/// Concrete checker tracking per-bank and per-rank horizons.
#[derive(Debug)]
pub struct TimingChecker {
    t: CheckerTimings,
    banks_per_rank: usize,
    ranks: Vec<RankTiming>,
    banks: Vec<BankTiming>,
    /// Command-bus occupancy: one command per clock.
    next_command: SimTime,
}

impl TimingChecker {
    pub fn new(spec: &MemSpec) -> Self {
        Self {
            t: CheckerTimings {
                clk_period: spec.clk_period,
                t_rcd: spec.t_rcd,
                t_ras: spec.t_ras,
                t_rp: spec.t_rp,
                t_rc: spec.t_rc,
                t_rrd: spec.t_rrd,
                t_ccd: spec.t_ccd,
                t_rtp: spec.t_rtp,
                t_wr: spec.t_wr,
                t_wtr: spec.t_wtr,
                t_rfc: spec.t_rfc,
                t_cke: spec.t_cke,
                t_xp: spec.t_xp,
                t_rl: spec.t_rl,
                t_wl: spec.t_wl,
                burst: spec.burst_duration,
            },
            banks_per_rank: spec.banks_per_rank,
            ranks: vec![RankTiming::default(); spec.ranks],
            banks: vec![BankTiming::default(); spec.ranks * spec.banks_per_rank],
            next_command: SimTime::ZERO,
        }
    }

    fn bank_index(&self, rank: usize, bank: usize) -> usize {
        rank * self.banks_per_rank + bank
    }

    fn bank_range(&self, rank: usize) -> std::ops::Range<usize> {
        let start = rank * self.banks_per_rank;
        start..start + self.banks_per_rank
    }
}

fn max3(a: SimTime, b: SimTime, c: SimTime) -> SimTime {
    a.max(b).max(c)
}

impl CommandChecker for TimingChecker {
    fn earliest_legal(&self, bundle: &CommandBundle) -> SimTime {
        let rank = &self.ranks[bundle.rank];
        if rank.asleep && bundle.command != Command::PowerDownExit {
            return SimTime::NEVER;
        }

        let bus = self.next_command;
        match bundle.command {
            Command::Activate => {
                let bank = &self.banks[self.bank_index(bundle.rank, bundle.bank)];
                max3(bus, bank.next_activate, rank.next_activate)
            }
            Command::Precharge => {
                let bank = &self.banks[self.bank_index(bundle.rank, bundle.bank)];
                bus.max(bank.next_precharge)
            }
            Command::Read => {
                let bank = &self.banks[self.bank_index(bundle.rank, bundle.bank)];
                max3(bus, bank.next_column, rank.next_read)
            }
            Command::Write => {
                let bank = &self.banks[self.bank_index(bundle.rank, bundle.bank)];
                max3(bus, bank.next_column, rank.next_write)
            }
            Command::RefreshAllBank | Command::RefreshSingleBank => {
                bus.max(rank.next_refresh)
            }
            Command::PowerDownEntry => bus.max(rank.next_power_down),
            Command::PowerDownExit => bus.max(rank.wake_earliest),
            Command::Nop => bus,
        }
    }

    fn record(&mut self, bundle: &CommandBundle, at: SimTime) {
        let t = self.t.clone();
        self.next_command = at + t.clk_period;

        let bank_idx = self.bank_index(bundle.rank, bundle.bank);
        let bank_range = self.bank_range(bundle.rank);
        let rank = &mut self.ranks[bundle.rank];

        match bundle.command {
            Command::Activate => {
                let bank = &mut self.banks[bank_idx];
                bank.next_column = bank.next_column.max(at + t.t_rcd);
                bank.next_precharge = bank.next_precharge.max(at + t.t_ras);
                bank.next_activate = bank.next_activate.max(at + t.t_rc);
                rank.next_activate = rank.next_activate.max(at + t.t_rrd);
            }
            Command::Precharge => {
                let bank = &mut self.banks[bank_idx];
                bank.next_activate = bank.next_activate.max(at + t.t_rp);
                rank.next_refresh = rank.next_refresh.max(at + t.t_rp);
                rank.next_power_down = rank.next_power_down.max(at + t.t_rp);
            }
            Command::Read => {
                let bank = &mut self.banks[bank_idx];
                bank.next_precharge = bank.next_precharge.max(at + t.t_rtp);
                rank.next_read = rank.next_read.max(at + t.t_ccd);
                // Bus turnaround: the write burst may not start until the
                // read data has cleared the strobe.
                rank.next_write = rank.next_write.max(at + t.t_rl + t.burst);
                rank.next_power_down = rank.next_power_down.max(at + t.t_rl + t.burst);
            }
            Command::Write => {
                let bank = &mut self.banks[bank_idx];
                let data_end = at + t.t_wl + t.burst;
                bank.next_precharge = bank.next_precharge.max(data_end + t.t_wr);
                rank.next_write = rank.next_write.max(at + t.t_ccd);
                rank.next_read = rank.next_read.max(data_end + t.t_wtr);
                rank.next_power_down = rank.next_power_down.max(data_end + t.t_wr);
            }
            Command::RefreshAllBank | Command::RefreshSingleBank => {
                for b in &mut self.banks[bank_range] {
                    b.next_activate = b.next_activate.max(at + t.t_rfc);
                }
                rank.next_refresh = rank.next_refresh.max(at + t.t_rfc);
                rank.next_power_down = rank.next_power_down.max(at + t.t_rfc);
            }
            Command::PowerDownEntry => {
                rank.asleep = true;
                rank.wake_earliest = at + t.t_cke;
            }
            Command::PowerDownExit => {
                rank.asleep = false;
                let floor = at + t.t_xp;
                rank.next_activate = rank.next_activate.max(floor);
                rank.next_read = rank.next_read.max(floor);
                rank.next_write = rank.next_write.max(floor);
                rank.next_refresh = rank.next_refresh.max(floor);
                rank.next_power_down = rank.next_power_down.max(floor);
            }
            Command::Nop => {}
        }
    }
}
