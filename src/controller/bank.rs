//! Bank Machines.
//!
//! One machine per bank owns the bank's open-row state and a FIFO of demand
//! transactions routed to it. Each round the machine proposes the next step
//! for its queue head: activate a closed row, read or write on a row hit, or
//! precharge on a row conflict. While the refresh manager reports urgency
//! the machine quiesces: it stops activating and closes its open row so the
//! all-bank refresh can issue.

use crate::common::error::ProtocolError;
use crate::common::time::SimTime;
use crate::controller::command::{
    AccessKind, Command, CommandBundle, IssuedCommand, Proposal, ProposalKind, TransId,
};
use crate::controller::scheduler::{CommandScheduler, RankSnapshot, WakeLine};
use std::collections::VecDeque;

/// Per-bank activation state and demand queue.
#[derive(Debug)]
pub struct BankMachine {
    rank: usize,
    bank: usize,
    open_row: Option<u64>,
    queue: VecDeque<TransId>,
    cached: Proposal,
}

impl BankMachine {
    pub fn new(rank: usize, bank: usize) -> Self {
        Self {
            rank,
            bank,
            open_row: None,
            queue: VecDeque::new(),
            cached: Proposal::nop(rank),
        }
    }

    /// Whether this bank has an open row.
    pub fn activated(&self) -> bool {
        self.open_row.is_some()
    }

    pub fn open_row(&self) -> Option<u64> {
        self.open_row
    }

    /// Number of queued demand transactions.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Routes a decoded demand transaction to this bank.
    pub fn enqueue(&mut self, id: TransId) {
        self.queue.push_back(id);
    }

    fn demand(&self, command: Command, row: Option<u64>, trans: Option<TransId>) -> Proposal {
        Proposal {
            bundle: CommandBundle {
                command,
                rank: self.rank,
                bank: self.bank,
                row,
                trans,
            },
            kind: ProposalKind::Demand,
        }
    }
}

impl CommandScheduler for BankMachine {
    fn evaluate(
        &mut self,
        snapshot: &RankSnapshot<'_>,
        wake: &mut WakeLine,
    ) -> Result<(), ProtocolError> {
        self.cached = if let Some(&head) = self.queue.front() {
            if snapshot.sleeping {
                // Work arrived on a sleeping rank: request the transition,
                // propose nothing until the rank wakes.
                wake.request();
                Proposal::nop(self.rank)
            } else if snapshot.refresh_urgent {
                match self.open_row {
                    Some(row) => self.demand(Command::Precharge, Some(row), None),
                    None => Proposal::nop(self.rank),
                }
            } else {
                let desc = snapshot.trans.get(head);
                match self.open_row {
                    Some(row) if row == desc.addr.row => {
                        let command = match desc.kind {
                            AccessKind::Read => Command::Read,
                            AccessKind::Write => Command::Write,
                        };
                        self.demand(command, Some(row), Some(head))
                    }
                    Some(row) => self.demand(Command::Precharge, Some(row), None),
                    None => self.demand(Command::Activate, Some(desc.addr.row), Some(head)),
                }
            }
        } else if snapshot.refresh_urgent && self.open_row.is_some() {
            // Idle bank holding a row open while a refresh is owed.
            self.demand(Command::Precharge, self.open_row, None)
        } else {
            Proposal::nop(self.rank)
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
        match issued.bundle.command {
            Command::Activate if issued.bundle.bank == self.bank => {
                self.open_row = issued.bundle.row;
            }
            Command::Precharge if issued.bundle.bank == self.bank => {
                self.open_row = None;
            }
            Command::Read | Command::Write if issued.bundle.bank == self.bank => {
                if issued.bundle.trans.is_some() && issued.bundle.trans == self.queue.front().copied()
                {
                    self.queue.pop_front();
                }
            }
            Command::RefreshAllBank => {
                debug_assert!(
                    self.open_row.is_none(),
                    "all-bank refresh committed with bank {} row open",
                    self.bank
                );
            }
            _ => {}
        }
    }

    fn time_for_next_trigger(&self) -> SimTime {
        // Bank decisions change only through committed commands or new
        // demand, both of which schedule rounds themselves.
        SimTime::NEVER
    }
}
