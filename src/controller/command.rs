//! Device-Level Commands and Transaction Descriptors.
//!
//! Defines the command vocabulary issued on the command bus and the
//! descriptor carrier for demand transactions. Demand descriptors live in a
//! slab arena owned by the channel controller; every other component holds
//! plain [`TransId`] indices into it, so no descriptor ever outlives the
//! controller that allocated it.

use crate::common::addr::DecodedAddr;
use crate::common::time::SimTime;

/// Enumerated protocol operation. Immutable value, unowned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Command {
    Activate,
    Precharge,
    Read,
    Write,
    RefreshAllBank,
    RefreshSingleBank,
    PowerDownEntry,
    PowerDownExit,
    Nop,
}

impl Command {
    /// Whether the rank must be awake for this command to issue.
    ///
    /// Only the power-down exit itself (and the idle NOP) may be scheduled
    /// while the rank sleeps.
    pub fn requires_awake(self) -> bool {
        !matches!(self, Command::PowerDownExit | Command::Nop)
    }

    pub fn is_refresh(self) -> bool {
        matches!(self, Command::RefreshAllBank | Command::RefreshSingleBank)
    }

    /// Whether this command addresses a single bank (rather than the rank).
    pub fn is_bank_scoped(self) -> bool {
        matches!(
            self,
            Command::Activate | Command::Precharge | Command::Read | Command::Write
        )
    }
}

/// Read or write direction of a demand transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

/// Index of a transaction descriptor in the controller's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransId(pub usize);

/// A demand memory request as issued by an initiator.
///
/// Carries only the routing address and length; no data bytes are modeled.
#[derive(Clone, Copy, Debug)]
pub struct MemRequest {
    pub addr: u64,
    pub kind: AccessKind,
    pub bytes: u32,
}

/// Payload carrier for a transaction inside the subsystem.
///
/// Owned exclusively by the arena; carries the command tag and routing
/// address, never data.
#[derive(Clone, Debug)]
pub struct TransactionDescriptor {
    pub kind: AccessKind,
    pub addr: DecodedAddr,
    pub raw_addr: u64,
    pub bytes: u32,
    pub arrival: SimTime,
    /// Index of the initiator that issued the request.
    pub owner: usize,
}

/// A fully-addressed command candidate.
///
/// Rank-scoped commands (refresh, power-down) leave `bank` at zero and carry
/// no transaction; bank-scoped commands carry the open-row coordinate where
/// relevant so sub-components can reconcile without arena access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandBundle {
    pub command: Command,
    pub rank: usize,
    pub bank: usize,
    pub row: Option<u64>,
    pub trans: Option<TransId>,
}

impl CommandBundle {
    /// Rank-scoped bundle (refresh, power-down).
    pub fn rank_scoped(command: Command, rank: usize) -> Self {
        Self {
            command,
            rank,
            bank: 0,
            row: None,
            trans: None,
        }
    }
}

/// Priority class a proposal competes in.
///
/// Mandatory beats demand beats opportunistic; within a class the arbitrator
/// breaks ties deterministically by collection order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProposalKind {
    Opportunistic,
    Demand,
    Mandatory,
}

/// Cached outcome of one sub-component's `evaluate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proposal {
    pub bundle: CommandBundle,
    pub kind: ProposalKind,
}

impl Proposal {
    /// The no-op proposal: nothing due this round.
    pub fn nop(rank: usize) -> Self {
        Self {
            bundle: CommandBundle::rank_scoped(Command::Nop, rank),
            kind: ProposalKind::Opportunistic,
        }
    }

    pub fn is_nop(&self) -> bool {
        self.bundle.command == Command::Nop
    }
}

/// A command committed by arbitration: irrevocable once observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IssuedCommand {
    pub bundle: CommandBundle,
    pub at: SimTime,
}

/// Slab arena owning all in-flight transaction descriptors.
#[derive(Debug, Default)]
pub struct TransArena {
    slots: Vec<Option<TransactionDescriptor>>,
    free: Vec<usize>,
}

impl TransArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a slot for a descriptor, reusing freed slots first.
    pub fn alloc(&mut self, desc: TransactionDescriptor) -> TransId {
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(desc);
            TransId(idx)
        } else {
            self.slots.push(Some(desc));
            TransId(self.slots.len() - 1)
        }
    }

    /// Borrows a live descriptor.
    ///
    /// # Panics
    ///
    /// Panics if the id does not refer to a live descriptor; ids are only
    /// ever handed out by `alloc` and invalidated by `release`.
    pub fn get(&self, id: TransId) -> &TransactionDescriptor {
        self.slots[id.0].as_ref().expect("stale transaction id")
    }

    /// Removes a descriptor, returning ownership to the caller.
    pub fn release(&mut self, id: TransId) -> TransactionDescriptor {
        let desc = self.slots[id.0].take().expect("stale transaction id");
        self.free.push(id.0);
        desc
    }

    /// Number of live descriptors.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
