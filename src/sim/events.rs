//! Discrete-Event Queue.
//!
//! A binary heap of pending events ordered by simulated time, with a
//! monotonically increasing sequence number breaking ties so events at the
//! same instant execute in insertion order.

use crate::common::time::SimTime;
use crate::controller::command::TransId;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Kinds of events the simulation loop dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    /// Poll initiator `i` for its next request.
    Poll(usize),
    /// Run one controller arbitration round.
    Round,
    /// A demand transaction's data transfer finishes.
    Complete(TransId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    time: SimTime,
    seq: u64,
    kind: EventKind,
}

/// Time-ordered event queue; FIFO within one simulated instant.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: SimTime, kind: EventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { time, seq, kind }));
    }

    /// Removes and returns the earliest pending event.
    pub fn pop(&mut self) -> Option<(SimTime, EventKind)> {
        self.heap.pop().map(|Reverse(e)| (e.time, e.kind))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
