//! Simulated Time Primitives.
//!
//! This module defines the discrete-event clock value driving all scheduling
//! decisions. Time is carried as an absolute picosecond count; a distinguished
//! maximum value means "never". All arithmetic saturates so that `NEVER` is
//! absorbing.

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A simulated instant, in picoseconds since the start of the simulation.
///
/// Doubles as "now" and as an expressed deadline. Values are monotonically
/// non-decreasing along the event timeline; the event kernel never delivers
/// an event earlier than the current instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(u64);

impl SimTime {
    /// The start of the simulation.
    pub const ZERO: SimTime = SimTime(0);

    /// Distinguished maximum value meaning "never".
    ///
    /// Reported as a trigger time by sub-components with nothing outstanding.
    pub const NEVER: SimTime = SimTime(u64::MAX);

    pub const fn from_ps(ps: u64) -> Self {
        SimTime(ps)
    }

    pub const fn from_ns(ns: u64) -> Self {
        SimTime(ns.saturating_mul(1_000))
    }

    pub const fn as_ps(self) -> u64 {
        self.0
    }

    pub fn as_ns_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    pub const fn is_never(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<u64> for SimTime {
    type Output = SimTime;

    fn mul(self, rhs: u64) -> SimTime {
        SimTime(self.0.saturating_mul(rhs))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            write!(f, "never")
        } else {
            write!(f, "{} ps", self.0)
        }
    }
}

/// A half-open interval of simulated time.
///
/// Used to express data-strobe occupancy of read and write bursts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: SimTime,
    pub end: SimTime,
}

impl TimeInterval {
    pub fn new(start: SimTime, end: SimTime) -> Self {
        Self { start, end }
    }
}
