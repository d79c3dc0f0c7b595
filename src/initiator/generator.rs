//! Synthetic Traffic Generator.
//!
//! Issues a configured number of read/write requests with random or
//! sequential addresses at a fixed clock rate, with optional max-pending
//! flow control. Fully deterministic under a configured seed.

use crate::common::time::SimTime;
use crate::config::{clk_period_ps, AddressPattern, GeneratorConfig};
use crate::controller::command::{AccessKind, MemRequest, TransId};
use crate::initiator::Initiator;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct TrafficGenerator {
    name: String,
    total: u64,
    issued: u64,
    completed: u64,
    pending: u32,
    max_pending: Option<u32>,

    interval: SimTime,
    next_at: SimTime,

    rng: Pcg64Mcg,
    pattern: AddressPattern,
    read_fraction: f64,
    mem_size: u64,
    bytes: u32,
    seq_addr: u64,
}

impl TrafficGenerator {
    pub fn new(cfg: &GeneratorConfig, mem_size: u64, bytes_per_burst: u32) -> Self {
        Self {
            name: cfg.name.clone(),
            total: cfg.num_requests,
            issued: 0,
            completed: 0,
            pending: 0,
            max_pending: cfg.max_pending,
            interval: SimTime::from_ps(clk_period_ps(cfg.clk_mhz)),
            next_at: SimTime::ZERO,
            rng: Pcg64Mcg::seed_from_u64(cfg.seed),
            pattern: cfg.pattern,
            read_fraction: cfg.read_fraction,
            mem_size,
            bytes: bytes_per_burst.max(1),
            seq_addr: 0,
        }
    }

    fn blocked(&self) -> bool {
        matches!(self.max_pending, Some(max) if self.pending >= max)
    }

    fn next_addr(&mut self) -> u64 {
        let slots = (self.mem_size / u64::from(self.bytes)).max(1);
        match self.pattern {
            AddressPattern::Random => self.rng.gen_range(0..slots) * u64::from(self.bytes),
            AddressPattern::Sequential => {
                let addr = self.seq_addr;
                self.seq_addr = (self.seq_addr + u64::from(self.bytes)) % self.mem_size.max(1);
                addr
            }
        }
    }
}

impl Initiator for TrafficGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn total_requests(&self) -> u64 {
        self.total
    }

    fn next_request(&mut self, now: SimTime) -> Option<MemRequest> {
        if self.issued >= self.total || self.blocked() || now < self.next_at {
            return None;
        }
        let kind = if self.rng.gen::<f64>() < self.read_fraction {
            AccessKind::Read
        } else {
            AccessKind::Write
        };
        let addr = self.next_addr();
        self.issued += 1;
        self.pending += 1;
        self.next_at = now + self.interval;
        Some(MemRequest {
            addr,
            kind,
            bytes: self.bytes,
        })
    }

    fn next_wake(&self) -> SimTime {
        if self.issued >= self.total || self.blocked() {
            SimTime::NEVER
        } else {
            self.next_at
        }
    }

    fn request_done(&mut self, _id: TransId, _now: SimTime) {
        self.pending = self.pending.saturating_sub(1);
        self.completed += 1;
    }

    fn finished(&self) -> bool {
        self.completed >= self.total
    }
}
