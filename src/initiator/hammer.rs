//! Row Hammer Pattern.
//!
//! Issues a stream of reads alternating between two rows a configurable
//! increment apart, forcing an activate on every access. Used to exercise
//! worst-case row-conflict scheduling.

use crate::common::addr::AddressMapper;
use crate::common::time::SimTime;
use crate::config::{clk_period_ps, HammerConfig};
use crate::controller::command::{AccessKind, MemRequest, TransId};
use crate::initiator::Initiator;
use crate::memspec::MemSpec;

pub struct RowHammer {
    name: String,
    total: u64,
    issued: u64,
    completed: u64,
    interval: SimTime,
    next_at: SimTime,
    row_increment: u64,
    row_stride: u64,
    bytes: u32,
}

impl RowHammer {
    pub fn new(cfg: &HammerConfig, spec: &MemSpec, bytes_per_burst: u32) -> Self {
        // Stride between addresses one row apart comes from the channel's
        // address geometry, so hammered addresses land on the decode the
        // controller actually performs.
        let mapper = AddressMapper::new(
            u64::from(spec.default_bytes_per_burst().max(1)),
            spec.columns / u64::from(spec.burst_length.max(1)),
            spec.banks_per_rank as u64,
            spec.ranks as u64,
        );
        let row_stride = mapper.row_stride_bytes();

        Self {
            name: cfg.name.clone(),
            total: cfg.num_requests,
            issued: 0,
            completed: 0,
            interval: SimTime::from_ps(clk_period_ps(cfg.clk_mhz)),
            next_at: SimTime::ZERO,
            row_increment: cfg.row_increment.max(1),
            row_stride,
            bytes: bytes_per_burst.max(1),
        }
    }
}

impl Initiator for RowHammer {
    fn name(&self) -> &str {
        &self.name
    }

    fn total_requests(&self) -> u64 {
        self.total
    }

    fn next_request(&mut self, now: SimTime) -> Option<MemRequest> {
        if self.issued >= self.total || now < self.next_at {
            return None;
        }
        // Alternate between the base row and the incremented row.
        let row = (self.issued % 2) * self.row_increment;
        let addr = row * self.row_stride;
        self.issued += 1;
        self.next_at = now + self.interval;
        Some(MemRequest {
            addr,
            kind: AccessKind::Read,
            bytes: self.bytes,
        })
    }

    fn next_wake(&self) -> SimTime {
        if self.issued >= self.total {
            SimTime::NEVER
        } else {
            self.next_at
        }
    }

    fn request_done(&mut self, _id: TransId, _now: SimTime) {
        self.completed += 1;
    }

    fn finished(&self) -> bool {
        self.completed >= self.total
    }
}
