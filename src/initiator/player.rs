//! STL Trace Player.
//!
//! Replays a recorded transaction trace against the subsystem. The file
//! extension selects the timestamp mode: `.stl` carries absolute cycle
//! counts, `.rstl` carries cycle deltas relative to the previous entry. Any
//! other extension is a configuration error.
//!
//! Line format: `<cycle>: <read|write> <0xaddr>`; blank lines and lines
//! starting with `#` are ignored.

use crate::common::error::ConfigError;
use crate::common::time::SimTime;
use crate::config::{clk_period_ps, PlayerConfig};
use crate::controller::command::{AccessKind, MemRequest, TransId};
use crate::initiator::Initiator;
use std::fs;
use std::path::Path;

/// Timestamp interpretation of a trace file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceType {
    Absolute,
    Relative,
}

#[derive(Clone, Copy, Debug)]
struct TraceEntry {
    at: SimTime,
    kind: AccessKind,
    addr: u64,
}

#[derive(Debug)]
pub struct StlPlayer {
    name: String,
    entries: Vec<TraceEntry>,
    next_idx: usize,
    completed: u64,
    bytes: u32,
}

impl StlPlayer {
    /// Loads a trace file, dispatching on its extension.
    pub fn from_file(
        cfg: &PlayerConfig,
        path: &Path,
        bytes_per_burst: u32,
    ) -> Result<Self, ConfigError> {
        let trace_type = match path.extension().and_then(|e| e.to_str()) {
            Some("stl") => TraceType::Absolute,
            Some("rstl") => TraceType::Relative,
            other => {
                return Err(ConfigError::InvalidTraceFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&cfg.name, &content, cfg.clk_mhz, trace_type, bytes_per_burst)
    }

    /// Parses trace text into a player.
    pub fn from_str(
        name: &str,
        content: &str,
        clk_mhz: u64,
        trace_type: TraceType,
        bytes_per_burst: u32,
    ) -> Result<Self, ConfigError> {
        let period = clk_period_ps(clk_mhz);
        let mut entries = Vec::new();
        let mut last = 0u64;

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let malformed = || ConfigError::MalformedTrace {
                line: lineno + 1,
                text: raw.to_string(),
            };

            let (cycle_text, rest) = line.split_once(':').ok_or_else(malformed)?;
            let cycle: u64 = cycle_text.trim().parse().map_err(|_| malformed())?;
            let mut fields = rest.split_whitespace();
            let kind = match fields.next().ok_or_else(malformed)? {
                "read" => AccessKind::Read,
                "write" => AccessKind::Write,
                _ => return Err(malformed()),
            };
            let addr_text = fields.next().ok_or_else(malformed)?;
            let addr_text = addr_text.strip_prefix("0x").unwrap_or(addr_text);
            let addr = u64::from_str_radix(addr_text, 16).map_err(|_| malformed())?;
            if fields.next().is_some() {
                return Err(malformed());
            }

            let absolute_cycle = match trace_type {
                TraceType::Absolute => cycle,
                TraceType::Relative => {
                    last = last.saturating_add(cycle);
                    last
                }
            };
            entries.push(TraceEntry {
                at: SimTime::from_ps(absolute_cycle.saturating_mul(period)),
                kind,
                addr,
            });
        }

        Ok(Self {
            name: name.to_string(),
            entries,
            next_idx: 0,
            completed: 0,
            bytes: bytes_per_burst.max(1),
        })
    }

    /// Number of parsed trace entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Initiator for StlPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn total_requests(&self) -> u64 {
        self.entries.len() as u64
    }

    fn next_request(&mut self, now: SimTime) -> Option<MemRequest> {
        let entry = self.entries.get(self.next_idx)?;
        if entry.at > now {
            return None;
        }
        let req = MemRequest {
            addr: entry.addr,
            kind: entry.kind,
            bytes: self.bytes,
        };
        self.next_idx += 1;
        Some(req)
    }

    fn next_wake(&self) -> SimTime {
        match self.entries.get(self.next_idx) {
            Some(entry) => entry.at,
            None => SimTime::NEVER,
        }
    }

    fn request_done(&mut self, _id: TransId, _now: SimTime) {
        self.completed += 1;
    }

    fn finished(&self) -> bool {
        self.completed >= self.entries.len() as u64
    }
}
