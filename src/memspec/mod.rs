//! Memory Specifications.
//!
//! This module defines the immutable per-generation timing and geometry
//! table consumed by the controller, the timing checker, and the driver.
//! Specifications are provisioned from JSON resource files carrying cycle
//! counts; all timings are stored here in picoseconds (cycles multiplied by
//! the device clock period).
//!
//! Timing correctness of all downstream scheduling depends on having real
//! constants, so constructing an unsupported generation fails fast at build
//! time and never silently runs.

use crate::common::error::ConfigError;
use crate::common::time::{SimTime, TimeInterval};
use crate::controller::command::Command;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// DDR3 timing table provisioning.
pub mod ddr3;

/// DDR4 timing table provisioning.
pub mod ddr4;

/// DDR5 placeholder (model not included).
pub mod ddr5;

/// Supported DRAM generations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generation {
    Ddr3,
    Ddr4,
    Ddr5,
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::Ddr3 => write!(f, "DDR3"),
            Generation::Ddr4 => write!(f, "DDR4"),
            Generation::Ddr5 => write!(f, "DDR5"),
        }
    }
}

/// Raw memory specification file as stored on disk.
#[derive(Debug, Deserialize)]
pub struct RawMemSpecFile {
    pub memspec: RawMemSpec,
}

/// Raw memory specification: geometry plus timings in clock cycles.
#[derive(Debug, Deserialize)]
pub struct RawMemSpec {
    #[serde(rename = "memoryId")]
    pub memory_id: String,

    #[serde(rename = "memoryType")]
    pub memory_type: String,

    pub memarchitecturespec: RawArchSpec,
    pub memtimingspec: RawTimingSpec,
}

#[derive(Debug, Deserialize)]
pub struct RawArchSpec {
    #[serde(rename = "nbrOfRanks")]
    pub ranks: usize,

    #[serde(rename = "nbrOfBanks")]
    pub banks: usize,

    #[serde(rename = "nbrOfRows")]
    pub rows: u64,

    #[serde(rename = "nbrOfColumns")]
    pub columns: u64,

    /// Data width of a single device in bits.
    pub width: u32,

    #[serde(rename = "nbrOfDevices")]
    pub devices: u32,

    #[serde(rename = "burstLength")]
    pub burst_length: u32,

    #[serde(rename = "dataRate")]
    pub data_rate: u32,
}

/// Timing entries in device clock cycles.
#[derive(Debug, Deserialize)]
pub struct RawTimingSpec {
    #[serde(rename = "clkMhz")]
    pub clk_mhz: u64,

    #[serde(rename = "CKE")]
    pub cke: u64,
    #[serde(rename = "XP")]
    pub xp: u64,
    #[serde(rename = "RCD")]
    pub rcd: u64,
    #[serde(rename = "RAS")]
    pub ras: u64,
    #[serde(rename = "RP")]
    pub rp: u64,
    #[serde(rename = "RC")]
    pub rc: u64,
    #[serde(rename = "RRD")]
    pub rrd: u64,
    #[serde(rename = "CCD")]
    pub ccd: u64,
    #[serde(rename = "RTP")]
    pub rtp: u64,
    #[serde(rename = "WR")]
    pub wr: u64,
    #[serde(rename = "WTR")]
    pub wtr: u64,
    #[serde(rename = "RFC")]
    pub rfc: u64,
    #[serde(rename = "REFI")]
    pub refi: u64,
    #[serde(rename = "CL")]
    pub cl: u64,
    #[serde(rename = "WL")]
    pub wl: u64,
}

/// Immutable per-generation timing and geometry table.
///
/// All timing fields are absolute durations in picoseconds. A degenerate
/// table (all timings and capacity zero) backs the unimplemented-generation
/// placeholder and is only reachable through [`MemSpec::placeholder`].
#[derive(Clone, Debug)]
pub struct MemSpec {
    pub memory_id: String,
    pub generation: Generation,

    pub ranks: usize,
    pub banks_per_rank: usize,
    pub rows: u64,
    pub columns: u64,
    pub bus_width_bits: u32,
    pub burst_length: u32,
    pub data_rate: u32,

    pub clk_period: SimTime,
    pub t_cke: SimTime,
    pub t_xp: SimTime,
    pub t_rcd: SimTime,
    pub t_ras: SimTime,
    pub t_rp: SimTime,
    pub t_rc: SimTime,
    pub t_rrd: SimTime,
    pub t_ccd: SimTime,
    pub t_rtp: SimTime,
    pub t_wr: SimTime,
    pub t_wtr: SimTime,
    pub t_rfc: SimTime,
    pub t_refi: SimTime,
    pub t_rl: SimTime,
    pub t_wl: SimTime,

    /// Duration of one full data burst on the bus.
    pub burst_duration: SimTime,
}

impl MemSpec {
    /// Loads a memory specification from a JSON resource file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let raw: RawMemSpecFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::from_raw(raw.memspec)
    }

    /// Builds the specification for the generation named in the raw table.
    ///
    /// Unsupported generations fail here with a named fatal diagnostic.
    pub fn from_raw(raw: RawMemSpec) -> Result<Self, ConfigError> {
        match raw.memory_type.as_str() {
            "DDR3" => ddr3::build(&raw),
            "DDR4" => ddr4::build(&raw),
            "DDR5" => ddr5::build(&raw),
            other => Err(ConfigError::UnsupportedGeneration(other.to_string())),
        }
    }

    /// Degenerate zeroed table for an unimplemented generation.
    ///
    /// All queries answer zero; only reachable in isolation, never through
    /// [`MemSpec::from_raw`], which fails instead.
    pub fn placeholder(generation: Generation) -> Self {
        Self {
            memory_id: String::new(),
            generation,
            ranks: 0,
            banks_per_rank: 0,
            rows: 0,
            columns: 0,
            bus_width_bits: 0,
            burst_length: 0,
            data_rate: 1,
            clk_period: SimTime::ZERO,
            t_cke: SimTime::ZERO,
            t_xp: SimTime::ZERO,
            t_rcd: SimTime::ZERO,
            t_ras: SimTime::ZERO,
            t_rp: SimTime::ZERO,
            t_rc: SimTime::ZERO,
            t_rrd: SimTime::ZERO,
            t_ccd: SimTime::ZERO,
            t_rtp: SimTime::ZERO,
            t_wr: SimTime::ZERO,
            t_wtr: SimTime::ZERO,
            t_rfc: SimTime::ZERO,
            t_refi: SimTime::ZERO,
            t_rl: SimTime::ZERO,
            t_wl: SimTime::ZERO,
            burst_duration: SimTime::ZERO,
        }
    }

    /// Fixed bus/device occupancy of a command.
    ///
    /// For reads and writes, covers the access latency plus `bursts` full
    /// data bursts. Zero for a degenerate table.
    pub fn execution_time(&self, command: Command, bursts: u32) -> SimTime {
        match command {
            Command::Activate => self.t_rcd,
            Command::Precharge => self.t_rp,
            Command::Read => self.t_rl + self.burst_duration * u64::from(bursts.max(1)),
            Command::Write => self.t_wl + self.burst_duration * u64::from(bursts.max(1)),
            Command::RefreshAllBank | Command::RefreshSingleBank => self.t_rfc,
            Command::PowerDownEntry => self.t_cke,
            Command::PowerDownExit => self.t_xp,
            Command::Nop => SimTime::ZERO,
        }
    }

    /// Data-bus occupancy interval of a command, relative to its issuance.
    ///
    /// Only read and write occupy the data strobe.
    pub fn data_strobe_interval(&self, command: Command) -> Option<TimeInterval> {
        match command {
            Command::Read => Some(TimeInterval::new(
                self.t_rl,
                self.t_rl + self.burst_duration,
            )),
            Command::Write => Some(TimeInterval::new(
                self.t_wl,
                self.t_wl + self.burst_duration,
            )),
            _ => None,
        }
    }

    /// Total simulated memory capacity in bytes; zero when degenerate.
    pub fn sim_mem_size_bytes(&self) -> u64 {
        self.ranks as u64
            * self.banks_per_rank as u64
            * self.rows
            * self.columns
            * u64::from(self.bus_width_bits)
            / 8
    }

    /// Nominal all-bank refresh interval (tREFI).
    pub fn refresh_interval_ab(&self) -> SimTime {
        self.t_refi
    }

    /// Bytes transferred by one full-length burst across the whole bus.
    pub fn default_bytes_per_burst(&self) -> u32 {
        self.burst_length * self.bus_width_bits / 8
    }
}

/// Converts a cycle count into picoseconds for the given clock.
pub(crate) fn cycles_to_ps(cycles: u64, clk_mhz: u64) -> SimTime {
    SimTime::from_ps(cycles.saturating_mul(1_000_000 / clk_mhz.max(1)))
}
