//! Error Types.
//!
//! Three error classes exist in the simulator. Configuration errors are fatal
//! at construction: the simulation never starts. Protocol-violation errors
//! are fatal at the moment detected: they signal a modeling gap or a genuine
//! device-limit violation that invalidates all subsequent results. Soft
//! conditions (postponement credit consumption) are expressed purely through
//! state and never surface here.

use crate::common::time::SimTime;
use crate::controller::command::Command;
use thiserror::Error;

/// Fatal construction-time errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported memory generation '{0}': model not included")]
    UnsupportedGeneration(String),

    #[error("refresh policy '{0}' not included")]
    UnsupportedRefreshPolicy(String),

    #[error(
        "invalid refresh flexibility bounds: max_postponed={max_postponed}, \
         max_pulledin={max_pulledin} (both must be positive)"
    )]
    InvalidFlexibilityBounds {
        max_postponed: u32,
        max_pulledin: u32,
    },

    #[error("no traffic initiators specified")]
    NoInitiators,

    #[error("'{0}' is not a valid trace format")]
    InvalidTraceFormat(String),

    #[error("malformed trace line {line}: '{text}'")]
    MalformedTrace { line: usize, text: String },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {reason}")]
    Parse { path: String, reason: String },
}

/// Fatal protocol violations detected during scheduling.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(
        "rank {rank}: mandatory refresh starved at {at} with no postponement \
         credit remaining"
    )]
    RefreshStarved { rank: usize, at: SimTime },

    #[error("rank {rank}: illegal {command:?} reached issuance at {at}")]
    IllegalCommand {
        rank: usize,
        command: Command,
        at: SimTime,
    },
}

/// Top-level simulation errors.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("address {addr:#x} outside simulated memory of {size} bytes")]
    AddressOutOfRange { addr: u64, size: u64 },
}
