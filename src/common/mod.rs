//! Common utilities and types used throughout the DRAM subsystem simulator.
//!
//! This module provides the fundamental types for simulated time, address
//! decoding, and error handling that are shared across the controller, the
//! event kernel, and the traffic initiators.

/// Address decoding into rank/bank/row/column coordinates.
pub mod addr;

/// Error types for configuration, protocol, and simulation failures.
pub mod error;

/// Simulated time primitives.
pub mod time;

pub use addr::{AddressMapper, DecodedAddr};
pub use error::{ConfigError, ProtocolError, SimError};
pub use time::{SimTime, TimeInterval};
