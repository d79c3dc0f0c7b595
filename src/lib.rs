//! DRAM Subsystem Timing Simulator Library.
//!
//! This crate implements a time-accurate simulator for a DRAM memory
//! subsystem. It predicts latency, bandwidth, and protocol-legal behavior of
//! DRAM devices under synthetic or replayed traffic, without physical
//! hardware. Traffic initiators issue read/write transactions against the
//! subsystem's transaction endpoint; the simulated controller times and
//! schedules device-level commands according to per-generation timing
//! parameters and protocol rules.
//!
//! # Architecture
//!
//! * **Controller**: per-rank command arbitration over refresh management,
//!   power-down management, and per-bank machines, all sharing one
//!   cooperative-polling scheduler contract.
//! * **Memspec**: immutable per-generation timing and geometry tables
//!   (DDR3/DDR4 provisioned from JSON resources, DDR5 fail-fast placeholder).
//! * **Sim**: single-threaded discrete-event kernel and driver loop.
//! * **Initiators**: traffic generator, trace player, and row hammer.
//!
//! # Modules
//!
//! * `common`: shared types (simulated time, address decode, errors).
//! * `config`: configuration loading and parsing.
//! * `controller`: command scheduling and timing-legality core.
//! * `initiator`: traffic initiator implementations.
//! * `memspec`: per-generation memory specifications.
//! * `sim`: event kernel and simulation driver.
//! * `stats`: simulation statistics collection.
//! * `system`: memory subsystem facade and transaction endpoint.

/// Shared types: simulated time, address decoding, and error handling.
///
/// Provides the fundamental data structures used throughout the simulator,
/// including the picosecond-granularity simulated clock and the decoded
/// rank/bank/row/column address form.
pub mod common;

/// Configuration system for the memory subsystem and traffic setup.
///
/// Loads and parses TOML configuration files selecting the memory
/// specification, controller policies, and traffic initiators.
pub mod config;

/// Memory controller implementation: the command scheduling core.
///
/// Implements the per-rank refresh manager, power-down manager, bank
/// machines, timing checker, and the arbitration round that selects exactly
/// one protocol-legal command per scheduling round.
pub mod controller;

/// Traffic initiator implementations and construction.
///
/// Implements the synthetic traffic generator, the STL trace player, and the
/// row hammer pattern, all behind a uniform polling interface.
pub mod initiator;

/// Per-generation memory specifications (timings and geometry).
///
/// Loads JSON memory specification resources and converts cycle counts into
/// picosecond timings used by the controller and checker.
pub mod memspec;

/// Discrete-event kernel and simulation driver.
///
/// Provides the event queue, the simulation loop, and initiator/termination
/// orchestration.
pub mod sim;

/// Simulation statistics collection and reporting.
///
/// Tracks command counts, refresh flexibility usage, transaction latencies,
/// and bandwidth during simulation execution.
pub mod stats;

/// Memory subsystem facade and transaction endpoint.
///
/// Binds the memory specification and controller into one subsystem instance
/// with an externally-facing request/completion channel.
pub mod system;
