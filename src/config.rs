//! Simulation Configuration.
//!
//! Loads the TOML base configuration selecting the memory specification
//! resource, the controller policies, and the traffic initiator setup.

use crate::common::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_CLK_MHZ: u64 = 1600;
const DEFAULT_MAX_POSTPONED: u32 = 8;
const DEFAULT_MAX_PULLEDIN: u32 = 8;
const DEFAULT_PD_TIMEOUT_NS: u64 = 200;

#[derive(Debug, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub memspec: MemSpecConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub initiators: Vec<InitiatorConfig>,
}

impl SimConfig {
    /// Loads and parses a configuration file.
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_str(&content).map_err(|reason| ConfigError::Parse {
            path: path.to_string(),
            reason,
        })
    }

    /// Parses a configuration from TOML text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Checks constraints not expressible in the type structure.
    ///
    /// A simulation without traffic initiators can never terminate through
    /// the counted-completion mechanism, so it is rejected up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initiators.is_empty() {
            return Err(ConfigError::NoInitiators);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub name: String,
    /// Hard simulated-time limit in nanoseconds; 0 means unlimited.
    pub max_time_ns: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: "dram-sim".to_string(),
            max_time_ns: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MemSpecConfig {
    /// Memory specification JSON, relative to the resource directory.
    pub file: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub refresh_policy: RefreshPolicy,
    /// Enables the postpone/pull-in refresh flexibility mechanism.
    pub refresh_management: bool,
    pub max_postponed: u32,
    pub max_pulledin: u32,
    pub power_down_policy: PowerDownPolicy,
    /// Rank idle time before an opportunistic power-down entry.
    pub power_down_timeout_ns: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            refresh_policy: RefreshPolicy::AllBank,
            refresh_management: true,
            max_postponed: DEFAULT_MAX_POSTPONED,
            max_pulledin: DEFAULT_MAX_PULLEDIN,
            power_down_policy: PowerDownPolicy::Off,
            power_down_timeout_ns: DEFAULT_PD_TIMEOUT_NS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RefreshPolicy {
    AllBank,
    SameBank,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PowerDownPolicy {
    Off,
    Opportunistic,
}

/// Traffic initiator setup, one table per initiator.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InitiatorConfig {
    Generator(GeneratorConfig),
    Player(PlayerConfig),
    Hammer(HammerConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub name: String,
    pub num_requests: u64,

    #[serde(default = "default_clk_mhz")]
    pub clk_mhz: u64,

    #[serde(default = "default_read_fraction")]
    pub read_fraction: f64,

    #[serde(default)]
    pub pattern: AddressPattern,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Flow control: requests in flight before the generator stalls.
    #[serde(default)]
    pub max_pending: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AddressPattern {
    #[default]
    Random,
    Sequential,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    /// Trace file name inside the resource trace directory. The extension
    /// selects the timestamp mode: `.stl` absolute, `.rstl` relative.
    pub name: String,

    #[serde(default = "default_clk_mhz")]
    pub clk_mhz: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HammerConfig {
    pub name: String,
    pub num_requests: u64,

    #[serde(default = "default_clk_mhz")]
    pub clk_mhz: u64,

    #[serde(default = "default_row_increment")]
    pub row_increment: u64,
}

fn default_clk_mhz() -> u64 {
    DEFAULT_CLK_MHZ
}

fn default_read_fraction() -> f64 {
    0.5
}

fn default_seed() -> u64 {
    42
}

fn default_row_increment() -> u64 {
    1
}

/// Picosecond period of an initiator clock given in MHz.
pub fn clk_period_ps(clk_mhz: u64) -> u64 {
    1_000_000 / clk_mhz.max(1)
}

/// Resolves a trace file name inside the resource directory.
pub fn trace_path(resource_dir: &Path, name: &str) -> std::path::PathBuf {
    resource_dir.join("traces").join(name)
}
