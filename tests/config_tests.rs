//! Integration tests for configuration loading.

use dram_sim::config::{
    clk_period_ps, AddressPattern, InitiatorConfig, PowerDownPolicy, RefreshPolicy, SimConfig,
};

const FULL_CONFIG: &str = r#"
[simulation]
name = "full"
max_time_ns = 5000

[memspec]
file = "memspecs/ddr4-3200.json"

[controller]
refresh_policy = "AllBank"
refresh_management = false
max_postponed = 4
max_pulledin = 2
power_down_policy = "Opportunistic"
power_down_timeout_ns = 500

[[initiators]]
type = "generator"
name = "gen0"
num_requests = 1000
clk_mhz = 800
read_fraction = 0.75
pattern = "Sequential"
seed = 7
max_pending = 8

[[initiators]]
type = "player"
name = "boot.stl"

[[initiators]]
type = "hammer"
name = "hammer0"
num_requests = 50
row_increment = 3
"#;

/// Tests a fully-specified configuration file.
#[test]
fn test_full_config() {
    let cfg = SimConfig::from_str(FULL_CONFIG).unwrap();
    assert_eq!(cfg.simulation.name, "full");
    assert_eq!(cfg.simulation.max_time_ns, 5000);
    assert_eq!(cfg.memspec.file, "memspecs/ddr4-3200.json");

    assert_eq!(cfg.controller.refresh_policy, RefreshPolicy::AllBank);
    assert!(!cfg.controller.refresh_management);
    assert_eq!(cfg.controller.max_postponed, 4);
    assert_eq!(cfg.controller.max_pulledin, 2);
    assert_eq!(cfg.controller.power_down_policy, PowerDownPolicy::Opportunistic);
    assert_eq!(cfg.controller.power_down_timeout_ns, 500);

    assert_eq!(cfg.initiators.len(), 3);
    match &cfg.initiators[0] {
        InitiatorConfig::Generator(g) => {
            assert_eq!(g.name, "gen0");
            assert_eq!(g.num_requests, 1000);
            assert_eq!(g.clk_mhz, 800);
            assert_eq!(g.read_fraction, 0.75);
            assert_eq!(g.pattern, AddressPattern::Sequential);
            assert_eq!(g.seed, 7);
            assert_eq!(g.max_pending, Some(8));
        }
        other => panic!("expected generator, got {other:?}"),
    }
    match &cfg.initiators[2] {
        InitiatorConfig::Hammer(h) => {
            assert_eq!(h.num_requests, 50);
            assert_eq!(h.row_increment, 3);
        }
        other => panic!("expected hammer, got {other:?}"),
    }

    cfg.validate().unwrap();
}

/// Tests that omitted sections and fields fall back to their defaults.
#[test]
fn test_defaults() {
    let cfg = SimConfig::from_str(
        r#"
[memspec]
file = "memspecs/ddr4-3200.json"

[[initiators]]
type = "generator"
name = "gen0"
num_requests = 10
"#,
    )
    .unwrap();

    assert_eq!(cfg.simulation.max_time_ns, 0);
    assert_eq!(cfg.controller.refresh_policy, RefreshPolicy::AllBank);
    assert!(cfg.controller.refresh_management);
    assert_eq!(cfg.controller.max_postponed, 8);
    assert_eq!(cfg.controller.max_pulledin, 8);
    assert_eq!(cfg.controller.power_down_policy, PowerDownPolicy::Off);

    match &cfg.initiators[0] {
        InitiatorConfig::Generator(g) => {
            assert_eq!(g.clk_mhz, 1600);
            assert_eq!(g.read_fraction, 0.5);
            assert_eq!(g.pattern, AddressPattern::Random);
            assert_eq!(g.seed, 42);
            assert_eq!(g.max_pending, None);
        }
        other => panic!("expected generator, got {other:?}"),
    }
}

/// Tests that a configuration without initiators fails validation.
#[test]
fn test_no_initiators_rejected() {
    let cfg = SimConfig::from_str(
        r#"
[memspec]
file = "memspecs/ddr4-3200.json"
"#,
    )
    .unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("no traffic initiators"));
}

/// Tests malformed TOML and an unknown initiator type.
#[test]
fn test_parse_errors() {
    assert!(SimConfig::from_str("not toml at all [").is_err());
    assert!(SimConfig::from_str(
        r#"
[memspec]
file = "x.json"

[[initiators]]
type = "oracle"
name = "o"
"#,
    )
    .is_err());
}

/// Tests the initiator clock conversion.
#[test]
fn test_clk_period() {
    assert_eq!(clk_period_ps(1600), 625);
    assert_eq!(clk_period_ps(800), 1250);
    // A zero clock must not divide by zero.
    assert_eq!(clk_period_ps(0), 1_000_000);
}
