//! Integration tests for memory specification provisioning.

use dram_sim::common::time::SimTime;
use dram_sim::controller::command::Command;
use dram_sim::memspec::{Generation, MemSpec, RawMemSpecFile};

fn spec_json(memory_type: &str) -> String {
    format!(
        r#"{{
            "memspec": {{
                "memoryId": "TEST_{memory_type}",
                "memoryType": "{memory_type}",
                "memarchitecturespec": {{
                    "nbrOfRanks": 2,
                    "nbrOfBanks": 16,
                    "nbrOfRows": 65536,
                    "nbrOfColumns": 1024,
                    "width": 8,
                    "nbrOfDevices": 8,
                    "burstLength": 8,
                    "dataRate": 2
                }},
                "memtimingspec": {{
                    "clkMhz": 1600,
                    "CKE": 8, "XP": 10,
                    "RCD": 22, "RAS": 52, "RP": 22, "RC": 74,
                    "RRD": 9, "CCD": 8, "RTP": 12,
                    "WR": 24, "WTR": 12,
                    "RFC": 560, "REFI": 12480,
                    "CL": 22, "WL": 16
                }}
            }}
        }}"#
    )
}

fn parse(memory_type: &str) -> Result<MemSpec, dram_sim::common::error::ConfigError> {
    let raw: RawMemSpecFile = serde_json::from_str(&spec_json(memory_type)).unwrap();
    MemSpec::from_raw(raw.memspec)
}

/// Tests DDR4 provisioning: cycle counts become picoseconds against the
/// device clock and the geometry carries through.
#[test]
fn test_ddr4_provisioning() {
    let spec = parse("DDR4").unwrap();
    assert_eq!(spec.generation, Generation::Ddr4);
    assert_eq!(spec.memory_id, "TEST_DDR4");

    // 1600 MHz clock: one cycle is 625 ps.
    assert_eq!(spec.clk_period, SimTime::from_ps(625));
    assert_eq!(spec.t_rcd, SimTime::from_ps(22 * 625));
    assert_eq!(spec.t_rfc, SimTime::from_ps(560 * 625));
    assert_eq!(spec.t_refi, SimTime::from_ps(12480 * 625));
    assert_eq!(spec.refresh_interval_ab(), spec.t_refi);

    // Burst of 8 at data rate 2 occupies 4 clocks.
    assert_eq!(spec.burst_duration, SimTime::from_ps(4 * 625));

    assert_eq!(spec.ranks, 2);
    assert_eq!(spec.banks_per_rank, 16);
    assert_eq!(spec.bus_width_bits, 64);
    assert_eq!(spec.default_bytes_per_burst(), 64);

    // 2 ranks x 16 banks x 65536 rows x 1024 columns x 8 bytes = 16 GiB.
    assert_eq!(spec.sim_mem_size_bytes(), 16 * 1024 * 1024 * 1024);
}

/// Tests fixed command execution times against the timing table.
#[test]
fn test_execution_time() {
    let spec = parse("DDR4").unwrap();
    assert_eq!(spec.execution_time(Command::Activate, 1), spec.t_rcd);
    assert_eq!(spec.execution_time(Command::Precharge, 1), spec.t_rp);
    assert_eq!(spec.execution_time(Command::RefreshAllBank, 1), spec.t_rfc);
    assert_eq!(spec.execution_time(Command::Nop, 1), SimTime::ZERO);

    // Reads cover the read latency plus the requested bursts.
    assert_eq!(
        spec.execution_time(Command::Read, 2),
        spec.t_rl + spec.burst_duration * 2
    );
    // A zero-burst access still occupies one burst.
    assert_eq!(
        spec.execution_time(Command::Write, 0),
        spec.t_wl + spec.burst_duration
    );
}

/// Tests the data strobe windows of column commands.
#[test]
fn test_data_strobe_interval() {
    let spec = parse("DDR4").unwrap();

    let read = spec.data_strobe_interval(Command::Read).unwrap();
    assert_eq!(read.start, spec.t_rl);
    assert_eq!(read.end, spec.t_rl + spec.burst_duration);

    let write = spec.data_strobe_interval(Command::Write).unwrap();
    assert_eq!(write.start, spec.t_wl);

    assert!(spec.data_strobe_interval(Command::Activate).is_none());
    assert!(spec.data_strobe_interval(Command::RefreshAllBank).is_none());
}

/// Tests the fail-fast construction path for the DDR5 placeholder.
#[test]
fn test_ddr5_fails_at_construction() {
    let err = parse("DDR5").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("DDR5"), "unexpected error: {text}");
    assert!(text.contains("not included"), "unexpected error: {text}");
}

/// Tests that an unknown memory type is rejected by name.
#[test]
fn test_unknown_generation_rejected() {
    let err = parse("LPDDR7").unwrap_err();
    assert!(err.to_string().contains("LPDDR7"));
}

/// Tests that DDR3 rejects a non-eight bank count.
#[test]
fn test_ddr3_rejects_wrong_bank_count() {
    let err = parse("DDR3").unwrap_err();
    assert!(err.to_string().contains("8 banks"));
}

/// Tests the degenerate placeholder table: every query answers zero.
#[test]
fn test_placeholder_answers_zero() {
    let spec = MemSpec::placeholder(Generation::Ddr5);
    assert_eq!(spec.generation, Generation::Ddr5);
    assert_eq!(spec.sim_mem_size_bytes(), 0);
    assert_eq!(spec.refresh_interval_ab(), SimTime::ZERO);
    assert_eq!(spec.execution_time(Command::Read, 4), SimTime::ZERO);
    assert_eq!(spec.execution_time(Command::RefreshAllBank, 1), SimTime::ZERO);
}
