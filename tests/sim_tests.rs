//! Integration tests for the event queue and full simulation runs.

use dram_sim::common::time::SimTime;
use dram_sim::config::{AddressPattern, GeneratorConfig, SimConfig};
use dram_sim::controller::command::TransId;
use dram_sim::initiator::generator::TrafficGenerator;
use dram_sim::initiator::Initiator;
use dram_sim::memspec::{MemSpec, RawMemSpecFile};
use dram_sim::sim::events::{EventKind, EventQueue};
use dram_sim::sim::Simulator;
use dram_sim::system::MemorySystem;

const DDR4_JSON: &str = r#"{
    "memspec": {
        "memoryId": "TEST_DDR4",
        "memoryType": "DDR4",
        "memarchitecturespec": {
            "nbrOfRanks": 2,
            "nbrOfBanks": 16,
            "nbrOfRows": 65536,
            "nbrOfColumns": 1024,
            "width": 8,
            "nbrOfDevices": 8,
            "burstLength": 8,
            "dataRate": 2
        },
        "memtimingspec": {
            "clkMhz": 1600,
            "CKE": 8, "XP": 10,
            "RCD": 22, "RAS": 52, "RP": 22, "RC": 74,
            "RRD": 9, "CCD": 8, "RTP": 12,
            "WR": 24, "WTR": 12,
            "RFC": 560, "REFI": 12480,
            "CL": 22, "WL": 16
        }
    }
}"#;

fn create_spec() -> MemSpec {
    let raw: RawMemSpecFile = serde_json::from_str(DDR4_JSON).unwrap();
    MemSpec::from_raw(raw.memspec).unwrap()
}

fn create_config() -> SimConfig {
    SimConfig::from_str(
        r#"
[memspec]
file = "unused.json"

[[initiators]]
type = "generator"
name = "gen0"
num_requests = 1
"#,
    )
    .unwrap()
}

fn generator(num_requests: u64, clk_mhz: u64, spec: &MemSpec) -> Box<dyn Initiator> {
    let cfg = GeneratorConfig {
        name: "gen0".to_string(),
        num_requests,
        clk_mhz,
        read_fraction: 0.5,
        pattern: AddressPattern::Random,
        seed: 42,
        max_pending: None,
    };
    Box::new(TrafficGenerator::new(
        &cfg,
        spec.sim_mem_size_bytes(),
        spec.default_bytes_per_burst(),
    ))
}

/// Tests time ordering with FIFO delivery within one instant.
#[test]
fn test_event_queue_ordering() {
    let mut queue = EventQueue::new();
    queue.push(SimTime::from_ns(10), EventKind::Round);
    queue.push(SimTime::from_ns(5), EventKind::Poll(0));
    queue.push(SimTime::from_ns(10), EventKind::Poll(1));
    queue.push(SimTime::from_ns(10), EventKind::Complete(TransId(3)));
    assert_eq!(queue.len(), 4);

    assert_eq!(queue.pop(), Some((SimTime::from_ns(5), EventKind::Poll(0))));
    assert_eq!(queue.pop(), Some((SimTime::from_ns(10), EventKind::Round)));
    assert_eq!(queue.pop(), Some((SimTime::from_ns(10), EventKind::Poll(1))));
    assert_eq!(
        queue.pop(),
        Some((SimTime::from_ns(10), EventKind::Complete(TransId(3))))
    );
    assert!(queue.pop().is_none());
    assert!(queue.is_empty());
}

/// Tests the transaction endpoint's address validation.
#[test]
fn test_address_out_of_range() {
    let spec = create_spec();
    let size = spec.sim_mem_size_bytes();
    let mut system = MemorySystem::with_spec(spec, &create_config()).unwrap();

    let req = dram_sim::controller::command::MemRequest {
        addr: size,
        kind: dram_sim::controller::command::AccessKind::Read,
        bytes: 64,
    };
    let err = system.push_request(req, 0, SimTime::ZERO).unwrap_err();
    assert!(err.to_string().contains("outside simulated memory"));
    // A rejected request must not enter the transaction arena.
    assert_eq!(system.in_flight(), 0);

    let ok = dram_sim::controller::command::MemRequest {
        addr: 0,
        kind: dram_sim::controller::command::AccessKind::Read,
        bytes: 64,
    };
    system.push_request(ok, 0, SimTime::ZERO).unwrap();
    assert_eq!(system.in_flight(), 1);
}

/// Tests a full run with counted termination: every request issued by the
/// generator completes and the event loop stops on its own.
#[test]
fn test_run_to_counted_termination() {
    let spec = create_spec();
    let system = MemorySystem::with_spec(spec.clone(), &create_config()).unwrap();
    let initiators = vec![generator(50, 1600, &spec)];

    let mut sim = Simulator::with_parts(system, initiators, SimTime::NEVER);
    assert_eq!(sim.total_requests(), 50);
    sim.run().unwrap();

    let stats = sim.stats();
    assert_eq!(stats.requests_read + stats.requests_write, 50);
    assert_eq!(stats.completed_reads + stats.completed_writes, 50);
    assert_eq!(stats.cmd_read + stats.cmd_write, 50);
    // Every column access needs its row opened at least once.
    assert!(stats.cmd_activate >= 1);
    assert!(stats.sim_time > SimTime::ZERO);
    // A completion can never precede its own column access.
    assert!(stats.latency_min_ps > 0);
}

/// Tests that a run spanning several nominal refresh intervals issues
/// refreshes while traffic is in flight.
#[test]
fn test_refresh_issues_during_long_run() {
    let spec = create_spec();
    let t_refi = spec.refresh_interval_ab();
    let system = MemorySystem::with_spec(spec.clone(), &create_config()).unwrap();
    // 5 MHz pacing: 50 requests stretch over 10 us, past tREFI (7.8 us).
    let initiators = vec![generator(50, 5, &spec)];

    let mut sim = Simulator::with_parts(system, initiators, SimTime::NEVER);
    sim.run().unwrap();

    let stats = sim.stats();
    assert_eq!(stats.completed_reads + stats.completed_writes, 50);
    assert!(stats.sim_time > t_refi);
    assert!(stats.cmd_refresh_ab >= 1);
}

/// Tests the simulated-time limit: the loop stops at the limit with the
/// workload unfinished.
#[test]
fn test_max_time_limit() {
    let spec = create_spec();
    let system = MemorySystem::with_spec(spec.clone(), &create_config()).unwrap();
    let initiators = vec![generator(10_000, 1600, &spec)];

    let mut sim = Simulator::with_parts(system, initiators, SimTime::from_ns(100));
    sim.run().unwrap();

    let stats = sim.stats();
    assert!(stats.sim_time <= SimTime::from_ns(100));
    assert!(stats.completed_reads + stats.completed_writes < 10_000);
}

/// Tests two concurrent initiators sharing the channel.
#[test]
fn test_two_initiators_share_channel() {
    let spec = create_spec();
    let system = MemorySystem::with_spec(spec.clone(), &create_config()).unwrap();
    let initiators = vec![generator(20, 1600, &spec), generator(30, 800, &spec)];

    let mut sim = Simulator::with_parts(system, initiators, SimTime::NEVER);
    assert_eq!(sim.total_requests(), 50);
    sim.run().unwrap();

    let stats = sim.stats();
    assert_eq!(stats.completed_reads + stats.completed_writes, 50);
}
