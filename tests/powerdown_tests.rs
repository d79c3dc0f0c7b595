//! Integration tests for the power-down manager.

use dram_sim::common::time::SimTime;
use dram_sim::config::{ControllerConfig, PowerDownPolicy};
use dram_sim::controller::command::{
    Command, CommandBundle, IssuedCommand, ProposalKind, TransArena,
};
use dram_sim::controller::powerdown::PowerDownManager;
use dram_sim::controller::scheduler::{CommandScheduler, RankSnapshot, WakeLine};

fn create_manager(policy: PowerDownPolicy) -> PowerDownManager {
    let cfg = ControllerConfig {
        power_down_policy: policy,
        power_down_timeout_ns: 100,
        ..Default::default()
    };
    PowerDownManager::new(&cfg, 0)
}

fn snapshot<'a>(
    now_ns: u64,
    activated_banks: u32,
    queued_demand: bool,
    arena: &'a TransArena,
) -> RankSnapshot<'a> {
    RankSnapshot {
        now: SimTime::from_ns(now_ns),
        activated_banks,
        queued_demand,
        sleeping: false,
        refresh_urgent: false,
        trans: arena,
    }
}

fn rank_issued(command: Command, at_ns: u64) -> IssuedCommand {
    IssuedCommand {
        bundle: CommandBundle::rank_scoped(command, 0),
        at: SimTime::from_ns(at_ns),
    }
}

/// Tests that the off policy never sleeps and never proposes.
#[test]
fn test_off_policy_never_sleeps() {
    let mut mgr = create_manager(PowerDownPolicy::Off);
    let arena = TransArena::new();
    let mut wake = WakeLine::new();

    mgr.evaluate(&snapshot(1_000_000, 0, false, &arena), &mut wake)
        .unwrap();
    assert!(mgr.next_command().is_nop());
    assert!(!mgr.sleeping());
    assert!(mgr.time_for_next_trigger().is_never());
}

/// Tests opportunistic entry after the idle timeout elapses, and that the
/// transition is only taken on the committed command.
#[test]
fn test_entry_after_idle_timeout() {
    let mut mgr = create_manager(PowerDownPolicy::Opportunistic);
    let arena = TransArena::new();
    let mut wake = WakeLine::new();

    // Before the timeout: nothing proposed, the trigger names the deadline.
    mgr.evaluate(&snapshot(50, 0, false, &arena), &mut wake)
        .unwrap();
    assert!(mgr.next_command().is_nop());
    assert_eq!(mgr.time_for_next_trigger(), SimTime::from_ns(100));

    mgr.evaluate(&snapshot(100, 0, false, &arena), &mut wake)
        .unwrap();
    let prop = mgr.next_command();
    assert_eq!(prop.bundle.command, Command::PowerDownEntry);
    assert_eq!(prop.kind, ProposalKind::Opportunistic);
    assert!(!mgr.sleeping());

    mgr.update(&rank_issued(Command::PowerDownEntry, 100));
    assert!(mgr.sleeping());
}

/// Tests that rank activity restarts the idle clock.
#[test]
fn test_activity_restarts_idle_clock() {
    let mut mgr = create_manager(PowerDownPolicy::Opportunistic);
    let arena = TransArena::new();
    let mut wake = WakeLine::new();

    mgr.evaluate(&snapshot(80, 1, true, &arena), &mut wake)
        .unwrap();
    assert!(mgr.next_command().is_nop());

    // Idle again at 100 ns, but the clock restarted at 80 ns.
    mgr.evaluate(&snapshot(100, 0, false, &arena), &mut wake)
        .unwrap();
    assert!(mgr.next_command().is_nop());
    assert_eq!(mgr.time_for_next_trigger(), SimTime::from_ns(180));

    mgr.evaluate(&snapshot(180, 0, false, &arena), &mut wake)
        .unwrap();
    assert_eq!(mgr.next_command().bundle.command, Command::PowerDownEntry);
}

/// Tests the mandatory exit: a latched wake request on a sleeping rank
/// produces the exit proposal, and demand alone does too.
#[test]
fn test_exit_on_wake_request() {
    let mut mgr = create_manager(PowerDownPolicy::Opportunistic);
    let arena = TransArena::new();
    let mut wake = WakeLine::new();
    mgr.update(&rank_issued(Command::PowerDownEntry, 100));
    assert!(mgr.sleeping());

    // Sleeping and quiet: stay down.
    mgr.evaluate(&snapshot(150, 0, false, &arena), &mut wake)
        .unwrap();
    assert!(mgr.next_command().is_nop());

    wake.request();
    mgr.evaluate(&snapshot(200, 0, false, &arena), &mut wake)
        .unwrap();
    let prop = mgr.next_command();
    assert_eq!(prop.bundle.command, Command::PowerDownExit);
    assert_eq!(prop.kind, ProposalKind::Mandatory);

    mgr.update(&rank_issued(Command::PowerDownExit, 200));
    assert!(!mgr.sleeping());

    // The exit restarted the idle clock at 200 ns.
    mgr.evaluate(&snapshot(250, 0, false, &arena), &mut wake)
        .unwrap();
    assert!(mgr.next_command().is_nop());
    assert_eq!(mgr.time_for_next_trigger(), SimTime::from_ns(300));
}

/// Tests that queued demand on a sleeping rank forces the exit even without
/// an explicit wake request.
#[test]
fn test_exit_on_queued_demand() {
    let mut mgr = create_manager(PowerDownPolicy::Opportunistic);
    let arena = TransArena::new();
    let mut wake = WakeLine::new();
    mgr.update(&rank_issued(Command::PowerDownEntry, 100));

    mgr.evaluate(&snapshot(150, 0, true, &arena), &mut wake)
        .unwrap();
    assert_eq!(mgr.next_command().bundle.command, Command::PowerDownExit);
}

/// Tests that refresh urgency blocks an opportunistic entry.
#[test]
fn test_no_entry_while_refresh_urgent() {
    let mut mgr = create_manager(PowerDownPolicy::Opportunistic);
    let arena = TransArena::new();
    let mut wake = WakeLine::new();

    let snap = RankSnapshot {
        now: SimTime::from_ns(500),
        activated_banks: 0,
        queued_demand: false,
        sleeping: false,
        refresh_urgent: true,
        trans: &arena,
    };
    mgr.evaluate(&snap, &mut wake).unwrap();
    assert!(mgr.next_command().is_nop());
}
