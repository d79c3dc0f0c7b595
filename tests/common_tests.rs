//! Integration tests for the shared time and address primitives.

use dram_sim::common::addr::AddressMapper;
use dram_sim::common::time::SimTime;

/// Tests that NEVER is absorbing under saturating arithmetic.
#[test]
fn test_never_is_absorbing() {
    assert!(SimTime::NEVER.is_never());
    assert!((SimTime::NEVER + SimTime::from_ns(1)).is_never());
    assert!((SimTime::NEVER * 2).is_never());
    assert!(!SimTime::ZERO.is_never());
    assert_eq!(SimTime::from_ns(5) - SimTime::from_ns(9), SimTime::ZERO);
}

/// Tests unit conversions and ordering.
#[test]
fn test_time_conversions() {
    assert_eq!(SimTime::from_ns(3).as_ps(), 3_000);
    assert_eq!(SimTime::from_ps(625).as_ns_f64(), 0.625);
    assert!(SimTime::from_ns(1) < SimTime::from_ns(2));
    assert!(SimTime::from_ns(2) < SimTime::NEVER);
    assert_eq!(format!("{}", SimTime::from_ps(42)), "42 ps");
    assert_eq!(format!("{}", SimTime::NEVER), "never");
}

/// Tests the decode order: column, then bank, then rank, then row.
#[test]
fn test_address_decode_order() {
    // 64-byte bursts, 4 bursts per row, 2 banks, 2 ranks.
    let mapper = AddressMapper::new(64, 4, 2, 2);

    let d = mapper.decode(0);
    assert_eq!((d.rank, d.bank, d.row, d.column), (0, 0, 0, 0));

    // One burst further: next column, same bank.
    let d = mapper.decode(64);
    assert_eq!((d.rank, d.bank, d.row, d.column), (0, 0, 0, 1));

    // Past the last column: next bank, column wraps.
    let d = mapper.decode(4 * 64);
    assert_eq!((d.rank, d.bank, d.row, d.column), (0, 1, 0, 0));

    // Past the last bank: next rank.
    let d = mapper.decode(2 * 4 * 64);
    assert_eq!((d.rank, d.bank, d.row, d.column), (1, 0, 0, 0));

    // Past the last rank: next row.
    let d = mapper.decode(2 * 2 * 4 * 64);
    assert_eq!((d.rank, d.bank, d.row, d.column), (0, 0, 1, 0));
}

/// Tests that sequential traffic walks a whole row before changing bank.
#[test]
fn test_sequential_stays_in_row() {
    let mapper = AddressMapper::new(64, 8, 4, 1);
    let first = mapper.decode(0);
    for i in 0..8 {
        let d = mapper.decode(i * 64);
        assert_eq!(d.bank, first.bank);
        assert_eq!(d.row, first.row);
        assert_eq!(d.column, i);
    }
    assert_ne!(mapper.decode(8 * 64).bank, first.bank);
}

/// Tests the row stride used by the hammer initiator.
#[test]
fn test_row_stride() {
    let mapper = AddressMapper::new(64, 4, 2, 2);
    assert_eq!(mapper.row_stride_bytes(), 64 * 4 * 2 * 2);

    let base = mapper.decode(0);
    let next = mapper.decode(mapper.row_stride_bytes());
    assert_eq!(next.row, base.row + 1);
    assert_eq!(next.bank, base.bank);
    assert_eq!(next.rank, base.rank);
}
