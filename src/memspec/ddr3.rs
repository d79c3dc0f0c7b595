//! DDR3 Memory Specification.
//!
//! Converts a raw DDR3 JSON table into the picosecond timing table used by
//! the controller. DDR3 devices carry eight banks per rank and, like DDR4,
//! transfer on both clock edges with a burst length of eight.

use crate::common::error::ConfigError;
use crate::common::time::SimTime;
use crate::memspec::{cycles_to_ps, Generation, MemSpec, RawMemSpec};

/// Builds a DDR3 specification from its raw table.
pub(crate) fn build(raw: &RawMemSpec) -> Result<MemSpec, ConfigError> {
    let arch = &raw.memarchitecturespec;
    let t = &raw.memtimingspec;
    let mhz = t.clk_mhz;

    if arch.banks != 8 {
        return Err(ConfigError::Parse {
            path: raw.memory_id.clone(),
            reason: format!("DDR3 devices have 8 banks per rank, got {}", arch.banks),
        });
    }

    let clk_period = cycles_to_ps(1, mhz);
    let burst_duration = SimTime::from_ps(
        clk_period.as_ps() * u64::from(arch.burst_length) / u64::from(arch.data_rate.max(1)),
    );

    Ok(MemSpec {
        memory_id: raw.memory_id.clone(),
        generation: Generation::Ddr3,
        ranks: arch.ranks,
        banks_per_rank: arch.banks,
        rows: arch.rows,
        columns: arch.columns,
        bus_width_bits: arch.width * arch.devices,
        burst_length: arch.burst_length,
        data_rate: arch.data_rate,
        clk_period,
        t_cke: cycles_to_ps(t.cke, mhz),
        t_xp: cycles_to_ps(t.xp, mhz),
        t_rcd: cycles_to_ps(t.rcd, mhz),
        t_ras: cycles_to_ps(t.ras, mhz),
        t_rp: cycles_to_ps(t.rp, mhz),
        t_rc: cycles_to_ps(t.rc, mhz),
        t_rrd: cycles_to_ps(t.rrd, mhz),
        t_ccd: cycles_to_ps(t.ccd, mhz),
        t_rtp: cycles_to_ps(t.rtp, mhz),
        t_wr: cycles_to_ps(t.wr, mhz),
        t_wtr: cycles_to_ps(t.wtr, mhz),
        t_rfc: cycles_to_ps(t.rfc, mhz),
        t_refi: cycles_to_ps(t.refi, mhz),
        t_rl: cycles_to_ps(t.cl, mhz),
        t_wl: cycles_to_ps(t.wl, mhz),
        burst_duration,
    })
}
