//! Simulation statistics collection and reporting.
//!
//! Tracks command counts, refresh flexibility usage, power-down activity,
//! transaction latencies, and bandwidth during simulation execution.

use crate::common::time::SimTime;
use crate::controller::command::{AccessKind, MemRequest, TransactionDescriptor};
use std::time::Instant;

/// Simulation statistics structure tracking all performance metrics.
pub struct SimStats {
    start_time: Instant,
    pub sim_time: SimTime,

    pub requests_read: u64,
    pub requests_write: u64,
    pub completed_reads: u64,
    pub completed_writes: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,

    pub cmd_activate: u64,
    pub cmd_precharge: u64,
    pub cmd_read: u64,
    pub cmd_write: u64,
    pub cmd_refresh_ab: u64,
    pub cmd_refresh_sb: u64,
    pub cmd_power_down_entry: u64,
    pub cmd_power_down_exit: u64,

    pub refreshes_postponed: u64,
    pub refreshes_pulled_in: u64,

    pub latency_total_ps: u64,
    pub latency_min_ps: u64,
    pub latency_max_ps: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            sim_time: SimTime::ZERO,
            requests_read: 0,
            requests_write: 0,
            completed_reads: 0,
            completed_writes: 0,
            bytes_read: 0,
            bytes_written: 0,
            cmd_activate: 0,
            cmd_precharge: 0,
            cmd_read: 0,
            cmd_write: 0,
            cmd_refresh_ab: 0,
            cmd_refresh_sb: 0,
            cmd_power_down_entry: 0,
            cmd_power_down_exit: 0,
            refreshes_postponed: 0,
            refreshes_pulled_in: 0,
            latency_total_ps: 0,
            latency_min_ps: u64::MAX,
            latency_max_ps: 0,
        }
    }
}

impl SimStats {
    /// Records a demand request entering the subsystem.
    pub fn note_request(&mut self, req: &MemRequest) {
        match req.kind {
            AccessKind::Read => self.requests_read += 1,
            AccessKind::Write => self.requests_write += 1,
        }
    }

    /// Records a completed transaction and its latency.
    pub fn note_completion(&mut self, desc: &TransactionDescriptor, now: SimTime) {
        let latency = (now - desc.arrival).as_ps();
        self.latency_total_ps += latency;
        self.latency_min_ps = self.latency_min_ps.min(latency);
        self.latency_max_ps = self.latency_max_ps.max(latency);
        match desc.kind {
            AccessKind::Read => {
                self.completed_reads += 1;
                self.bytes_read += u64::from(desc.bytes);
            }
            AccessKind::Write => {
                self.completed_writes += 1;
                self.bytes_written += u64::from(desc.bytes);
            }
        }
    }

    /// Prints a formatted summary of all simulation statistics.
    pub fn print(&self) {
        let host_seconds = self.start_time.elapsed().as_secs_f64();
        let sim_seconds = self.sim_time.as_ps() as f64 / 1e12;

        let completed = self.completed_reads + self.completed_writes;
        let avg_latency_ns = if completed > 0 {
            self.latency_total_ps as f64 / completed as f64 / 1_000.0
        } else {
            0.0
        };
        let min_latency_ns = if completed > 0 {
            self.latency_min_ps as f64 / 1_000.0
        } else {
            0.0
        };
        let total_bytes = self.bytes_read + self.bytes_written;
        let bandwidth_gbs = if sim_seconds > 0.0 {
            total_bytes as f64 / sim_seconds / 1e9
        } else {
            0.0
        };

        println!("\n==========================================================");
        println!("DRAM SUBSYSTEM SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", host_seconds);
        println!("sim_time                 {:.3} ns", self.sim_time.as_ns_f64());
        println!(
            "requests                 {} ({} rd / {} wr)",
            self.requests_read + self.requests_write,
            self.requests_read,
            self.requests_write
        );
        println!(
            "completed                {} ({} rd / {} wr)",
            completed, self.completed_reads, self.completed_writes
        );
        println!("bandwidth                {:.3} GB/s", bandwidth_gbs);
        println!("----------------------------------------------------------");
        println!("LATENCY");
        println!("  lat.avg                {:.3} ns", avg_latency_ns);
        println!("  lat.min                {:.3} ns", min_latency_ns);
        println!(
            "  lat.max                {:.3} ns",
            self.latency_max_ps as f64 / 1_000.0
        );
        println!("----------------------------------------------------------");
        println!("COMMAND MIX");
        println!("  cmd.activate           {}", self.cmd_activate);
        println!("  cmd.precharge          {}", self.cmd_precharge);
        println!("  cmd.read               {}", self.cmd_read);
        println!("  cmd.write              {}", self.cmd_write);
        println!("  cmd.refresh_ab         {}", self.cmd_refresh_ab);
        println!("  cmd.refresh_sb         {}", self.cmd_refresh_sb);
        println!("  cmd.pd_entry           {}", self.cmd_power_down_entry);
        println!("  cmd.pd_exit            {}", self.cmd_power_down_exit);
        println!("----------------------------------------------------------");
        println!("REFRESH FLEXIBILITY");
        println!("  refresh.postponed      {}", self.refreshes_postponed);
        println!("  refresh.pulled_in      {}", self.refreshes_pulled_in);
        println!("==========================================================");
    }
}
