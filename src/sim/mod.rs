//! Simulation Driver.
//!
//! Single-threaded discrete-event loop binding the traffic initiators to the
//! memory subsystem's transaction endpoint. The clock only ever advances to
//! the nearest pending trigger; within one instant events execute in
//! insertion order, so each sub-component's `update` for a committed command
//! always precedes its next `evaluate`.
//!
//! Termination is counted: an initiator is finished when all its requests
//! are issued and completed; once every initiator reports completion the
//! loop stops explicitly. A drained event queue without an explicit stop is
//! detected and forced, with a user-visible warning.

use crate::common::error::SimError;
use crate::common::time::SimTime;
use crate::config::SimConfig;
use crate::initiator::{self, Initiator};
use crate::stats::SimStats;
use crate::system::MemorySystem;
use log::{debug, info, warn};
use std::path::Path;

/// Event queue implementation.
pub mod events;

use events::{EventKind, EventQueue};

/// The simulation driver: subsystem, initiators, and event loop.
pub struct Simulator {
    system: MemorySystem,
    initiators: Vec<Box<dyn Initiator>>,
    queue: EventQueue,
    stats: SimStats,
    now: SimTime,
    /// Earliest controller round currently scheduled; coalesces duplicates.
    round_scheduled: SimTime,
    finished: Vec<bool>,
    finished_count: usize,
    stopped: bool,
    max_time: SimTime,
}

impl Simulator {
    /// Builds the subsystem and initiators from configuration.
    pub fn new(config: &SimConfig, resource_dir: &Path) -> Result<Self, SimError> {
        config.validate()?;
        let system = MemorySystem::new(config, resource_dir)?;
        let initiators = initiator::build(&config.initiators, system.spec(), resource_dir)?;
        let max_time = if config.simulation.max_time_ns == 0 {
            SimTime::NEVER
        } else {
            SimTime::from_ns(config.simulation.max_time_ns)
        };
        Ok(Self::with_parts(system, initiators, max_time))
    }

    /// Assembles a simulator from already-built parts.
    pub fn with_parts(
        system: MemorySystem,
        initiators: Vec<Box<dyn Initiator>>,
        max_time: SimTime,
    ) -> Self {
        let count = initiators.len();
        Self {
            system,
            initiators,
            queue: EventQueue::new(),
            stats: SimStats::default(),
            now: SimTime::ZERO,
            round_scheduled: SimTime::NEVER,
            finished: vec![false; count],
            finished_count: 0,
            stopped: false,
            max_time,
        }
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Total requests all initiators will issue.
    pub fn total_requests(&self) -> u64 {
        self.initiators.iter().map(|i| i.total_requests()).sum()
    }

    fn schedule_round(&mut self, at: SimTime) {
        if at < self.round_scheduled {
            self.round_scheduled = at;
            self.queue.push(at, EventKind::Round);
        }
    }

    fn mark_if_finished(&mut self, idx: usize) {
        if !self.finished[idx] && self.initiators[idx].finished() {
            self.finished[idx] = true;
            self.finished_count += 1;
            debug!(
                "[Sim] initiator '{}' finished ({}/{})",
                self.initiators[idx].name(),
                self.finished_count,
                self.finished.len()
            );
            if self.finished_count == self.finished.len() {
                info!("[Sim] all initiators finished at {}", self.now);
                self.stopped = true;
            }
        }
    }

    /// Runs the event loop to completion.
    pub fn run(&mut self) -> Result<(), SimError> {
        // Seed the timeline: one poll per initiator, one controller round.
        for idx in 0..self.initiators.len() {
            let wake = self.initiators[idx].next_wake();
            if !wake.is_never() {
                self.queue.push(wake, EventKind::Poll(idx));
            }
            self.mark_if_finished(idx);
        }
        self.schedule_round(SimTime::ZERO);

        while let Some((time, kind)) = self.queue.pop() {
            if self.stopped {
                break;
            }
            if time > self.max_time {
                info!("[Sim] simulated-time limit reached at {}", time);
                self.stopped = true;
                break;
            }
            debug_assert!(time >= self.now, "event delivered out of order");
            self.now = time;

            match kind {
                EventKind::Poll(idx) => self.handle_poll(idx)?,
                EventKind::Round => self.handle_round()?,
                EventKind::Complete(id) => self.handle_complete(id),
            }
        }

        if !self.stopped {
            warn!(
                "[Sim] event queue drained without an explicit stop; forcing stop ({} transactions in flight)",
                self.system.in_flight()
            );
            self.stopped = true;
        }

        self.stats.sim_time = self.now;
        self.system.harvest_stats(&mut self.stats);
        Ok(())
    }

    fn handle_poll(&mut self, idx: usize) -> Result<(), SimError> {
        let mut pushed = false;
        while let Some(req) = self.initiators[idx].next_request(self.now) {
            self.system.push_request(req, idx, self.now)?;
            self.stats.note_request(&req);
            pushed = true;
        }
        if pushed {
            self.schedule_round(self.now);
        }

        let wake = self.initiators[idx].next_wake();
        if !wake.is_never() {
            self.queue.push(wake.max(self.now), EventKind::Poll(idx));
        }
        Ok(())
    }

    fn handle_round(&mut self) -> Result<(), SimError> {
        self.round_scheduled = SimTime::NEVER;
        let outcome = self.system.round(self.now, &mut self.stats)?;
        for completion in &outcome.completions {
            self.queue
                .push(completion.at, EventKind::Complete(completion.trans));
        }
        if !outcome.next_trigger.is_never() {
            self.schedule_round(outcome.next_trigger);
        }
        Ok(())
    }

    fn handle_complete(&mut self, id: crate::controller::command::TransId) {
        let desc = self.system.complete(id);
        self.stats.note_completion(&desc, self.now);
        let owner = desc.owner;
        self.initiators[owner].request_done(id, self.now);
        self.mark_if_finished(owner);
        if !self.finished[owner] {
            // The completion may have unblocked a flow-controlled initiator.
            self.queue.push(self.now, EventKind::Poll(owner));
        }
        // A freed bank queue slot can change the next arbitration decision.
        self.schedule_round(self.now);
    }
}
