use crate::core::system::EPS_TIME;
use crate::core::{BrownSystem, BrownSystemState, CollisionEvent};
use crate::error::{Error, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// Lifecycle of a [`SimulationEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initialized,
    Simulating,
    Finished,
}

/// Event-driven integrator over a [`BrownSystem`].
///
/// Collisions are executed at their exact instants, while snapshots are taken
/// every `dt2` regardless of how many collisions fall in between. Predictions
/// that became stale are dropped lazily when they reach the front of the queue.
#[derive(Debug)]
pub struct SimulationEngine {
    system: BrownSystem,
    dt2: f64,
    pq: BinaryHeap<Reverse<CollisionEvent>>,
    frames: Vec<BrownSystemState>,
    processed: Vec<CollisionEvent>,
    frequencies: Vec<usize>,
    stale_discarded: u64,
    state: EngineState,
}

impl SimulationEngine {
    /// Wrap `system`, recording a snapshot every `dt2` (finite, > 0).
    pub fn new(system: BrownSystem, dt2: f64) -> Result<Self> {
        if !dt2.is_finite() || dt2 <= 0.0 {
            return Err(Error::InvalidParam(
                "output interval dt2 must be finite and > 0".into(),
            ));
        }
        Ok(Self {
            system,
            dt2,
            pq: BinaryHeap::new(),
            frames: Vec::new(),
            processed: Vec::new(),
            frequencies: Vec::new(),
            stale_discarded: 0,
            state: EngineState::Uninitialized,
        })
    }

    /// Clear every queue and record, reset the system and take the t = 0 snapshot.
    ///
    /// Also used to prepare a re-run once a simulation has finished.
    pub fn initialize(&mut self) -> Result<()> {
        if self.state == EngineState::Simulating {
            return Err(Error::InvalidParam(
                "cannot initialize while a simulation is running".into(),
            ));
        }
        self.pq.clear();
        self.frames.clear();
        self.processed.clear();
        self.frequencies.clear();
        self.stale_discarded = 0;
        self.system.reset()?;
        self.frames.push(self.system.snapshot());
        self.state = EngineState::Initialized;
        Ok(())
    }

    /// Run from t = 0 until `duration`.
    ///
    /// Errors:
    /// - `Error::NotInitialized` unless `initialize` was called since the last run.
    /// - `Error::InvalidParam` for a non-positive duration or `dt2 > duration`.
    /// - `Error::QueueStarvation` if no valid event is left before `duration`.
    pub fn simulate(&mut self, duration: f64) -> Result<()> {
        if self.state != EngineState::Initialized {
            return Err(Error::NotInitialized);
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(Error::InvalidParam(
                "duration must be finite and > 0".into(),
            ));
        }
        if self.dt2 > duration {
            return Err(Error::InvalidParam(format!(
                "output interval dt2={} exceeds duration={duration}",
                self.dt2
            )));
        }

        info!(
            duration,
            dt2 = self.dt2,
            particles = self.system.particles().len(),
            "simulation started"
        );
        self.state = EngineState::Simulating;
        let outcome = self.run(duration);
        self.state = EngineState::Finished;
        outcome?;
        info!(
            events = self.processed.len(),
            stale = self.stale_discarded,
            frames = self.frames.len(),
            "simulation finished"
        );
        Ok(())
    }

    fn run(&mut self, duration: f64) -> Result<()> {
        // Output instants are k * dt2 so the sampled timestamps stay exact.
        let last_output = (duration / self.dt2 + EPS_TIME).floor() as u64;
        let mut next_output = 1u64;
        let mut interval_collisions = 0usize;
        let mut now = 0.0;
        let mut touched: Option<Vec<usize>> = None;

        while now < duration {
            let candidates = match touched.take() {
                None => self.system.next_collisions(now)?,
                Some(indices) => self.system.next_collisions_involving(&indices, now)?,
            };
            self.pq.extend(candidates.into_iter().map(Reverse));

            let Some(event) = self.pop_valid() else {
                return Err(Error::QueueStarvation { now, duration });
            };
            let instant = event.time_f64();

            while next_output <= last_output && self.output_instant(next_output) < instant {
                self.record_frame(self.output_instant(next_output), &mut interval_collisions)?;
                next_output += 1;
            }

            if instant > duration {
                // Leave the prediction queued; the run stops at `duration`.
                self.pq.push(Reverse(event));
                self.system.advance(duration)?;
                break;
            }

            self.system.advance(instant)?;
            self.system.execute(&event)?;
            interval_collisions += 1;
            trace!(t = instant, collider = event.collider, target = ?event.target, "collision");
            touched = Some(event.participants().map(|p| p as usize).collect());
            self.processed.push(event);
            now = instant;
        }

        while next_output <= last_output {
            self.record_frame(self.output_instant(next_output), &mut interval_collisions)?;
            next_output += 1;
        }
        Ok(())
    }

    #[inline]
    fn output_instant(&self, k: u64) -> f64 {
        k as f64 * self.dt2
    }

    fn record_frame(&mut self, instant: f64, interval_collisions: &mut usize) -> Result<()> {
        self.system.advance(instant)?;
        self.system.report_collisions(*interval_collisions);
        self.frames.push(self.system.snapshot());
        self.frequencies.push(*interval_collisions);
        debug!(t = instant, collisions = *interval_collisions, "frame recorded");
        *interval_collisions = 0;
        Ok(())
    }

    /// Earliest event that is still valid, discarding stale ones on the way.
    fn pop_valid(&mut self) -> Option<CollisionEvent> {
        while let Some(Reverse(event)) = self.pq.pop() {
            if self.system.is_valid(&event) {
                return Some(event);
            }
            self.stale_discarded += 1;
        }
        None
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn dt2(&self) -> f64 {
        self.dt2
    }

    pub fn system(&self) -> &BrownSystem {
        &self.system
    }

    /// Snapshots at `0, dt2, 2*dt2, ...` up to the duration of the last run.
    pub fn frames(&self) -> &[BrownSystemState] {
        &self.frames
    }

    /// Executed collisions in the order they happened.
    pub fn processed_events(&self) -> &[CollisionEvent] {
        &self.processed
    }

    /// Collisions per output interval; entry `k` belongs to frame `k + 1`.
    pub fn collision_frequencies(&self) -> &[usize] {
        &self.frequencies
    }

    /// Queued predictions that were dropped because a party collided first.
    pub fn stale_events_discarded(&self) -> u64 {
        self.stale_discarded
    }
}
