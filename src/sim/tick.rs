//! Fixed timestep decay tick
//!
//! Input and the decay clock both funnel through `tick`, which applies queued
//! moves in arrival order and then the elapsed decay. A move and a decay step
//! that land in the same frame therefore always resolve move-first.

use rand::Rng;

use super::engine::{MoveOutcome, SessionEngine};
use super::state::InputAction;
use crate::consts::MAX_SUBSTEPS;

/// Input gathered since the previous tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Actions in the order they arrived
    pub actions: Vec<InputAction>,
}

impl TickInput {
    pub fn push(&mut self, action: InputAction) {
        self.actions.push(action);
    }

    /// Clear one-shot inputs after processing
    pub fn clear_actions(&mut self) {
        self.actions.clear();
    }
}

/// Apply queued moves, then `elapsed_ticks` of decay.
///
/// Returns every outcome in the order it was produced. Once a move ends the
/// session, the remaining moves and the decay come back `Ignored`.
pub fn tick<R: Rng>(
    engine: &mut SessionEngine<R>,
    input: &TickInput,
    elapsed_ticks: u32,
) -> Vec<MoveOutcome> {
    let mut outcomes = Vec::with_capacity(input.actions.len() + 1);

    for &action in &input.actions {
        outcomes.push(engine.apply_action(action));
    }

    outcomes.push(engine.apply_decay(elapsed_ticks));

    outcomes
}

/// Converts wall-clock frame time into whole decay ticks
#[derive(Debug, Clone)]
pub struct DecayClock {
    tick_ms: f64,
    accumulator: f64,
    max_substeps: u32,
    stopped: bool,
}

impl DecayClock {
    pub fn new(tick_ms: u32) -> Self {
        Self {
            tick_ms: f64::from(tick_ms.max(1)),
            accumulator: 0.0,
            max_substeps: MAX_SUBSTEPS,
            stopped: false,
        }
    }

    /// Clock for drivers that only wake on input: every due tick is returned
    pub fn uncapped(tick_ms: u32) -> Self {
        Self::new(tick_ms).with_max_substeps(u32::MAX)
    }

    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps.max(1);
        self
    }

    /// Add `dt_ms` of frame time and return how many ticks are due.
    ///
    /// At most `max_substeps` ticks are returned per call; any further backlog
    /// is dropped so a stalled frame cannot drain the timer in one go. Use
    /// `uncapped` when calls are not frame-driven.
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        if self.stopped || !dt_ms.is_finite() || dt_ms <= 0.0 {
            return 0;
        }
        self.accumulator += dt_ms;

        let due = (self.accumulator / self.tick_ms).floor();
        if due >= f64::from(self.max_substeps) {
            if due > f64::from(self.max_substeps) {
                let dropped = due as u64 - u64::from(self.max_substeps);
                log::debug!("Decay clock dropping {dropped} ticks of backlog");
            }
            self.accumulator %= self.tick_ms;
            return self.max_substeps;
        }

        self.accumulator -= due * self.tick_ms;
        due as u32
    }

    /// Stop issuing ticks (session ended or abandoned)
    pub fn stop(&mut self) {
        self.stopped = true;
        self.accumulator = 0.0;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Milliseconds carried toward the next tick
    pub fn pending_ms(&self) -> f64 {
        self.accumulator
    }
}
