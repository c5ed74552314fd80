//! Idle/demo player
//!
//! Reads the next step and presses whichever button matches it. The demo
//! variant fumbles now and then so attract-mode sessions eventually end.

use rand::Rng;

use super::state::{InputAction, SessionState};

/// The correct action for the next step
pub fn best_action(state: &SessionState) -> InputAction {
    match state.path.head() {
        Some(required) if required != state.facing => InputAction::Turn,
        _ => InputAction::Climb,
    }
}

/// Autopilot that makes the wrong call with probability `mistake_chance`
#[derive(Debug, Clone)]
pub struct Autopilot<R> {
    mistake_chance: f64,
    rng: R,
}

impl<R: Rng> Autopilot<R> {
    pub fn new(mistake_chance: f64, rng: R) -> Self {
        let mistake_chance = if mistake_chance.is_nan() {
            0.0
        } else {
            mistake_chance.clamp(0.0, 1.0)
        };
        Self { mistake_chance, rng }
    }

    pub fn choose(&mut self, state: &SessionState) -> InputAction {
        let best = best_action(state);
        if self.rng.random_bool(self.mistake_chance) {
            match best {
                InputAction::Climb => InputAction::Turn,
                InputAction::Turn => InputAction::Climb,
            }
        } else {
            best
        }
    }
}
