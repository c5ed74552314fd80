//! Session engine: move validation, timer decay and lifecycle
//!
//! `SessionEngine` is the only owner of a `SessionState`. Both mutating
//! operations run to completion inside a single `&mut self` call, and both are
//! no-ops once the session has ended.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::path::{FlipPolicy, PathGenerator};
use super::state::{Direction, InputAction, SessionPhase, SessionSnapshot, SessionState};
use crate::settings::CharacterColor;
use crate::tuning::Tuning;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// Moved in a direction the next step did not go
    MissedStep,
    /// Timer reached zero
    TimeUp,
}

/// Final result handed to the persistence collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub final_score: u64,
    pub cosmetic_tag: CharacterColor,
    pub cause: EndCause,
}

/// Result of a single `apply_move` or `apply_decay` call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Session had already ended; nothing changed
    Ignored,
    /// Step matched
    Success { score: u64, timer: f32 },
    /// Decay applied, session still running
    Ongoing { timer: f32 },
    /// This call ended the session
    Terminal { result: SessionResult },
}

impl MoveOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MoveOutcome::Terminal { .. })
    }
}

/// Owns one play-through
#[derive(Debug, Clone)]
pub struct SessionEngine<R = Pcg32> {
    state: SessionState,
    generator: PathGenerator<R>,
    tuning: Tuning,
    cosmetic_tag: CharacterColor,
    /// Minimum window length kept after every consumed step
    min_window: usize,
    /// Set at the Ended transition, taken once by the persistence side
    result: Option<SessionResult>,
    events: Vec<GameEvent>,
}

impl SessionEngine<Pcg32> {
    /// New session with an entropy-seeded generator
    pub fn with_entropy(tuning: Tuning, cosmetic_tag: CharacterColor) -> Self {
        let rng = Pcg32::from_rng(&mut rand::rng());
        Self::new(tuning, cosmetic_tag, rng)
    }

    /// New session with a fixed seed (tests, demos)
    pub fn with_seed(tuning: Tuning, cosmetic_tag: CharacterColor, seed: u64) -> Self {
        Self::new(tuning, cosmetic_tag, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> SessionEngine<R> {
    /// Start a session. Invalid tuning is replaced by the defaults.
    pub fn new(tuning: Tuning, cosmetic_tag: CharacterColor, rng: R) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Invalid tuning ({e}), using defaults");
                Tuning::default()
            }
        };

        let min_window = tuning.lookahead.max(tuning.visible_steps).max(1);
        let mut generator = PathGenerator::new(FlipPolicy::from_tuning(&tuning), rng);
        let mut path = generator.generate_initial(tuning.opening_len());
        generator.refill(&mut path, min_window);

        let state = SessionState::new(path, &tuning);
        log::info!(
            "Session started: {} steps generated, timer {}",
            state.path.len(),
            state.timer
        );

        Self {
            state,
            generator,
            tuning,
            cosmetic_tag,
            min_window,
            result: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    pub fn cosmetic_tag(&self) -> CharacterColor {
        self.cosmetic_tag
    }

    /// Render snapshot of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot(self.tuning.visible_steps)
    }

    /// Move in `attempted_direction`, turning first when `is_turn_move`.
    ///
    /// `attempted_direction` must be the facing after the optional turn. Any
    /// other direction is caller misuse: the call is `Ignored` and nothing
    /// changes. `climb`/`turn` always pass a consistent direction.
    pub fn apply_move(
        &mut self,
        attempted_direction: Direction,
        is_turn_move: bool,
    ) -> MoveOutcome {
        if self.state.is_ended() {
            log::debug!("apply_move ignored: session already ended");
            return MoveOutcome::Ignored;
        }

        let facing_after = if is_turn_move {
            self.state.facing.opposite()
        } else {
            self.state.facing
        };
        if attempted_direction != facing_after {
            log::debug!(
                "apply_move ignored: attempted {attempted_direction:?} while facing {facing_after:?}"
            );
            return MoveOutcome::Ignored;
        }
        self.state.facing = facing_after;

        if self.state.path.is_empty() {
            self.generator.refill(&mut self.state.path, self.min_window);
        }

        match self.state.path.head() {
            Some(required) if required == attempted_direction => self.apply_success(is_turn_move),
            _ => self.end(EndCause::MissedStep),
        }
    }

    /// Move in the current facing
    pub fn climb(&mut self) -> MoveOutcome {
        let facing = self.state.facing;
        self.apply_move(facing, false)
    }

    /// Flip facing, then move
    pub fn turn(&mut self) -> MoveOutcome {
        let facing = self.state.facing.opposite();
        self.apply_move(facing, true)
    }

    /// Dispatch a logical input action
    pub fn apply_action(&mut self, action: InputAction) -> MoveOutcome {
        match action {
            InputAction::Climb => self.climb(),
            InputAction::Turn => self.turn(),
        }
    }

    /// Apply `elapsed_ticks` decay steps at the current difficulty
    pub fn apply_decay(&mut self, elapsed_ticks: u32) -> MoveOutcome {
        if self.state.is_ended() {
            log::debug!("apply_decay ignored: session already ended");
            return MoveOutcome::Ignored;
        }

        let per_tick = self.tuning.decay_for_score(self.state.score);
        let next = self.state.timer - per_tick * elapsed_ticks as f32;
        if next <= 0.0 {
            self.state.timer = 0.0;
            return self.end(EndCause::TimeUp);
        }

        self.state.timer = next.min(self.tuning.max_time);
        MoveOutcome::Ongoing {
            timer: self.state.timer,
        }
    }

    /// Result of an ended session; returns `Some` exactly once
    pub fn take_result(&mut self) -> Option<SessionResult> {
        self.result.take()
    }

    /// Pending notifications, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn apply_success(&mut self, turned: bool) -> MoveOutcome {
        let state = &mut self.state;
        let Some(consumed) = state.path.pop_front() else {
            return MoveOutcome::Ignored;
        };

        state.score += 1;
        state.timer = (state.timer + self.tuning.time_bonus).clamp(0.0, self.tuning.max_time);
        state.history.record(consumed);

        let added = self.generator.refill(&mut state.path, self.min_window);
        if added > 0 {
            log::debug!("Path refilled with {added} steps ({} total)", state.path.len());
        }

        self.events.push(if turned {
            GameEvent::Turned {
                facing: state.facing,
                score: state.score,
            }
        } else {
            GameEvent::Climbed { score: state.score }
        });

        MoveOutcome::Success {
            score: state.score,
            timer: state.timer,
        }
    }

    fn end(&mut self, cause: EndCause) -> MoveOutcome {
        self.state.phase = SessionPhase::Ended;
        let result = SessionResult {
            final_score: self.state.score,
            cosmetic_tag: self.cosmetic_tag,
            cause,
        };
        self.result = Some(result);
        self.events.push(match cause {
            EndCause::MissedStep => GameEvent::Fell {
                final_score: result.final_score,
            },
            EndCause::TimeUp => GameEvent::TimedOut {
                final_score: result.final_score,
            },
        });
        log::info!("Session ended ({cause:?}) with score {}", result.final_score);
        MoveOutcome::Terminal { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::autopilot::best_action;
    use crate::sim::state::StepPath;

    fn engine() -> SessionEngine {
        SessionEngine::with_seed(Tuning::default(), CharacterColor::default(), 42)
    }

    /// Engine whose upcoming window is exactly `steps`, padded with generated
    /// steps behind them
    fn engine_with_path(steps: &[Direction]) -> SessionEngine {
        let mut engine = engine();
        let mut path: StepPath = steps.iter().copied().collect();
        let min = engine.min_window;
        engine.generator.refill(&mut path, min);
        engine.state.path = path;
        engine
    }

    #[test]
    fn test_first_climb_succeeds_and_clamps_timer() {
        // Warm-up guarantees the opening steps go right
        let mut engine = engine();
        let len_before = engine.state().path.len();
        let outcome = engine.climb();
        assert_eq!(
            outcome,
            MoveOutcome::Success {
                score: 1,
                timer: 100.0
            }
        );
        assert_eq!(engine.state().timer, 100.0);
        assert!(engine.state().path.len() >= engine.tuning().lookahead);
        assert!(engine.state().path.len() >= len_before - 1);
        assert_eq!(engine.state().history.to_vec(), vec![Direction::Right]);
    }

    #[test]
    fn test_climb_into_wrong_step_ends_session() {
        let mut engine = engine_with_path(&[Direction::Left]);
        engine.state.score = 7;
        let before = engine.state().clone();

        let outcome = engine.climb();
        let MoveOutcome::Terminal { result } = outcome else {
            panic!("expected terminal, got {outcome:?}");
        };
        assert_eq!(result.final_score, 7);
        assert_eq!(result.cause, EndCause::MissedStep);
        assert!(engine.is_ended());

        let after = engine.state();
        assert_eq!(after.score, before.score);
        assert_eq!(after.timer, before.timer);
        assert_eq!(after.facing, before.facing);
        assert_eq!(after.path, before.path);
        assert_eq!(after.history, before.history);
    }

    #[test]
    fn test_timer_exhaustion() {
        let mut engine = engine();
        engine.state.score = 3;
        engine.state.timer = 2.0;
        engine.tuning.base_decay = 3.0;
        engine.tuning.decay_per_point = 0.0;

        let outcome = engine.apply_decay(1);
        let MoveOutcome::Terminal { result } = outcome else {
            panic!("expected terminal, got {outcome:?}");
        };
        assert_eq!(result.final_score, 3);
        assert_eq!(result.cause, EndCause::TimeUp);
        assert_eq!(engine.state().timer, 0.0);
        assert!(engine.is_ended());
    }

    #[test]
    fn test_turn_matches_left_step() {
        let mut engine = engine_with_path(&[Direction::Left, Direction::Left]);
        let outcome = engine.turn();
        assert_eq!(engine.state().facing, Direction::Left);
        assert!(matches!(outcome, MoveOutcome::Success { score: 1, .. }));

        // Facing persists; a climb now goes left
        assert!(matches!(engine.climb(), MoveOutcome::Success { score: 2, .. }));
    }

    #[test]
    fn test_turn_via_apply_move() {
        let mut engine = engine_with_path(&[Direction::Left]);
        let outcome = engine.apply_move(Direction::Left, true);
        assert!(matches!(outcome, MoveOutcome::Success { score: 1, .. }));
        assert_eq!(engine.state().facing, Direction::Left);
    }

    #[test]
    fn test_inconsistent_direction_is_ignored() {
        let mut engine = engine_with_path(&[Direction::Left, Direction::Right]);
        let before = engine.state().clone();

        // Facing right, so a plain move must be right and a turn must be left
        assert_eq!(engine.apply_move(Direction::Left, false), MoveOutcome::Ignored);
        assert_eq!(engine.apply_move(Direction::Right, true), MoveOutcome::Ignored);
        assert_eq!(engine.state(), &before);
        assert!(!engine.is_ended());
        assert!(engine.drain_events().is_empty());

        assert!(matches!(
            engine.apply_move(Direction::Left, true),
            MoveOutcome::Success { score: 1, .. }
        ));
    }

    #[test]
    fn test_window_refills_past_opening_path() {
        let mut engine = engine();
        let lookahead = engine.tuning().lookahead;
        let moves = engine.tuning().initial_path_len * 3;
        for i in 0..moves {
            let action = best_action(engine.state());
            assert!(
                matches!(engine.apply_action(action), MoveOutcome::Success { .. }),
                "move {i} failed"
            );
            assert!(engine.state().path.len() >= lookahead);
        }
        assert_eq!(engine.state().score, moves as u64);
    }

    #[test]
    fn test_timer_bounds_with_custom_tuning() {
        let tuning = Tuning {
            initial_time: 40.0,
            max_time: 60.0,
            time_bonus: 25.0,
            base_decay: 4.0,
            decay_per_point: 0.5,
            ..Default::default()
        };
        let mut engine = SessionEngine::with_seed(tuning, CharacterColor::default(), 3);
        assert_eq!(engine.tuning().max_time, 60.0);

        let mut outcomes = Vec::new();
        for _ in 0..40 {
            let action = best_action(engine.state());
            outcomes.push(engine.apply_action(action));
            outcomes.push(engine.apply_decay(3));
        }
        for outcome in outcomes {
            match outcome {
                MoveOutcome::Success { timer, .. } | MoveOutcome::Ongoing { timer } => {
                    assert!((0.0..=60.0).contains(&timer), "timer {timer} out of range");
                }
                _ => {}
            }
        }
        let timer = engine.state().timer;
        assert!((0.0..=60.0).contains(&timer));
    }

    #[test]
    fn test_moves_after_death_are_ignored() {
        let mut engine = engine_with_path(&[Direction::Left, Direction::Right]);
        assert!(engine.climb().is_terminal());
        let after_first = engine.state().clone();

        assert_eq!(engine.climb(), MoveOutcome::Ignored);
        assert_eq!(engine.turn(), MoveOutcome::Ignored);
        assert_eq!(engine.apply_decay(5), MoveOutcome::Ignored);
        assert_eq!(engine.state(), &after_first);
    }

    #[test]
    fn test_result_taken_once() {
        let mut engine = engine_with_path(&[Direction::Left]);
        assert_eq!(engine.take_result(), None);
        engine.climb();
        let result = engine.take_result().unwrap();
        assert_eq!(result.final_score, 0);
        assert_eq!(result.cosmetic_tag, CharacterColor::default());
        assert_eq!(engine.take_result(), None);
        engine.climb();
        assert_eq!(engine.take_result(), None);
    }

    #[test]
    fn test_decay_scales_with_score() {
        let mut slow = engine();
        let mut fast = engine();
        fast.state.score = 150;

        slow.apply_decay(10);
        fast.apply_decay(10);
        assert!(fast.state().timer < slow.state().timer);
        assert!((slow.state().timer - 95.0).abs() < 1e-3);
        assert!((fast.state().timer - 92.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_ticks_is_noop() {
        let mut engine = engine();
        assert_eq!(engine.apply_decay(0), MoveOutcome::Ongoing { timer: 100.0 });
    }

    #[test]
    fn test_events_emitted_in_order() {
        let mut engine = engine_with_path(&[Direction::Right, Direction::Left, Direction::Right]);
        engine.climb();
        engine.turn();
        engine.climb();
        let events = engine.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::Climbed { score: 1 },
                GameEvent::Turned {
                    facing: Direction::Left,
                    score: 2
                },
                GameEvent::Fell { final_score: 2 },
            ]
        );
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_success_never_pushes_timer_below_zero() {
        let mut engine = engine();
        engine.tuning.time_bonus = -50.0;
        engine.state.timer = 30.0;
        assert_eq!(
            engine.climb(),
            MoveOutcome::Success {
                score: 1,
                timer: 0.0
            }
        );
        assert!(engine.apply_decay(1).is_terminal());
    }

    #[test]
    fn test_negative_bonus_tuning_falls_back() {
        let tuning = Tuning {
            time_bonus: -50.0,
            ..Default::default()
        };
        let engine = SessionEngine::with_seed(tuning, CharacterColor::default(), 1);
        assert_eq!(engine.tuning().time_bonus, Tuning::default().time_bonus);
    }

    #[test]
    fn test_invalid_tuning_falls_back() {
        let tuning = Tuning {
            p_flip_initial: 0.8,
            ..Default::default()
        };
        let engine = SessionEngine::with_seed(tuning, CharacterColor::default(), 1);
        assert_eq!(engine.tuning(), &Tuning::default());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut engine = engine();
        engine.climb();
        let snap = engine.snapshot();
        assert_eq!(snap.score, 1);
        assert_eq!(snap.visible_path.len(), 10);
        assert_eq!(snap.history, vec![Direction::Right]);
        assert_eq!(snap.phase, SessionPhase::Active);
    }
}
