//! Data-driven game balance
//!
//! Every gameplay coefficient lives here so it can be tweaked without touching
//! simulation code. Defaults mirror `crate::consts`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Invalid tuning value
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    /// A flip probability was outside [0, 0.5)
    FlipProbability { field: &'static str, value: f64 },
    /// Look-ahead must cover the visible prefix
    LookaheadTooShort { lookahead: usize, visible_steps: usize },
    /// A numeric field must be strictly positive
    NotPositive { field: &'static str },
    /// A numeric field must not be negative
    Negative { field: &'static str },
    /// A numeric field was NaN or infinite
    NotFinite { field: &'static str },
    /// Initial time must not exceed max time
    InitialTimeAboveMax { initial: f32, max: f32 },
    /// JSON could not be parsed
    Parse { reason: String },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlipProbability { field, value } => {
                write!(f, "{field} must be in [0, 0.5), got {value}")
            }
            Self::LookaheadTooShort {
                lookahead,
                visible_steps,
            } => write!(
                f,
                "lookahead ({lookahead}) must be at least visible_steps ({visible_steps})"
            ),
            Self::NotPositive { field } => write!(f, "{field} must be greater than zero"),
            Self::Negative { field } => write!(f, "{field} must not be negative"),
            Self::NotFinite { field } => write!(f, "{field} must be a finite number"),
            Self::InitialTimeAboveMax { initial, max } => {
                write!(f, "initial_time ({initial}) exceeds max_time ({max})")
            }
            Self::Parse { reason } => write!(f, "Invalid tuning JSON: {reason}"),
        }
    }
}

impl std::error::Error for TuningError {}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timer ===
    pub initial_time: f32,
    pub max_time: f32,
    /// Added per correct step
    pub time_bonus: f32,

    // === Decay ===
    pub base_decay: f32,
    pub decay_per_point: f32,
    pub decay_score_cap: u64,
    pub tick_ms: u32,

    // === Path ===
    pub initial_path_len: usize,
    pub lookahead: usize,
    pub visible_steps: usize,
    pub history_len: usize,
    pub warmup_steps: usize,
    pub p_flip_initial: f64,
    pub p_flip_extend: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_time: INITIAL_TIME,
            max_time: MAX_TIME,
            time_bonus: TIME_BONUS,

            base_decay: BASE_DECAY,
            decay_per_point: DECAY_PER_POINT,
            decay_score_cap: DECAY_SCORE_CAP,
            tick_ms: TICK_MS,

            initial_path_len: INITIAL_PATH_LEN,
            lookahead: LOOKAHEAD,
            visible_steps: VISIBLE_STEPS,
            history_len: HISTORY_LEN,
            warmup_steps: WARMUP_STEPS,
            p_flip_initial: P_FLIP_INITIAL,
            p_flip_extend: P_FLIP_EXTEND,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json).map_err(|e| TuningError::Parse {
            reason: e.to_string(),
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        for (field, value) in [
            ("initial_time", self.initial_time),
            ("max_time", self.max_time),
            ("time_bonus", self.time_bonus),
            ("base_decay", self.base_decay),
            ("decay_per_point", self.decay_per_point),
        ] {
            if !value.is_finite() {
                return Err(TuningError::NotFinite { field });
            }
        }

        for (field, value) in [
            ("p_flip_initial", self.p_flip_initial),
            ("p_flip_extend", self.p_flip_extend),
        ] {
            // Clustering needs flips to be rarer than repeats
            if !(0.0..0.5).contains(&value) {
                return Err(TuningError::FlipProbability { field, value });
            }
        }

        if self.max_time <= 0.0 {
            return Err(TuningError::NotPositive { field: "max_time" });
        }
        if self.initial_time <= 0.0 {
            return Err(TuningError::NotPositive {
                field: "initial_time",
            });
        }
        if self.initial_time > self.max_time {
            return Err(TuningError::InitialTimeAboveMax {
                initial: self.initial_time,
                max: self.max_time,
            });
        }
        if self.base_decay <= 0.0 {
            return Err(TuningError::NotPositive {
                field: "base_decay",
            });
        }
        // Difficulty must never ease off as the score grows
        if self.decay_per_point < 0.0 {
            return Err(TuningError::Negative {
                field: "decay_per_point",
            });
        }
        if self.time_bonus < 0.0 {
            return Err(TuningError::Negative {
                field: "time_bonus",
            });
        }
        if self.tick_ms == 0 {
            return Err(TuningError::NotPositive { field: "tick_ms" });
        }
        if self.visible_steps == 0 {
            return Err(TuningError::NotPositive {
                field: "visible_steps",
            });
        }
        if self.lookahead < self.visible_steps {
            return Err(TuningError::LookaheadTooShort {
                lookahead: self.lookahead,
                visible_steps: self.visible_steps,
            });
        }
        Ok(())
    }

    /// Timer decay for one tick at the given score.
    ///
    /// Grows linearly with score up to `decay_score_cap`, then stays flat.
    pub fn decay_for_score(&self, score: u64) -> f32 {
        let capped = score.min(self.decay_score_cap);
        self.base_decay + capped as f32 * self.decay_per_point
    }

    /// Number of steps generated up front (never shorter than the look-ahead)
    pub fn opening_len(&self) -> usize {
        self.initial_path_len.max(self.lookahead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_decay_scales_then_caps() {
        let tuning = Tuning::default();
        assert!((tuning.decay_for_score(0) - 0.5).abs() < 1e-6);
        assert!((tuning.decay_for_score(100) - 0.7).abs() < 1e-6);
        assert!((tuning.decay_for_score(200) - 0.9).abs() < 1e-6);
        assert_eq!(tuning.decay_for_score(200), tuning.decay_for_score(10_000));
    }

    #[test]
    fn test_uniform_flip_rejected() {
        let tuning = Tuning {
            p_flip_extend: 0.5,
            ..Default::default()
        };
        assert_eq!(
            tuning.validate(),
            Err(TuningError::FlipProbability {
                field: "p_flip_extend",
                value: 0.5
            })
        );
    }

    #[test]
    fn test_negative_bonus_rejected() {
        assert_eq!(
            Tuning::from_json(r#"{ "time_bonus": -50.0 }"#),
            Err(TuningError::Negative {
                field: "time_bonus"
            })
        );
        let zero = Tuning {
            time_bonus: 0.0,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Ok(()));
    }

    #[test]
    fn test_decreasing_difficulty_rejected() {
        assert_eq!(
            Tuning::from_json(r#"{ "decay_per_point": -1.0 }"#),
            Err(TuningError::Negative {
                field: "decay_per_point"
            })
        );
        let tuning = Tuning::default();
        let mut last = tuning.decay_for_score(0);
        for score in 1..300 {
            let next = tuning.decay_for_score(score);
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let tuning = Tuning {
            decay_per_point: f32::NAN,
            ..Default::default()
        };
        assert_eq!(
            tuning.validate(),
            Err(TuningError::NotFinite {
                field: "decay_per_point"
            })
        );
        let tuning = Tuning {
            max_time: f32::INFINITY,
            ..Default::default()
        };
        assert_eq!(
            tuning.validate(),
            Err(TuningError::NotFinite { field: "max_time" })
        );
    }

    #[test]
    fn test_lookahead_must_cover_visible_prefix() {
        let tuning = Tuning {
            lookahead: 5,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::LookaheadTooShort { .. })
        ));
    }

    #[test]
    fn test_from_json_partial() {
        let tuning = Tuning::from_json(r#"{ "time_bonus": 5.0, "tick_ms": 40 }"#).unwrap();
        assert_eq!(tuning.time_bonus, 5.0);
        assert_eq!(tuning.tick_ms, 40);
        assert_eq!(tuning.lookahead, LOOKAHEAD);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Parse { .. })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "p_flip_initial": 0.9 }"#),
            Err(TuningError::FlipProbability { .. })
        ));
    }
}
