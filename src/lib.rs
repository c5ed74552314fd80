//! Stair Climber - An infinite stair climbing arcade game
//!
//! Core modules:
//! - `sim`: Session simulation (path generation, move validation, timer decay)
//! - `input`: Raw key/pointer events to logical actions
//! - `layout`: Stair positions and sky theme for renderers
//! - `highscores`: Leaderboard persistence for finished sessions
//! - `settings`: Player preferences (character colour, sound)
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod input;
pub mod layout;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::{CharacterColor, Settings};
pub use tuning::Tuning;

use std::fmt;
use std::path::PathBuf;

/// Game configuration constants
pub mod consts {
    /// Timer starts full
    pub const INITIAL_TIME: f32 = 100.0;
    /// Timer ceiling (bonuses clamp here)
    pub const MAX_TIME: f32 = 100.0;
    /// Time added per correct step
    pub const TIME_BONUS: f32 = 3.5;

    /// Base timer decay per tick
    pub const BASE_DECAY: f32 = 0.5;
    /// Extra decay per point of score
    pub const DECAY_PER_POINT: f32 = 0.002;
    /// Score beyond this no longer speeds up decay
    pub const DECAY_SCORE_CAP: u64 = 200;

    /// Decay tick period in milliseconds (20 Hz)
    pub const TICK_MS: u32 = 50;
    /// Maximum decay ticks applied per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Steps generated at session start
    pub const INITIAL_PATH_LEN: usize = 20;
    /// Window is refilled whenever it drops below this
    pub const LOOKAHEAD: usize = 12;
    /// Steps handed to the renderer
    pub const VISIBLE_STEPS: usize = 10;
    /// Consumed steps kept for the trail
    pub const HISTORY_LEN: usize = 8;

    /// Opening steps that never change direction
    pub const WARMUP_STEPS: usize = 4;
    /// Flip chance while generating the opening path
    pub const P_FLIP_INITIAL: f64 = 0.35;
    /// Flip chance while extending (70% keep going, 30% switch)
    pub const P_FLIP_EXTEND: f64 = 0.30;
}

/// Failure loading or saving a JSON file
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the file failed
    Io { path: PathBuf, source: std::io::Error },
    /// File contents were not valid JSON for the expected type
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "Invalid JSON in {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Read and deserialize a JSON file
pub(crate) fn load_json<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
) -> Result<T, StoreError> {
    let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize and write a JSON file (pretty-printed)
pub(crate) fn save_json<T: serde::Serialize>(
    path: &std::path::Path,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
