//! Gameplay notifications for fire-and-forget collaborators (sound, haptics)

use serde::{Deserialize, Serialize};

use super::state::Direction;

/// Something the player should hear or feel. Draining these never feeds back
/// into the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Correct step while keeping facing
    Climbed { score: u64 },
    /// Correct step after turning
    Turned { facing: Direction, score: u64 },
    /// Wrong direction; session over
    Fell { final_score: u64 },
    /// Timer ran out; session over
    TimedOut { final_score: u64 },
}

impl GameEvent {
    /// True for the events that end a session
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameEvent::Fell { .. } | GameEvent::TimedOut { .. })
    }
}
