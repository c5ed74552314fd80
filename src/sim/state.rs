//! Session state and core simulation types
//!
//! Everything one play-through mutates lives in `SessionState`. Nothing here is
//! persisted; a new session replaces the whole value.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Direction of a stair step or of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// The other direction
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Horizontal sign (-1 for left, +1 for right)
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// The two logical player inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Move in the current facing direction
    Climb,
    /// Flip facing, then move
    Turn,
}

/// Rolling window of required steps (front = next step to match)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepPath {
    steps: VecDeque<Direction>,
}

impl StepPath {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            steps: VecDeque::with_capacity(capacity),
        }
    }

    /// Step that must be matched next
    pub fn head(&self) -> Option<Direction> {
        self.steps.front().copied()
    }

    /// Most recently generated step
    pub fn last(&self) -> Option<Direction> {
        self.steps.back().copied()
    }

    pub fn get(&self, index: usize) -> Option<Direction> {
        self.steps.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append to the back (generation)
    pub fn push(&mut self, dir: Direction) {
        self.steps.push_back(dir);
    }

    /// Remove from the front (consumption)
    pub fn pop_front(&mut self) -> Option<Direction> {
        self.steps.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.steps.iter().copied()
    }

    /// Copy of the first `n` steps
    pub fn prefix(&self, n: usize) -> Vec<Direction> {
        self.steps.iter().take(n).copied().collect()
    }
}

impl FromIterator<Direction> for StepPath {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Recently consumed steps for the trail (newest last)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    steps: VecDeque<Direction>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            steps: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a consumed step, evicting the oldest at capacity
    pub fn record(&mut self, dir: Direction) {
        if self.capacity == 0 {
            return;
        }
        if self.steps.len() == self.capacity {
            self.steps.pop_front();
        }
        self.steps.push_back(dir);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_vec(&self) -> Vec<Direction> {
        self.steps.iter().copied().collect()
    }
}

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Accepting moves and decay
    Active,
    /// Terminal; every further operation is a no-op
    Ended,
}

/// Mutable record for one play-through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Direction the player faces (changes only on a turn)
    pub facing: Direction,
    /// Remaining window; `path.head()` must be matched next
    pub path: StepPath,
    /// Trail of consumed steps
    pub history: History,
    /// Successful moves
    pub score: u64,
    /// Remaining time in [0, max_time]
    pub timer: f32,
    pub phase: SessionPhase,
}

impl SessionState {
    /// Fresh session around an already generated path
    pub fn new(path: StepPath, tuning: &Tuning) -> Self {
        Self {
            facing: Direction::Right,
            path,
            history: History::new(tuning.history_len),
            score: 0,
            timer: tuning.initial_time,
            phase: SessionPhase::Active,
        }
    }

    #[inline]
    pub fn is_ended(&self) -> bool {
        self.phase == SessionPhase::Ended
    }

    /// Read-only copy for a renderer
    pub fn snapshot(&self, visible_steps: usize) -> SessionSnapshot {
        SessionSnapshot {
            facing: self.facing,
            score: self.score,
            timer: self.timer,
            phase: self.phase,
            visible_path: self.path.prefix(visible_steps),
            history: self.history.to_vec(),
        }
    }
}

/// Immutable view of a session handed to the render collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub facing: Direction,
    pub score: u64,
    pub timer: f32,
    pub phase: SessionPhase,
    pub visible_path: Vec<Direction>,
    pub history: Vec<Direction>,
}

impl SessionSnapshot {
    /// Timer as a 0-1 fraction of `max_time` (for the bar width)
    pub fn timer_fraction(&self, max_time: f32) -> f32 {
        if max_time <= 0.0 {
            return 0.0;
        }
        (self.timer / max_time).clamp(0.0, 1.0)
    }

    /// Timer is low enough to flash a warning (below 30%)
    pub fn timer_critical(&self, max_time: f32) -> bool {
        self.timer_fraction(max_time) < 0.3
    }
}
