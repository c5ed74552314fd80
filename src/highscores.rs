//! High score leaderboard system
//!
//! Consumes `SessionResult`s. Each player keeps only their best score, and the
//! board holds the top `MAX_HIGH_SCORES` players. Personal bests are tracked
//! for every player, including those who have dropped off the board.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::StoreError;
use crate::settings::CharacterColor;
use crate::sim::SessionResult;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 20;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub display_name: String,
    pub score: u64,
    /// Character colour used for the run
    pub color: CharacterColor,
    /// Unix timestamp (ms) when achieved
    pub timestamp: u64,
}

/// High score leaderboard (sorted descending by score)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
    /// Best score per player, kept past the board cut
    #[serde(default)]
    pub personal_bests: BTreeMap<String, u64>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            personal_bests: BTreeMap::new(),
        }
    }

    /// Best stored score for a player
    pub fn best_for(&self, display_name: &str) -> Option<u64> {
        self.personal_bests.get(display_name).copied().or_else(|| {
            self.entries
                .iter()
                .find(|e| e.display_name == display_name)
                .map(|e| e.score)
        })
    }

    /// Check if a score beats the player's previous best
    pub fn is_personal_best(&self, display_name: &str, score: u64) -> bool {
        score > 0 && self.best_for(display_name).is_none_or(|best| score > best)
    }

    /// Check if a score would make it onto the board for this player
    pub fn qualifies(&self, display_name: &str, score: u64) -> bool {
        if !self.is_personal_best(display_name, score) {
            return false;
        }
        if self
            .entries
            .iter()
            .any(|e| e.display_name == display_name)
        {
            return true;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, display_name: &str, score: u64) -> Option<usize> {
        if !self.qualifies(display_name, score) {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .filter(|e| e.display_name != display_name)
            .position(|e| score > e.score);
        let others = self
            .entries
            .iter()
            .filter(|e| e.display_name != display_name)
            .count();
        Some(rank.unwrap_or(others) + 1)
    }

    /// Store a finished session if it beats the player's previous best.
    ///
    /// Returns the board rank (1-indexed), or None if the score is not on the
    /// board. A new personal best that misses the board is still remembered.
    pub fn record(
        &mut self,
        display_name: &str,
        result: &SessionResult,
        timestamp: u64,
    ) -> Option<usize> {
        let score = result.final_score;
        if !self.is_personal_best(display_name, score) {
            log::debug!("Score {score} for {display_name} not recorded");
            return None;
        }
        let on_board = self.qualifies(display_name, score);
        self.personal_bests.insert(display_name.to_string(), score);
        if !on_board {
            log::info!("New best for {display_name}: {score} (off the board)");
            return None;
        }

        // Replace the player's previous (lower) entry
        self.entries.retain(|e| e.display_name != display_name);

        let entry = HighScoreEntry {
            display_name: display_name.to_string(),
            score,
            color: result.cosmetic_tag,
            timestamp,
        };

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        // Trim to max size
        self.entries.truncate(MAX_HIGH_SCORES);

        log::info!("New best for {display_name}: {score} (rank {rank})");
        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Read the board from `path`
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        let mut scores: Self = crate::load_json(path)?;
        // Older files have no personal bests; the board entries seed them
        for entry in &scores.entries {
            let best = scores
                .personal_bests
                .entry(entry.display_name.clone())
                .or_insert(0);
            *best = (*best).max(entry.score);
        }
        // Files edited by hand may be out of order
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    /// Write the board to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        crate::save_json(path, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Load high scores, starting fresh when missing or corrupt
    pub fn load(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(StoreError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("{e}; starting with an empty leaderboard");
                Self::new()
            }
        }
    }
}

/// Current Unix time in milliseconds
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Format a timestamp as a relative date string
pub fn format_date(timestamp: u64, now: u64) -> String {
    let diff_mins = now.saturating_sub(timestamp) / 60_000;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    if diff_days >= 1 {
        match diff_days {
            1 => "Yesterday".to_string(),
            d if d < 7 => format!("{d} days ago"),
            d if d < 14 => "Last week".to_string(),
            d => format!("{} weeks ago", d / 7),
        }
    } else if diff_hours >= 1 {
        if diff_hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{diff_hours} hours ago")
        }
    } else if diff_mins >= 1 {
        if diff_mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{diff_mins} mins ago")
        }
    } else {
        "Just now".to_string()
    }
}
