//! Stair layout for renderers
//!
//! The player stands still at the origin and the world moves under them. Each
//! upcoming step sits one stair-width left or right and one riser up from the
//! previous one; consumed steps trail off below.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{Direction, SessionSnapshot};

/// Horizontal offset between consecutive steps
pub const STEP_DX: f32 = 60.0;
/// Vertical rise between consecutive steps
pub const STEP_DY: f32 = 50.0;

/// Background theme by progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkyTheme {
    /// Score below 50
    Day,
    /// Score below 100
    Dusk,
    /// Everything above
    Space,
}

impl SkyTheme {
    pub fn for_score(score: u64) -> Self {
        match score {
            0..50 => SkyTheme::Day,
            50..100 => SkyTheme::Dusk,
            _ => SkyTheme::Space,
        }
    }

    /// Clouds drift in the lower sky; stars replace them in space
    pub fn has_clouds(&self) -> bool {
        !matches!(self, SkyTheme::Space)
    }
}

/// One stair block ready to draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StairTile {
    /// Centre relative to the player's platform
    pub pos: Vec2,
    pub dir: Direction,
    /// Draw order; nearer steps are on top
    pub depth: i32,
}

/// Everything a renderer needs to place stairs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StairLayout {
    /// Upcoming steps, nearest first
    pub ahead: Vec<StairTile>,
    /// Consumed steps, most recent first
    pub trail: Vec<StairTile>,
    pub sky: SkyTheme,
}

impl StairLayout {
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            ahead: layout_ahead(&snapshot.visible_path),
            trail: layout_trail(&snapshot.history),
            sky: SkyTheme::for_score(snapshot.score),
        }
    }
}

/// Offset of a single step in `dir`
#[inline]
pub fn step_offset(dir: Direction) -> Vec2 {
    Vec2::new(dir.sign() * STEP_DX, STEP_DY)
}

/// Lay out upcoming steps by walking up from the origin
pub fn layout_ahead(steps: &[Direction]) -> Vec<StairTile> {
    let mut pos = Vec2::ZERO;
    steps
        .iter()
        .enumerate()
        .map(|(i, &dir)| {
            pos += step_offset(dir);
            StairTile {
                pos,
                dir,
                depth: steps.len() as i32 - i as i32,
            }
        })
        .collect()
}

/// Lay out consumed steps (oldest first in `history`) by walking back down.
///
/// The most recent step is the one the player is standing on, at the origin.
pub fn layout_trail(history: &[Direction]) -> Vec<StairTile> {
    let mut pos = Vec2::ZERO;
    history
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &dir)| {
            let tile = StairTile {
                pos,
                dir,
                depth: -(i as i32),
            };
            pos -= step_offset(dir);
            tile
        })
        .collect()
}
