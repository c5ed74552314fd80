//! Player settings and preferences
//!
//! Persisted as JSON next to the high score table.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Character colour picked on the menu; travels with every score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CharacterColor {
    #[default]
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Slate,
}

impl CharacterColor {
    pub const ALL: [CharacterColor; 8] = [
        CharacterColor::Red,
        CharacterColor::Orange,
        CharacterColor::Yellow,
        CharacterColor::Green,
        CharacterColor::Blue,
        CharacterColor::Purple,
        CharacterColor::Pink,
        CharacterColor::Slate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterColor::Red => "Red",
            CharacterColor::Orange => "Orange",
            CharacterColor::Yellow => "Yellow",
            CharacterColor::Green => "Green",
            CharacterColor::Blue => "Blue",
            CharacterColor::Purple => "Purple",
            CharacterColor::Pink => "Pink",
            CharacterColor::Slate => "Slate",
        }
    }

    /// Accepts a name ("blue") or the exact hex ("#60A5FA")
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return Self::ALL
                .into_iter()
                .find(|c| c.hex().eq_ignore_ascii_case(s));
        }
        match s.to_lowercase().as_str() {
            "red" => Some(CharacterColor::Red),
            "orange" => Some(CharacterColor::Orange),
            "yellow" => Some(CharacterColor::Yellow),
            "green" => Some(CharacterColor::Green),
            "blue" => Some(CharacterColor::Blue),
            "purple" => Some(CharacterColor::Purple),
            "pink" => Some(CharacterColor::Pink),
            "slate" | "gray" | "grey" => Some(CharacterColor::Slate),
            _ => None,
        }
    }

    /// CSS hex colour
    pub fn hex(&self) -> &'static str {
        match self {
            CharacterColor::Red => "#F87171",
            CharacterColor::Orange => "#FB923C",
            CharacterColor::Yellow => "#FACC15",
            CharacterColor::Green => "#4ADE80",
            CharacterColor::Blue => "#60A5FA",
            CharacterColor::Purple => "#A78BFA",
            CharacterColor::Pink => "#F472B6",
            CharacterColor::Slate => "#94A3B8",
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name shown on the leaderboard
    pub display_name: String,
    /// Character colour (cosmetic only)
    pub character_color: CharacterColor,

    // === Audio ===
    pub sound_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === HUD ===
    /// Flash the timer bar when it runs low
    pub show_timer_warning: bool,

    // === Accessibility ===
    /// Reduced motion (no hop animation or sky transitions)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_name: "Anonymous".to_string(),
            character_color: CharacterColor::Red,

            sound_enabled: true,
            master_volume: 0.8,

            show_timer_warning: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = if vol.is_nan() { 0.0 } else { vol.clamp(0.0, 1.0) };
    }

    /// Volume sound collaborators should use (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.sound_enabled {
            self.master_volume
        } else {
            0.0
        }
    }

    /// Timer warning flash (respects reduced_motion)
    pub fn effective_timer_warning(&self) -> bool {
        self.show_timer_warning && !self.reduced_motion
    }

    /// Name to store with a score; blank names fall back to "Anonymous"
    pub fn leaderboard_name(&self) -> &str {
        let name = self.display_name.trim();
        if name.is_empty() { "Anonymous" } else { name }
    }

    /// Read settings from `path`
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        crate::load_json(path)
    }

    /// Write settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        crate::save_json(path, self)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Load settings, falling back to defaults when missing or corrupt
    pub fn load(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(StoreError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }
}
