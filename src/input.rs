//! Raw input to logical actions
//!
//! Keyboard: Up/Right/Z climb, Down/Left/X turn. Pointer: the two on-screen
//! buttons. Key repeat from a held key is dropped here so the engine only ever
//! sees one action per physical press.

use std::collections::HashSet;

pub use crate::sim::InputAction;

/// On-screen buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Climb,
    Turn,
}

/// Map a DOM-style key name to an action
pub fn action_for_key(key: &str) -> Option<InputAction> {
    match key {
        "ArrowUp" | "ArrowRight" | "z" | "Z" => Some(InputAction::Climb),
        "ArrowDown" | "ArrowLeft" | "x" | "X" => Some(InputAction::Turn),
        _ => None,
    }
}

pub fn action_for_button(button: Button) -> InputAction {
    match button {
        Button::Climb => InputAction::Climb,
        Button::Turn => InputAction::Turn,
    }
}

/// Drops auto-repeat so each physical press yields one action
#[derive(Debug, Clone, Default)]
pub struct InputFilter {
    held: HashSet<String>,
}

impl InputFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed. `repeat` is the platform's auto-repeat flag; platforms
    /// without one still get deduplicated through the held-key set.
    pub fn key_down(&mut self, key: &str, repeat: bool) -> Option<InputAction> {
        let action = action_for_key(key)?;
        if repeat || !self.held.insert(key.to_string()) {
            return None;
        }
        Some(action)
    }

    /// Key released
    pub fn key_up(&mut self, key: &str) {
        self.held.remove(key);
    }

    /// Pointer/touch press on a button (no repeat on pointers)
    pub fn pointer_down(&mut self, button: Button) -> InputAction {
        action_for_button(button)
    }

    /// Forget held keys (window blur loses key-up events)
    pub fn reset(&mut self) {
        self.held.clear();
    }
}
