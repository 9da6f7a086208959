//! Keyboard state
//!
//! Keys are identified by strings: single characters (lower-cased) or named
//! keys such as `ArrowLeft`. Each render loop owns its own [`KeyState`], so
//! several loops in one process never see each other's input.

use std::collections::HashMap;

use winit::keyboard::{Key, NamedKey};

pub const KEY_FORWARD: &str = "w";
pub const KEY_BACK: &str = "s";
pub const KEY_LEFT: &str = "a";
pub const KEY_RIGHT: &str = "d";
pub const KEY_ARROW_UP: &str = "ArrowUp";
pub const KEY_ARROW_DOWN: &str = "ArrowDown";
pub const KEY_ARROW_LEFT: &str = "ArrowLeft";
pub const KEY_ARROW_RIGHT: &str = "ArrowRight";

/// Held/released state per key identifier.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    keys: HashMap<String, bool>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        self.keys.insert(normalize_key(key), true);
    }

    pub fn release(&mut self, key: &str) {
        self.keys.insert(normalize_key(key), false);
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.keys.get(&normalize_key(key)).copied().unwrap_or(false)
    }

    /// True if any of `keys` is held.
    pub fn any_pressed(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.is_pressed(key))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// Single characters are case-insensitive; named keys are kept as given.
pub fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().collect(),
        _ => key.to_string(),
    }
}

/// Map a winit logical key to the identifier used by [`KeyState`].
pub fn key_identifier(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(normalize_key(text.as_str())),
        Key::Named(NamedKey::ArrowUp) => Some(KEY_ARROW_UP.to_string()),
        Key::Named(NamedKey::ArrowDown) => Some(KEY_ARROW_DOWN.to_string()),
        Key::Named(NamedKey::ArrowLeft) => Some(KEY_ARROW_LEFT.to_string()),
        Key::Named(NamedKey::ArrowRight) => Some(KEY_ARROW_RIGHT.to_string()),
        Key::Named(NamedKey::Escape) => Some("Escape".to_string()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        _ => None,
    }
}
