//! Navigation keys that can advance content between shots.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keys offered for keyboard-driven scrolling.
///
/// Each variant carries its Linux evdev key code (as understood by the input
/// daemon) and a glyph used when the key is shown to the user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationKey {
    PageDown,
    PageUp,
    Down,
    Up,
    Space,
    Home,
    End,
    Return,
}

impl NavigationKey {
    /// Every supported key, in menu order.
    pub const ALL: [NavigationKey; 8] = [
        NavigationKey::PageDown,
        NavigationKey::PageUp,
        NavigationKey::Down,
        NavigationKey::Up,
        NavigationKey::Space,
        NavigationKey::Home,
        NavigationKey::End,
        NavigationKey::Return,
    ];

    /// evdev key code (`linux/input-event-codes.h`).
    pub fn key_code(self) -> u16 {
        match self {
            NavigationKey::PageDown => 109,
            NavigationKey::PageUp => 104,
            NavigationKey::Down => 108,
            NavigationKey::Up => 103,
            NavigationKey::Space => 57,
            NavigationKey::Home => 102,
            NavigationKey::End => 107,
            NavigationKey::Return => 28,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            NavigationKey::PageDown => "⇟",
            NavigationKey::PageUp => "⇞",
            NavigationKey::Down => "↓",
            NavigationKey::Up => "↑",
            NavigationKey::Space => "␣",
            NavigationKey::Home => "↖",
            NavigationKey::End => "↘",
            NavigationKey::Return => "↩",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NavigationKey::PageDown => "Page Down",
            NavigationKey::PageUp => "Page Up",
            NavigationKey::Down => "Down Arrow",
            NavigationKey::Up => "Up Arrow",
            NavigationKey::Space => "Space",
            NavigationKey::Home => "Home",
            NavigationKey::End => "End",
            NavigationKey::Return => "Return",
        }
    }
}

impl fmt::Display for NavigationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_codes_and_glyphs_are_distinct() {
        let codes: HashSet<u16> = NavigationKey::ALL.iter().map(|k| k.key_code()).collect();
        let glyphs: HashSet<&str> = NavigationKey::ALL.iter().map(|k| k.glyph()).collect();
        assert_eq!(codes.len(), NavigationKey::ALL.len());
        assert_eq!(glyphs.len(), NavigationKey::ALL.len());
    }

    #[test]
    fn page_down_uses_evdev_code() {
        assert_eq!(NavigationKey::PageDown.key_code(), 109);
        assert_eq!(NavigationKey::PageDown.to_string(), "⇟ Page Down");
    }

    #[test]
    fn keys_deserialize_from_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            key: NavigationKey,
        }
        let parsed: Wrapper = toml::from_str("key = \"page-up\"").unwrap();
        assert_eq!(parsed.key, NavigationKey::PageUp);
    }
}
