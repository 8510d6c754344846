//! Configuration type definitions.

use super::enums::{ScrollMode, TokenPosition, UniquenessKind};
use crate::input::NavigationKey;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Shot count and timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CaptureConfig {
    /// Number of shots per session (valid range: 1 - 1000)
    #[serde(default = "default_shot_count")]
    pub shot_count: u32,

    /// Countdown before each shot in seconds (valid range: 0 - 30)
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            shot_count: default_shot_count(),
            delay_seconds: default_delay_seconds(),
        }
    }
}

/// Automatic scrolling between shots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScrollConfig {
    /// Scroll method: "disabled", "wheel", "region-height" or "key"
    #[serde(default)]
    pub mode: ScrollMode,

    /// Wheel distance in pixels for `mode = "wheel"` (valid range: 1 - 10000)
    #[serde(default = "default_scroll_amount")]
    pub amount: u32,

    /// Key pressed for `mode = "key"`
    /// (page-down, page-up, down, up, space, home, end, return)
    #[serde(default = "default_scroll_key")]
    pub key: NavigationKey,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            mode: ScrollMode::default(),
            amount: default_scroll_amount(),
            key: default_scroll_key(),
        }
    }
}

/// Where shots are saved and how they are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutputConfig {
    /// Directory for saved shots (supports ~ for home directory)
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Text placed at the start of each filename
    #[serde(default)]
    pub prefix: String,

    /// Text placed at the end of each filename
    #[serde(default)]
    pub suffix: String,

    /// Token used with a prefix or suffix: "sequential", "timestamp" or "random-code"
    #[serde(default)]
    pub uniqueness: UniquenessKind,

    /// Token placement: "before-suffix" or "after-suffix"
    #[serde(default)]
    pub token_position: TokenPosition,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            prefix: String::new(),
            suffix: String::new(),
            uniqueness: UniquenessKind::default(),
            token_position: TokenPosition::default(),
        }
    }
}

/// Diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DebugConfig {
    /// Append a timestamped session log to `scrollshot-debug.log` in the output directory
    #[serde(default)]
    pub log_file: bool,
}

/// Desktop notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationConfig {
    /// Show a notification when a session ends
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
        }
    }
}

fn default_shot_count() -> u32 {
    5
}

fn default_delay_seconds() -> u32 {
    3
}

fn default_scroll_amount() -> u32 {
    300
}

fn default_scroll_key() -> NavigationKey {
    NavigationKey::PageDown
}

pub(super) fn default_output_directory() -> String {
    "~/Pictures/Scrollshot".to_string()
}

fn default_notifications_enabled() -> bool {
    true
}
