//! Configuration enum types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How content is advanced between shots.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ScrollMode {
    /// Do not scroll; every shot captures the same content
    #[default]
    Disabled,
    /// Scroll the wheel by `scroll.amount` pixels
    Wheel,
    /// Scroll the wheel by the height of the selected region
    RegionHeight,
    /// Press `scroll.key` once
    Key,
}

/// Token that keeps custom-named files apart.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum UniquenessKind {
    /// Counter shared by every session until reset (1, 2, 3, ...)
    #[default]
    Sequential,
    /// Local time down to milliseconds
    Timestamp,
    /// Six random letters and digits
    RandomCode,
}

/// Where the uniqueness token goes relative to the suffix.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TokenPosition {
    /// `prefix_token_suffix`
    BeforeSuffix,
    /// `prefix_suffix_token`
    #[default]
    AfterSuffix,
}
