//! Configuration file support for scrollshot.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/scrollshot/config.toml`. Settings include shot count and
//! countdown, automatic scrolling, output naming, and diagnostics.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

pub use enums::{ScrollMode, TokenPosition, UniquenessKind};
pub use types::{CaptureConfig, DebugConfig, NotificationConfig, OutputConfig, ScrollConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::file::expand_tilde;
use crate::capture::session::{MAX_DELAY_SECS, MAX_SHOT_COUNT, MIN_SHOT_COUNT};
use crate::capture::{NamingOptions, OutputSettings, SessionSettings};
use crate::input::ScrollPolicy;

const MAX_SCROLL_AMOUNT: u32 = 10_000;

/// Main configuration structure containing all user settings.
///
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [capture]
/// shot_count = 10
/// delay_seconds = 2
///
/// [scroll]
/// mode = "key"
/// key = "page-down"
///
/// [output]
/// directory = "~/Pictures/Scrollshot"
/// prefix = "article"
/// uniqueness = "sequential"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Shot count and countdown
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Automatic scrolling between shots
    #[serde(default)]
    pub scroll: ScrollConfig,

    /// Output directory and file naming
    #[serde(default)]
    pub output: OutputConfig,

    /// Diagnostics
    #[serde(default)]
    pub debug: DebugConfig,

    /// Desktop notifications
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `capture.shot_count`: 1 - 1000
    /// - `capture.delay_seconds`: 0 - 30
    /// - `scroll.amount`: 1 - 10000
    pub fn validate_and_clamp(&mut self) {
        if !(MIN_SHOT_COUNT..=MAX_SHOT_COUNT).contains(&self.capture.shot_count) {
            log::warn!(
                "Invalid shot_count {}, clamping to {}-{} range",
                self.capture.shot_count,
                MIN_SHOT_COUNT,
                MAX_SHOT_COUNT
            );
            self.capture.shot_count = self
                .capture
                .shot_count
                .clamp(MIN_SHOT_COUNT, MAX_SHOT_COUNT);
        }

        if self.capture.delay_seconds > MAX_DELAY_SECS {
            log::warn!(
                "Invalid delay_seconds {}, clamping to 0-{} range",
                self.capture.delay_seconds,
                MAX_DELAY_SECS
            );
            self.capture.delay_seconds = MAX_DELAY_SECS;
        }

        if !(1..=MAX_SCROLL_AMOUNT).contains(&self.scroll.amount) {
            log::warn!(
                "Invalid scroll amount {}, clamping to 1-{} range",
                self.scroll.amount,
                MAX_SCROLL_AMOUNT
            );
            self.scroll.amount = self.scroll.amount.clamp(1, MAX_SCROLL_AMOUNT);
        }

        if self.output.directory.trim().is_empty() {
            log::warn!("Empty output directory, falling back to the default");
            self.output.directory = types::default_output_directory();
        }

        for (name, text) in [
            ("prefix", &mut self.output.prefix),
            ("suffix", &mut self.output.suffix),
        ] {
            if text.contains(['/', '\0']) {
                log::warn!("Removing path separators from output {} '{}'", name, text);
                text.retain(|c| c != '/' && c != '\0');
            }
        }
    }

    /// Scroll policy selected by the `[scroll]` section.
    pub fn scroll_policy(&self) -> ScrollPolicy {
        match self.scroll.mode {
            ScrollMode::Disabled => ScrollPolicy::Disabled,
            ScrollMode::Wheel => ScrollPolicy::WheelByAmount(self.scroll.amount),
            ScrollMode::RegionHeight => ScrollPolicy::WheelByRegionHeight,
            ScrollMode::Key => ScrollPolicy::Key(self.scroll.key),
        }
    }

    /// Settings for a capture session built from this configuration.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            shot_count: self.capture.shot_count,
            delay_secs: self.capture.delay_seconds,
            scroll: self.scroll_policy(),
            output: OutputSettings {
                directory: expand_tilde(&self.output.directory),
                naming: NamingOptions {
                    prefix: self.output.prefix.clone(),
                    suffix: self.output.suffix.clone(),
                    uniqueness: self.output.uniqueness,
                    position: self.output.token_position,
                    ..NamingOptions::default()
                },
            },
            debug_log: self.debug.log_file,
        }
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/scrollshot/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("scrollshot");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from file, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit path. A missing file yields defaults.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }
}
