//! Filename generation for captured shots.
//!
//! Without custom text, names follow the desktop's native screenshot pattern.
//! With a prefix or suffix, a uniqueness token keeps consecutive shots apart.

use chrono::{DateTime, Local};
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::config::{TokenPosition, UniquenessKind};

/// Pattern used when no custom text is configured.
pub const DEFAULT_NAME_PATTERN: &str = "Screenshot from %Y-%m-%d %H-%M-%S";
/// Timestamp token, down to milliseconds.
pub const TIMESTAMP_TOKEN_PATTERN: &str = "%Y-%m-%d_%H-%M-%S-%3f";
pub const RANDOM_CODE_LEN: usize = 6;

/// User-configured naming options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingOptions {
    pub prefix: String,
    pub suffix: String,
    pub uniqueness: UniquenessKind,
    pub position: TokenPosition,
    pub extension: String,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            uniqueness: UniquenessKind::Sequential,
            position: TokenPosition::AfterSuffix,
            extension: "png".to_string(),
        }
    }
}

impl NamingOptions {
    pub fn has_custom_text(&self) -> bool {
        !self.prefix.trim().is_empty() || !self.suffix.trim().is_empty()
    }
}

/// Sequence counter shared by every session in this process.
#[derive(Debug, Default)]
pub struct NamingState {
    counter: u64,
}

impl NamingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value handed out (0 before the first name).
    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Produces the next filename (with extension).
    ///
    /// The counter advances on every call, whether or not the caller manages
    /// to write the file.
    pub fn next_filename(&mut self, options: &NamingOptions, now: DateTime<Local>) -> String {
        self.counter += 1;

        let stem = if options.has_custom_text() {
            let token = match options.uniqueness {
                UniquenessKind::Sequential => self.counter.to_string(),
                UniquenessKind::Timestamp => now.format(TIMESTAMP_TOKEN_PATTERN).to_string(),
                UniquenessKind::RandomCode => random_code(),
            };
            compose(options, &token)
        } else {
            now.format(DEFAULT_NAME_PATTERN).to_string()
        };

        format!("{}.{}", stem, options.extension)
    }
}

fn compose(options: &NamingOptions, token: &str) -> String {
    let prefix = options.prefix.trim();
    let suffix = options.suffix.trim();
    let parts = match options.position {
        TokenPosition::BeforeSuffix => [prefix, token, suffix],
        TokenPosition::AfterSuffix => [prefix, suffix, token],
    };
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

fn random_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_CODE_LEN)
        .map(char::from)
        .collect()
}
