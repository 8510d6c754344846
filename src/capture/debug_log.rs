//! Optional append-only diagnostic log kept next to the captured shots.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const DEBUG_LOG_FILENAME: &str = "scrollshot-debug.log";

/// Timestamped line log written to [`DEBUG_LOG_FILENAME`] in the output directory.
///
/// Write failures are reported through `log` once and otherwise ignored; the
/// file is a diagnostic aid, never a reason to stop capturing.
#[derive(Debug)]
pub struct DebugLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl DebugLog {
    pub fn open(directory: &Path) -> Self {
        let path = directory.join(DEBUG_LOG_FILENAME);
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("Debug log {} unavailable: {}", path.display(), e);
                None
            }
        };
        Self {
            path,
            file: Mutex::new(file),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn line(&self, message: &str) {
        log::debug!("{}", message);

        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        let Some(file) = guard.as_mut() else {
            return;
        };

        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        if let Err(e) = writeln!(file, "[{}] {}", stamp, message) {
            log::warn!("Disabling debug log {}: {}", self.path.display(), e);
            *guard = None;
        }
    }
}
