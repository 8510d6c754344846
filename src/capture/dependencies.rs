use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Local;

use crate::capture::{
    acquirer::{StreamAcquirer, grim::GrimStream, hyprland::HyprlandDisplays},
    file::{self, OutputSettings},
    naming::NamingState,
    types::{AcquiredFrame, CaptureError, Display, Region, WindowExclusion, WindowInfo},
};
use crate::input::{InputSynthesizer, YdotoolSynthesizer};
use crate::overlay::OverlayPort;
use crate::permissions::{Permissions, SystemPermissions};

/// Captures one still image of a region.
#[async_trait]
pub trait FrameAcquirer: Send + Sync {
    /// `Ok(None)` when no frame arrived; `Err` when capture could not start.
    async fn capture(
        &self,
        region: &Region,
        display: &Display,
        exclusion: &WindowExclusion,
    ) -> Result<Option<AcquiredFrame>, CaptureError>;
}

/// Enumerates displays and top-level windows.
#[async_trait]
pub trait DisplaySource: Send + Sync {
    async fn displays(&self) -> Result<Vec<Display>, CaptureError>;
    async fn windows(&self) -> Result<Vec<WindowInfo>, CaptureError>;
}

/// Names and writes captured frames.
pub trait FrameStore: Send + Sync {
    /// Picks a free destination path, advancing the naming counter.
    fn reserve_path(&self, output: &OutputSettings) -> Result<PathBuf, CaptureError>;

    fn write(&self, frame: &AcquiredFrame, path: &Path) -> Result<(), CaptureError>;

    fn reset_naming(&self);
}

/// Bundle of dependencies used by the sequencer. Each component can be mocked in tests.
#[derive(Clone)]
pub struct CaptureDependencies {
    pub acquirer: Arc<dyn FrameAcquirer>,
    pub displays: Arc<dyn DisplaySource>,
    pub synthesizer: Arc<dyn InputSynthesizer>,
    pub store: Arc<dyn FrameStore>,
    pub permissions: Arc<dyn Permissions>,
    pub overlay: Arc<dyn OverlayPort>,
}

impl CaptureDependencies {
    /// System backends (grim, hyprctl, ydotool) driving the given overlay.
    pub fn system(overlay: Arc<dyn OverlayPort>) -> Self {
        let displays: Arc<dyn DisplaySource> = Arc::new(HyprlandDisplays);
        Self {
            acquirer: Arc::new(StreamAcquirer::new(
                Arc::new(GrimStream::default()),
                displays.clone(),
            )),
            displays,
            synthesizer: Arc::new(YdotoolSynthesizer::default()),
            store: Arc::new(DefaultFrameStore::default()),
            permissions: Arc::new(SystemPermissions::default()),
            overlay,
        }
    }
}

/// Writes PNGs through [`file`], naming them from a process-wide counter.
#[derive(Debug, Default)]
pub struct DefaultFrameStore {
    naming: Mutex<NamingState>,
}

impl FrameStore for DefaultFrameStore {
    fn reserve_path(&self, output: &OutputSettings) -> Result<PathBuf, CaptureError> {
        let directory = file::ensure_directory_exists(&output.directory)?;
        let filename = {
            let mut naming = self
                .naming
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            naming.next_filename(&output.naming, Local::now())
        };
        Ok(file::unique_path(&directory, &filename))
    }

    fn write(&self, frame: &AcquiredFrame, path: &Path) -> Result<(), CaptureError> {
        file::save_frame(frame, path)
    }

    fn reset_naming(&self) {
        self.naming
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .reset();
    }
}
