//! Data types for multi-shot region capture.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbaImage;
use thiserror::Error;

/// Rectangle in logical screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A region with no area cannot be captured.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Returns `true` if the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Geometry string understood by grim/slurp (`"x,y wxh"`).
    pub fn to_geometry(&self) -> String {
        format!("{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// A physical output as reported by the compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub scale: f64,
    pub focused: bool,
}

impl Display {
    pub fn bounds(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }

    /// Stand-in used when the compositor cannot be queried at all.
    pub fn covering(region: &Region) -> Self {
        Self {
            name: "default".to_string(),
            x: region.x,
            y: region.y,
            width: region.width.max(1),
            height: region.height.max(1),
            scale: 1.0,
            focused: true,
        }
    }
}

/// A top-level window as reported by the compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub address: String,
    pub class: String,
    pub title: String,
    pub pid: u32,
    pub bounds: Region,
}

/// Criteria used to keep this application's own windows out of captured pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowExclusion {
    /// Application id / window class owned by this program.
    pub app_id: String,
    /// Process id of this program.
    pub pid: u32,
}

impl WindowExclusion {
    pub fn current_process(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            pid: std::process::id(),
        }
    }

    /// Matches by identity, or an untitled window belonging to this process.
    pub fn matches(&self, window: &WindowInfo) -> bool {
        let same_app = !self.app_id.is_empty() && window.class == self.app_id;
        let untitled_own = window.pid == self.pid && window.title.trim().is_empty();
        same_app || untitled_own
    }
}

/// One still image acquired from the screen.
#[derive(Debug, Clone)]
pub struct AcquiredFrame {
    pub image: RgbaImage,
    pub width: u32,
    pub height: u32,
}

impl AcquiredFrame {
    pub fn new(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Cooperative cancellation flag shared between the session and its controllers.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Calling this more than once has no further effect.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Events emitted by a running session, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Shot `current` of `total` is about to be taken.
    Progress { current: u32, total: u32 },
    /// Countdown tick before the current shot.
    Countdown { shot: u32, remaining: u32 },
    /// A frame was written to disk.
    ShotSaved { shot: u32, path: PathBuf },
    /// A shot produced no file.
    ShotSkipped { shot: u32, reason: String },
    /// Terminal event; nothing follows it.
    Finished(SessionOutcome),
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Success { saved: u32, requested: u32 },
    Cancelled { saved: u32 },
    Failed(String),
}

impl SessionOutcome {
    /// User-visible status line for this outcome.
    pub fn status_text(&self) -> String {
        CaptureStatus::from(self.clone()).to_string()
    }
}

/// Errors that can occur while capturing.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Selection has no area: {0}")]
    InvalidRegion(Region),

    #[error("Invalid geometry '{0}', expected \"x,y wxh\"")]
    InvalidGeometry(String),

    #[error("Region selector could not be started: {0}")]
    SelectorUnavailable(String),

    #[error("A capture session is already running")]
    SessionActive,

    #[error("Screen capture is not permitted: {0}")]
    PermissionDenied(String),

    #[error("Capture stream could not be started: {0}")]
    StreamStart(String),

    #[error("Failed to save screenshot: {0}")]
    SaveError(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(String),

    #[error("Compositor returned invalid response: {0}")]
    InvalidResponse(String),
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::ImageError(err.to_string())
    }
}

/// Status of the capture manager, rendered as the user-facing status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureStatus {
    /// No session has run yet, or the status was reset.
    Idle,
    /// A session is running.
    Capturing { current: u32, total: u32 },
    /// The last session ran to completion.
    Completed { saved: u32 },
    /// The last session was cancelled by the user.
    Cancelled,
    /// The last session aborted.
    Failed(String),
}

impl From<SessionOutcome> for CaptureStatus {
    fn from(outcome: SessionOutcome) -> Self {
        match outcome {
            SessionOutcome::Success { saved, .. } => CaptureStatus::Completed { saved },
            SessionOutcome::Cancelled { .. } => CaptureStatus::Cancelled,
            SessionOutcome::Failed(reason) => CaptureStatus::Failed(reason),
        }
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureStatus::Idle => write!(f, "Ready"),
            CaptureStatus::Capturing { current, total } => {
                write!(f, "Capturing {}/{}...", current, total)
            }
            CaptureStatus::Completed { saved } => {
                write!(f, "Completed! Saved {} screenshot(s)", saved)
            }
            CaptureStatus::Cancelled => write!(f, "Cancelled"),
            CaptureStatus::Failed(reason) => write!(f, "Failed: {}", reason),
        }
    }
}
