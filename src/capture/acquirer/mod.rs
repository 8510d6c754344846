//! Frame acquisition: one still image of a region, per call.
//!
//! [`StreamAcquirer`] starts a capture stream for the region, waits a bounded
//! settle window for the stream to hand over a frame through [`FrameSlot`], then
//! stops the stream and returns whatever arrived. There is no retry here; a
//! missing frame is reported as `Ok(None)` and the sequencer moves on.

pub mod grim;
pub mod hyprland;
mod slot;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::capture::dependencies::{DisplaySource, FrameAcquirer};
use crate::capture::types::{
    AcquiredFrame, CaptureError, Display, Region, WindowExclusion, WindowInfo,
};

pub use slot::{FrameSink, FrameSlot};

/// Output pixels per logical pixel.
pub const OUTPUT_SCALE: u32 = 2;
/// Longest wait for a stream to deliver its frame.
pub const FRAME_SETTLE_WINDOW: Duration = Duration::from_millis(500);

/// What a capture stream may see: one display, minus our own windows.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFilter {
    pub display: Display,
    pub excluded: Vec<WindowInfo>,
}

impl CaptureFilter {
    pub fn new(display: Display, exclusion: &WindowExclusion, windows: &[WindowInfo]) -> Self {
        let bounds = display.bounds();
        let excluded = windows
            .iter()
            .filter(|window| exclusion.matches(window) && window.bounds.intersects(&bounds))
            .cloned()
            .collect();
        Self { display, excluded }
    }
}

/// Parameters for one capture stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub region: Region,
    pub output_width: u32,
    pub output_height: u32,
    pub filter: CaptureFilter,
}

impl StreamConfig {
    pub fn new(region: Region, filter: CaptureFilter) -> Self {
        let scaled = |logical: i32| u32::try_from(logical).unwrap_or(0) * OUTPUT_SCALE;
        Self {
            region,
            output_width: scaled(region.width),
            output_height: scaled(region.height),
            filter,
        }
    }
}

/// A source of frames that runs until stopped.
#[async_trait]
pub trait FrameStream: Send + Sync {
    /// Starts the stream. Frames go to `sink`; an error means the stream could
    /// not be started at all.
    async fn start(
        &self,
        config: &StreamConfig,
        sink: FrameSink,
    ) -> Result<Box<dyn ActiveStream>, CaptureError>;
}

/// A running stream.
pub trait ActiveStream: Send {
    fn stop(self: Box<Self>);
}

/// Picks the display holding `region`.
///
/// Falls back to the focused display, then the first one, and finally to a
/// synthetic display covering the region when nothing is known.
pub fn resolve_display(region: &Region, displays: &[Display]) -> Display {
    if let Some(display) = displays.iter().find(|d| d.bounds().intersects(region)) {
        return display.clone();
    }

    let fallback = displays
        .iter()
        .find(|d| d.focused)
        .or_else(|| displays.first())
        .cloned();

    match fallback {
        Some(display) => {
            log::warn!(
                "Region {} is not on any display; using {}",
                region,
                display.name
            );
            display
        }
        None => {
            log::warn!("No displays reported; capturing {} without a display", region);
            Display::covering(region)
        }
    }
}

/// [`FrameAcquirer`] driving a [`FrameStream`] through a [`FrameSlot`].
pub struct StreamAcquirer {
    stream: Arc<dyn FrameStream>,
    displays: Arc<dyn DisplaySource>,
    slot: FrameSlot,
    settle: Duration,
}

impl StreamAcquirer {
    pub fn new(stream: Arc<dyn FrameStream>, displays: Arc<dyn DisplaySource>) -> Self {
        Self {
            stream,
            displays,
            slot: FrameSlot::new(),
            settle: FRAME_SETTLE_WINDOW,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

#[async_trait]
impl FrameAcquirer for StreamAcquirer {
    async fn capture(
        &self,
        region: &Region,
        display: &Display,
        exclusion: &WindowExclusion,
    ) -> Result<Option<AcquiredFrame>, CaptureError> {
        let windows = match self.displays.windows().await {
            Ok(windows) => windows,
            Err(e) => {
                log::debug!("Window list unavailable, excluding nothing: {}", e);
                Vec::new()
            }
        };
        let filter = CaptureFilter::new(display.clone(), exclusion, &windows);
        let config = StreamConfig::new(*region, filter);

        let sink = self.slot.begin();
        let stream = self.stream.start(&config, sink).await?;

        if tokio::time::timeout(self.settle, self.slot.wait())
            .await
            .is_err()
        {
            log::debug!("No frame within {:?} for {}", self.settle, region);
        }
        stream.stop();

        let frame = self.slot.take().filter(|frame| !frame.is_empty());
        Ok(frame)
    }
}
