//! Multi-shot region capture.
//!
//! This module provides:
//! - The session manager and the capture sequencer
//! - Frame acquisition through a capture stream
//! - Naming and saving shots
//! - The optional per-session debug log

pub mod acquirer;
pub mod debug_log;
pub mod file;
pub mod naming;
pub mod session;
pub mod types;

mod dependencies;
mod manager;
mod sequencer;

pub use dependencies::{
    CaptureDependencies, DefaultFrameStore, DisplaySource, FrameAcquirer, FrameStore,
};
pub use file::OutputSettings;
pub use manager::{SessionHandle, SessionManager};
pub use naming::NamingOptions;
pub use session::SessionSettings;
pub use types::{
    AcquiredFrame, CancelFlag, CaptureError, CaptureStatus, Display, Region, SessionEvent,
    SessionOutcome, WindowExclusion, WindowInfo,
};
