//! Session parameters and per-shot bookkeeping.

use std::time::Duration;

use crate::capture::file::OutputSettings;
use crate::capture::types::{CancelFlag, Display, Region};
use crate::input::{ScrollPolicy, ScrollSpec};

pub const MIN_SHOT_COUNT: u32 = 1;
pub const MAX_SHOT_COUNT: u32 = 1000;
pub const MAX_DELAY_SECS: u32 = 30;

/// Pause after the overlays first appear.
pub const INITIAL_SETTLE: Duration = Duration::from_millis(200);
/// Pause after hiding the overlays so the compositor drops them from the screen.
pub const HIDE_SETTLE: Duration = Duration::from_millis(50);
/// Pause after a scroll so the content can move.
pub const SCROLL_SETTLE: Duration = Duration::from_millis(200);
/// Length of one countdown tick.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Application id used to recognise our own overlay windows.
pub const APP_ID: &str = "scrollshot";

/// Settings for one session, as requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub shot_count: u32,
    pub delay_secs: u32,
    pub scroll: ScrollPolicy,
    pub output: OutputSettings,
    pub debug_log: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            shot_count: 1,
            delay_secs: 3,
            scroll: ScrollPolicy::Disabled,
            output: OutputSettings::default(),
            debug_log: false,
        }
    }
}

impl SessionSettings {
    /// Clamps count and delay into their supported ranges.
    pub fn sanitized(mut self) -> Self {
        self.shot_count = self.shot_count.clamp(MIN_SHOT_COUNT, MAX_SHOT_COUNT);
        self.delay_secs = self.delay_secs.min(MAX_DELAY_SECS);
        self
    }
}

/// State of the running session. Lives exactly as long as the capture loop.
#[derive(Debug)]
pub struct CaptureSession {
    pub region: Region,
    pub display: Display,
    pub settings: SessionSettings,
    pub scroll: Option<ScrollSpec>,
    pub cancel: CancelFlag,
    current: u32,
}

impl CaptureSession {
    pub fn new(
        region: Region,
        display: Display,
        settings: SessionSettings,
        scroll: Option<ScrollSpec>,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            region,
            display,
            settings,
            scroll,
            cancel,
            current: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.settings.shot_count
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Moves to the next shot, or `None` once all shots were taken.
    pub fn advance(&mut self) -> Option<CaptureRequest> {
        if self.current >= self.total() {
            return None;
        }
        self.current += 1;
        Some(CaptureRequest {
            shot: self.current,
            total: self.total(),
            region: self.region,
            is_final: self.current == self.total(),
        })
    }
}

/// One shot within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub shot: u32,
    pub total: u32,
    pub region: Region,
    pub is_final: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_count_and_delay() {
        let settings = SessionSettings {
            shot_count: 0,
            delay_secs: 99,
            ..SessionSettings::default()
        }
        .sanitized();
        assert_eq!(settings.shot_count, 1);
        assert_eq!(settings.delay_secs, 30);

        let settings = SessionSettings {
            shot_count: 5000,
            delay_secs: 0,
            ..SessionSettings::default()
        }
        .sanitized();
        assert_eq!(settings.shot_count, 1000);
        assert_eq!(settings.delay_secs, 0);
    }

    #[test]
    fn advance_yields_each_shot_once_and_marks_final() {
        let region = Region::new(0, 0, 10, 10);
        let settings = SessionSettings {
            shot_count: 3,
            ..SessionSettings::default()
        };
        let mut session = CaptureSession::new(
            region,
            Display::covering(&region),
            settings,
            None,
            CancelFlag::new(),
        );

        let shots: Vec<_> = std::iter::from_fn(|| session.advance()).collect();
        assert_eq!(shots.iter().map(|r| r.shot).collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(
            shots.iter().map(|r| r.is_final).collect::<Vec<_>>(),
            [false, false, true]
        );
        assert_eq!(session.current(), 3);
        assert!(session.advance().is_none());
    }
}
