use std::time::Duration;

use log::{debug, info};

use super::OverlayPresenter;
use crate::capture::{CancelFlag, Region};

/// How long a flash stays visible before it removes itself.
pub const FLASH_DURATION: Duration = Duration::from_millis(150);

/// Presenter for terminal use: reports overlay state through the log.
///
/// There is no on-screen cancel button; the process signal handler cancels.
#[derive(Debug, Default)]
pub struct LogPresenter {
    frame_visible: bool,
    counter_visible: bool,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_visible(&self) -> bool {
        self.frame_visible
    }

    pub fn counter_visible(&self) -> bool {
        self.counter_visible
    }
}

impl OverlayPresenter for LogPresenter {
    fn show_frame(&mut self, region: Region) {
        if !self.frame_visible {
            debug!("Frame outline shown around {}", region);
        }
        self.frame_visible = true;
    }

    fn hide_frame(&mut self) {
        self.frame_visible = false;
    }

    fn show_counter(&mut self, _region: Region, current: u32, total: u32, countdown: u32) {
        self.counter_visible = true;
        if countdown > 0 {
            info!("Shot {}/{} in {}s", current, total, countdown);
        } else {
            debug!("Shot {}/{}", current, total);
        }
    }

    fn hide_counter(&mut self) {
        self.counter_visible = false;
    }

    fn show_flash(&mut self, region: Region) {
        debug!("Flash over {} for {:?}", region, FLASH_DURATION);
    }

    fn attach_cancel(&mut self, _cancel: CancelFlag) {
        info!("Press Ctrl-C to cancel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_visibility() {
        let mut presenter = LogPresenter::new();
        let region = Region::new(0, 0, 100, 100);
        presenter.show_frame(region);
        presenter.show_counter(region, 1, 3, 2);
        assert!(presenter.frame_visible() && presenter.counter_visible());

        presenter.hide_frame();
        presenter.hide_counter();
        assert!(!presenter.frame_visible() && !presenter.counter_visible());
    }
}
