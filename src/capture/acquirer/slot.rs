//! Single-slot handoff between a capture stream and the waiting acquirer.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;

use crate::capture::types::AcquiredFrame;

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    frame: Option<AcquiredFrame>,
    ended: bool,
}

#[derive(Debug, Default)]
struct SlotInner {
    state: Mutex<SlotState>,
    notify: Notify,
}

/// Holds at most one frame for the current capture attempt.
///
/// Each attempt opens a new generation; deliveries tagged with an older
/// generation are discarded, so a slow stream can never hand a stale frame to a
/// later shot. The first delivery of a generation wins.
#[derive(Debug, Clone, Default)]
pub struct FrameSlot {
    inner: Arc<SlotInner>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clears the slot and opens a new generation.
    pub fn begin(&self) -> FrameSink {
        let mut state = self.lock();
        state.generation += 1;
        state.frame = None;
        state.ended = false;
        FrameSink {
            slot: self.clone(),
            generation: state.generation,
        }
    }

    /// Resolves once the current generation has a frame or its stream ended.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let state = self.lock();
                if state.frame.is_some() || state.ended {
                    return;
                }
            }
            notified.await;
        }
    }

    /// Removes and returns the buffered frame, leaving the slot empty.
    pub fn take(&self) -> Option<AcquiredFrame> {
        self.lock().frame.take()
    }

    fn deliver(&self, generation: u64, frame: AcquiredFrame) -> bool {
        {
            let mut state = self.lock();
            if state.generation != generation || state.frame.is_some() {
                return false;
            }
            state.frame = Some(frame);
        }
        self.inner.notify.notify_waiters();
        true
    }

    fn end(&self, generation: u64) {
        {
            let mut state = self.lock();
            if state.generation != generation {
                return;
            }
            state.ended = true;
        }
        self.inner.notify.notify_waiters();
    }
}

/// Write end handed to a capture stream for one generation.
#[derive(Debug, Clone)]
pub struct FrameSink {
    slot: FrameSlot,
    generation: u64,
}

impl FrameSink {
    /// Offers a frame. Returns `false` if it was stale or the slot was already filled.
    pub fn deliver(&self, frame: AcquiredFrame) -> bool {
        self.slot.deliver(self.generation, frame)
    }

    /// Signals that no (further) frame will arrive for this generation.
    pub fn end(&self) {
        self.slot.end(self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::time::Duration;

    fn frame(width: u32) -> AcquiredFrame {
        AcquiredFrame::new(RgbaImage::new(width, 1))
    }

    #[tokio::test]
    async fn first_delivery_wins_and_take_clears() {
        let slot = FrameSlot::new();
        let sink = slot.begin();
        assert!(sink.deliver(frame(2)));
        assert!(!sink.deliver(frame(3)));

        slot.wait().await;
        assert_eq!(slot.take().map(|f| f.width), Some(2));
        assert!(slot.take().is_none());
    }

    #[tokio::test]
    async fn stale_generation_is_discarded() {
        let slot = FrameSlot::new();
        let old = slot.begin();
        let _current = slot.begin();
        assert!(!old.deliver(frame(5)));
        assert!(slot.take().is_none());
    }

    #[tokio::test]
    async fn begin_clears_unconsumed_frame() {
        let slot = FrameSlot::new();
        slot.begin().deliver(frame(4));
        let _next = slot.begin();
        assert!(slot.take().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn waiter_wakes_on_delivery_from_other_task() {
        let slot = FrameSlot::new();
        let sink = slot.begin();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            sink.deliver(frame(7));
        });

        tokio::time::timeout(Duration::from_millis(500), slot.wait())
            .await
            .expect("frame arrives before timeout");
        assert_eq!(slot.take().map(|f| f.width), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn ended_stream_releases_waiter_without_frame() {
        let slot = FrameSlot::new();
        let sink = slot.begin();
        sink.end();
        tokio::time::timeout(Duration::from_millis(10), slot.wait())
            .await
            .expect("end releases waiter");
        assert!(slot.take().is_none());
    }
}
