//! Overlay visuals shown while a session runs.
//!
//! Rendering belongs to an [`OverlayPresenter`], which must only ever be
//! touched from one UI thread. The capture core never calls a presenter
//! directly: it sends [`OverlayCommand`]s through an [`OverlayPort`], and
//! [`UiContext`] applies them, in order, on the thread that owns the presenter.

mod presenter;

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::capture::{CancelFlag, Region};

pub use presenter::{FLASH_DURATION, LogPresenter};

/// One mutation of the overlay state.
#[derive(Debug, Clone)]
pub enum OverlayCommand {
    ShowFrame(Region),
    HideFrame,
    ShowCounter {
        region: Region,
        current: u32,
        total: u32,
        countdown: u32,
    },
    HideCounter,
    /// Brief flash over the region; the presenter removes it by itself.
    ShowFlash(Region),
    /// Wires the counter's cancel affordance to the running session.
    AttachCancel(CancelFlag),
}

/// Draws the frame outline, counter and flash. Called on the UI thread only.
pub trait OverlayPresenter {
    fn show_frame(&mut self, region: Region);
    fn hide_frame(&mut self);
    fn show_counter(&mut self, region: Region, current: u32, total: u32, countdown: u32);
    fn hide_counter(&mut self);
    fn show_flash(&mut self, region: Region);
    /// The presenter calls `cancel.cancel()` when the user asks to stop.
    fn attach_cancel(&mut self, cancel: CancelFlag);
}

/// Applies a command to a presenter.
pub fn apply(presenter: &mut dyn OverlayPresenter, command: OverlayCommand) {
    match command {
        OverlayCommand::ShowFrame(region) => presenter.show_frame(region),
        OverlayCommand::HideFrame => presenter.hide_frame(),
        OverlayCommand::ShowCounter {
            region,
            current,
            total,
            countdown,
        } => presenter.show_counter(region, current, total, countdown),
        OverlayCommand::HideCounter => presenter.hide_counter(),
        OverlayCommand::ShowFlash(region) => presenter.show_flash(region),
        OverlayCommand::AttachCancel(cancel) => presenter.attach_cancel(cancel),
    }
}

/// Route from the capture core to the UI context.
#[async_trait]
pub trait OverlayPort: Send + Sync {
    /// Runs the command on the UI context and returns once it has been applied.
    async fn dispatch(&self, command: OverlayCommand);

    /// Queues the command without waiting for it.
    fn post(&self, command: OverlayCommand);
}

struct UiMessage {
    command: OverlayCommand,
    ack: Option<oneshot::Sender<()>>,
}

/// Dedicated UI thread owning an [`OverlayPresenter`].
pub struct UiContext {
    tx: Option<mpsc::Sender<UiMessage>>,
    thread: Option<JoinHandle<()>>,
}

impl UiContext {
    /// Starts the UI thread. The presenter is built on that thread, so it does
    /// not need to be `Send`.
    pub fn spawn<F, P>(factory: F) -> std::io::Result<Self>
    where
        F: FnOnce() -> P + Send + 'static,
        P: OverlayPresenter + 'static,
    {
        let (tx, rx) = mpsc::channel::<UiMessage>();
        let thread = thread::Builder::new()
            .name("overlay-ui".into())
            .spawn(move || {
                let mut presenter = factory();
                while let Ok(message) = rx.recv() {
                    apply(&mut presenter, message.command);
                    if let Some(ack) = message.ack {
                        let _ = ack.send(());
                    }
                }
                log::debug!("Overlay UI thread exiting");
            })?;

        Ok(Self {
            tx: Some(tx),
            thread: Some(thread),
        })
    }

    fn send(&self, message: UiMessage) -> bool {
        match &self.tx {
            Some(tx) => tx.send(message).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl OverlayPort for UiContext {
    async fn dispatch(&self, command: OverlayCommand) {
        let (ack_tx, ack_rx) = oneshot::channel();
        let message = UiMessage {
            command,
            ack: Some(ack_tx),
        };
        if !self.send(message) {
            log::warn!("Overlay UI thread is gone; dropping overlay command");
            return;
        }
        if ack_rx.await.is_err() {
            log::warn!("Overlay UI thread stopped before applying command");
        }
    }

    fn post(&self, command: OverlayCommand) {
        if !self.send(UiMessage { command, ack: None }) {
            log::warn!("Overlay UI thread is gone; dropping overlay command");
        }
    }
}

impl Drop for UiContext {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            log::error!("Overlay UI thread panicked");
        }
    }
}
