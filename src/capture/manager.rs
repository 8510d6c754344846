use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::{Mutex, mpsc};

use crate::capture::{
    dependencies::CaptureDependencies,
    sequencer::{SessionReporter, run_session},
    session::SessionSettings,
    types::{CancelFlag, CaptureError, CaptureStatus, Region, SessionEvent, SessionOutcome},
};
use crate::overlay::OverlayPort;

/// Entry point for capture sessions.
///
/// Sessions run as tasks on the given runtime. At most one runs at a time;
/// the naming counter and the status line outlive individual sessions.
#[derive(Clone)]
pub struct SessionManager {
    runtime: tokio::runtime::Handle,
    dependencies: Arc<CaptureDependencies>,
    /// Status of the current (or last) session.
    status: Arc<Mutex<CaptureStatus>>,
    /// Cancel flag of the running session, if any.
    active: Arc<std::sync::Mutex<Option<CancelFlag>>>,
}

/// Clears the active slot when the session task ends, even by panic.
struct ActiveGuard(Arc<std::sync::Mutex<Option<CancelFlag>>>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
    }
}

impl SessionManager {
    /// Create a session manager using the system capture backends.
    ///
    /// # Arguments
    /// * `runtime_handle` - Tokio runtime handle for spawning session tasks
    /// * `overlay` - UI context that renders the frame, counter and flash
    pub fn new(runtime_handle: &tokio::runtime::Handle, overlay: Arc<dyn OverlayPort>) -> Self {
        Self::with_dependencies(runtime_handle, CaptureDependencies::system(overlay))
    }

    /// Create a session manager with custom dependencies (useful for testing).
    pub fn with_dependencies(
        runtime_handle: &tokio::runtime::Handle,
        dependencies: CaptureDependencies,
    ) -> Self {
        Self {
            runtime: runtime_handle.clone(),
            dependencies: Arc::new(dependencies),
            status: Arc::new(Mutex::new(CaptureStatus::Idle)),
            active: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    fn active_slot(&self) -> std::sync::MutexGuard<'_, Option<CancelFlag>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start capturing `region`.
    ///
    /// Returns immediately; progress arrives through the returned handle.
    /// Fails without starting anything for a region with no area or while
    /// another session is running.
    pub fn start_session(
        &self,
        settings: SessionSettings,
        region: Region,
    ) -> Result<SessionHandle, CaptureError> {
        if region.is_degenerate() {
            return Err(CaptureError::InvalidRegion(region));
        }

        let cancel = CancelFlag::new();
        {
            let mut active = self.active_slot();
            if active.is_some() {
                log::warn!("Rejecting session request: one is already running");
                return Err(CaptureError::SessionActive);
            }
            *active = Some(cancel.clone());
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let guard = ActiveGuard(self.active.clone());
        let status = self.status.clone();
        let dependencies = self.dependencies.clone();
        let session_cancel = cancel.clone();

        log::info!(
            "Starting session: {} shot(s) of {}",
            settings.shot_count,
            region
        );

        self.runtime.spawn(async move {
            let reporter = SessionReporter::new(events_tx.clone(), status.clone());
            let outcome = run_session(region, settings, session_cancel, dependencies, reporter).await;

            *status.lock().await = CaptureStatus::from(outcome.clone());
            drop(guard);
            log::info!("{}", outcome.status_text());
            let _ = events_tx.send(SessionEvent::Finished(outcome));
        });

        Ok(SessionHandle {
            events: events_rx,
            cancel,
        })
    }

    /// Request cancellation of the running session.
    ///
    /// Returns `false` when nothing was running. Safe to call repeatedly.
    pub fn cancel(&self) -> bool {
        match self.active_slot().as_ref() {
            Some(flag) => {
                flag.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_slot().is_some()
    }

    /// Get the current capture status.
    pub async fn get_status(&self) -> CaptureStatus {
        self.status.lock().await.clone()
    }

    /// Restart sequential filenames from 1.
    pub fn reset_naming(&self) {
        self.dependencies.store.reset_naming();
    }
}

/// Caller's view of one running session.
///
/// Events arrive in order and end with [`SessionEvent::Finished`].
#[derive(Debug)]
pub struct SessionHandle {
    events: mpsc::UnboundedReceiver<SessionEvent>,
    cancel: CancelFlag,
}

impl SessionHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Drain events until the session ends.
    pub async fn wait(mut self) -> SessionOutcome {
        while let Some(event) = self.next_event().await {
            if let SessionEvent::Finished(outcome) = event {
                return outcome;
            }
        }
        SessionOutcome::Failed("session task ended without reporting".to_string())
    }
}

impl Stream for SessionHandle {
    type Item = SessionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}
