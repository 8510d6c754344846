//! The capture loop: countdown, hide, acquire, restore, save, flash, scroll.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task;
use tokio::time::sleep;

use crate::capture::{
    acquirer::resolve_display,
    debug_log::DebugLog,
    dependencies::{CaptureDependencies, FrameStore},
    file::{self, OutputSettings},
    session::{
        APP_ID, COUNTDOWN_TICK, CaptureRequest, CaptureSession, HIDE_SETTLE, INITIAL_SETTLE,
        SCROLL_SETTLE, SessionSettings,
    },
    types::{
        AcquiredFrame, CancelFlag, CaptureError, CaptureStatus, Region, SessionEvent,
        SessionOutcome, WindowExclusion,
    },
};
use crate::overlay::OverlayCommand;

/// Where a running session reports to.
pub(crate) struct SessionReporter {
    events: mpsc::UnboundedSender<SessionEvent>,
    status: Arc<Mutex<CaptureStatus>>,
    debug_log: Option<DebugLog>,
}

impl SessionReporter {
    pub(crate) fn new(
        events: mpsc::UnboundedSender<SessionEvent>,
        status: Arc<Mutex<CaptureStatus>>,
    ) -> Self {
        Self {
            events,
            status,
            debug_log: None,
        }
    }

    fn emit(&self, event: SessionEvent) {
        // The caller may have dropped its handle; the session still runs to the end.
        let _ = self.events.send(event);
    }

    fn note(&self, message: &str) {
        match &self.debug_log {
            Some(debug_log) => debug_log.line(message),
            None => log::debug!("{}", message),
        }
    }

    async fn progress(&self, request: &CaptureRequest) {
        *self.status.lock().await = CaptureStatus::Capturing {
            current: request.shot,
            total: request.total,
        };
        self.emit(SessionEvent::Progress {
            current: request.shot,
            total: request.total,
        });
    }

    fn skipped(&self, shot: u32, reason: String) {
        log::warn!("Shot {} skipped: {}", shot, reason);
        self.note(&format!("shot {} skipped: {}", shot, reason));
        self.emit(SessionEvent::ShotSkipped { shot, reason });
    }
}

async fn show_overlays(
    deps: &CaptureDependencies,
    region: Region,
    current: u32,
    total: u32,
    countdown: u32,
) {
    deps.overlay.dispatch(OverlayCommand::ShowFrame(region)).await;
    deps.overlay
        .dispatch(OverlayCommand::ShowCounter {
            region,
            current,
            total,
            countdown,
        })
        .await;
}

async fn hide_overlays(deps: &CaptureDependencies) {
    deps.overlay.dispatch(OverlayCommand::HideCounter).await;
    deps.overlay.dispatch(OverlayCommand::HideFrame).await;
}

async fn cancelled(deps: &CaptureDependencies, reporter: &SessionReporter, saved: u32) -> SessionOutcome {
    hide_overlays(deps).await;
    log::info!("Session cancelled after {} saved shot(s)", saved);
    reporter.note(&format!("cancelled, {} saved", saved));
    SessionOutcome::Cancelled { saved }
}

/// Reserves a path and writes the frame on a blocking worker.
async fn persist(
    store: Arc<dyn FrameStore>,
    output: OutputSettings,
    frame: AcquiredFrame,
) -> Result<PathBuf, CaptureError> {
    task::spawn_blocking(move || {
        let path = store.reserve_path(&output)?;
        store.write(&frame, &path)?;
        Ok(path)
    })
    .await
    .map_err(|e| CaptureError::ImageError(format!("Save task failed: {}", e)))?
}

/// Runs one session to completion and returns how it ended.
///
/// Overlays are hidden whenever this returns after having shown them.
pub(crate) async fn run_session(
    region: Region,
    settings: SessionSettings,
    cancel: CancelFlag,
    deps: Arc<CaptureDependencies>,
    mut reporter: SessionReporter,
) -> SessionOutcome {
    let settings = settings.sanitized();

    if settings.debug_log {
        match file::ensure_directory_exists(&settings.output.directory) {
            Ok(directory) => reporter.debug_log = Some(DebugLog::open(&directory)),
            Err(e) => log::warn!("Debug log disabled: {}", e),
        }
    }
    reporter.note(&format!(
        "session start: {} shot(s), delay {}s, scroll {:?}, region {}",
        settings.shot_count, settings.delay_secs, settings.scroll, region
    ));

    if let Err(reason) = deps.permissions.screen_capture() {
        let error = CaptureError::PermissionDenied(reason);
        log::error!("{}", error);
        reporter.note(&format!("capture unavailable: {}", error));
        return SessionOutcome::Failed(error.to_string());
    }

    let mut scroll = settings.scroll.resolve(&region);
    if scroll.is_some()
        && let Err(reason) = deps.permissions.input_synthesis()
    {
        log::warn!("Automatic scrolling disabled: {}", reason);
        reporter.note(&format!("scrolling disabled: {}", reason));
        scroll = None;
    }

    let displays = match deps.displays.displays().await {
        Ok(displays) => displays,
        Err(e) => {
            log::warn!("Could not enumerate displays: {}", e);
            Vec::new()
        }
    };
    let display = resolve_display(&region, &displays);
    reporter.note(&format!("display {}", display.name));

    let exclusion = WindowExclusion::current_process(APP_ID);
    let output = settings.output.clone();
    let delay = settings.delay_secs;
    let mut session = CaptureSession::new(region, display, settings, scroll, cancel);
    let total = session.total();

    deps.overlay
        .dispatch(OverlayCommand::AttachCancel(session.cancel.clone()))
        .await;
    show_overlays(&deps, region, 1, total, delay).await;
    sleep(INITIAL_SETTLE).await;

    let mut saved = 0;
    while let Some(request) = session.advance() {
        if session.is_cancelled() {
            return cancelled(&deps, &reporter, saved).await;
        }

        reporter.progress(&request).await;
        deps.overlay
            .dispatch(OverlayCommand::ShowCounter {
                region,
                current: request.shot,
                total,
                countdown: delay,
            })
            .await;

        if delay > 0 {
            for remaining in (1..=delay).rev() {
                if session.is_cancelled() {
                    return cancelled(&deps, &reporter, saved).await;
                }
                reporter.emit(SessionEvent::Countdown {
                    shot: request.shot,
                    remaining,
                });
                deps.overlay
                    .dispatch(OverlayCommand::ShowCounter {
                        region,
                        current: request.shot,
                        total,
                        countdown: remaining,
                    })
                    .await;
                sleep(COUNTDOWN_TICK).await;
            }
            if session.is_cancelled() {
                return cancelled(&deps, &reporter, saved).await;
            }
        }

        hide_overlays(&deps).await;
        sleep(HIDE_SETTLE).await;

        let acquired = deps
            .acquirer
            .capture(&region, &session.display, &exclusion)
            .await;

        show_overlays(&deps, region, request.shot, total, 0).await;

        let frame = match acquired {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                reporter.skipped(request.shot, "no frame arrived".to_string());
                continue;
            }
            Err(e) => {
                let reason = e.to_string();
                log::error!("Capture failed on shot {}: {}", request.shot, reason);
                reporter.note(&format!("shot {} fatal: {}", request.shot, reason));
                hide_overlays(&deps).await;
                return SessionOutcome::Failed(reason);
            }
        };
        reporter.note(&format!(
            "shot {} acquired {}x{}",
            request.shot, frame.width, frame.height
        ));

        match persist(deps.store.clone(), output.clone(), frame).await {
            Ok(path) => {
                saved += 1;
                log::info!("Saved shot {}/{} to {}", request.shot, total, path.display());
                reporter.note(&format!("shot {} saved to {}", request.shot, path.display()));
                reporter.emit(SessionEvent::ShotSaved {
                    shot: request.shot,
                    path,
                });
                deps.overlay.post(OverlayCommand::ShowFlash(region));
            }
            Err(e) => {
                log::error!("Failed to save shot {}: {}", request.shot, e);
                reporter.skipped(request.shot, e.to_string());
            }
        }

        if !request.is_final
            && let Some(spec) = session.scroll
        {
            if let Err(e) = deps.synthesizer.send_scroll(&spec).await {
                log::warn!("Scroll after shot {} failed: {}", request.shot, e);
                reporter.note(&format!("scroll failed: {}", e));
            }
            sleep(SCROLL_SETTLE).await;
        }
    }

    hide_overlays(&deps).await;
    log::info!("Session complete: {}/{} shot(s) saved", saved, total);
    reporter.note(&format!("session complete: {}/{} saved", saved, total));
    SessionOutcome::Success {
        saved,
        requested: total,
    }
}
