//! System notifications via freedesktop D-Bus.

use std::collections::HashMap;
use zbus::{Connection, proxy};

use crate::capture::SessionOutcome;

/// D-Bus interface for freedesktop Notifications.
#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    /// Send a notification.
    ///
    /// # Returns
    /// Notification ID
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: Vec<&str>,
        hints: HashMap<&str, zbus::zvariant::Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

/// Send a system notification.
///
/// # Arguments
/// * `summary` - Notification title
/// * `body` - Notification body text
/// * `icon` - Optional icon name (defaults to "camera-photo")
pub async fn send_notification(summary: &str, body: &str, icon: Option<&str>) -> Result<(), String> {
    let connection = Connection::session()
        .await
        .map_err(|e| format!("Failed to connect to session bus: {}", e))?;

    let proxy = NotificationsProxy::new(&connection)
        .await
        .map_err(|e| format!("Failed to create notifications proxy: {}", e))?;

    let icon = icon.unwrap_or("camera-photo");
    let hints = HashMap::new();

    proxy
        .notify(
            "Scrollshot",
            0,
            icon,
            summary,
            body,
            vec![],
            hints,
            5000, // 5 second timeout
        )
        .await
        .map_err(|e| format!("Failed to send notification: {}", e))?;

    Ok(())
}

/// Title, body and icon describing how a session ended.
pub fn outcome_message(outcome: &SessionOutcome) -> (String, String, &'static str) {
    match outcome {
        SessionOutcome::Success { saved, requested } if saved == requested => (
            "Capture complete".to_string(),
            outcome.status_text(),
            "camera-photo",
        ),
        SessionOutcome::Success { saved, requested } => (
            "Capture finished with skipped shots".to_string(),
            format!("Saved {} of {} screenshot(s)", saved, requested),
            "dialog-warning",
        ),
        SessionOutcome::Cancelled { saved } => (
            "Capture cancelled".to_string(),
            format!("Saved {} screenshot(s) before cancelling", saved),
            "process-stop",
        ),
        SessionOutcome::Failed(_) => (
            "Capture failed".to_string(),
            outcome.status_text(),
            "dialog-error",
        ),
    }
}

/// Report a finished session, logging instead of failing when no daemon answers.
pub async fn notify_outcome(outcome: &SessionOutcome) {
    let (summary, body, icon) = outcome_message(outcome);
    if let Err(e) = send_notification(&summary, &body, Some(icon)).await {
        log::warn!("Failed to send notification: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_success_is_flagged() {
        let (summary, body, icon) = outcome_message(&SessionOutcome::Success {
            saved: 4,
            requested: 5,
        });
        assert_eq!(summary, "Capture finished with skipped shots");
        assert_eq!(body, "Saved 4 of 5 screenshot(s)");
        assert_eq!(icon, "dialog-warning");
    }

    #[test]
    fn full_success_uses_status_text() {
        let (_, body, _) = outcome_message(&SessionOutcome::Success {
            saved: 3,
            requested: 3,
        });
        assert_eq!(body, "Completed! Saved 3 screenshot(s)");
    }
}
