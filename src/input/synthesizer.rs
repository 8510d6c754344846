//! Posting synthetic input through `ydotool`.

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use super::scroll::{ScrollSpec, SyntheticEvent};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to run {program} (is it installed?): {source}")]
    Spawn {
        program: &'static str,
        source: std::io::Error,
    },

    #[error("{program} failed: {stderr}")]
    Rejected {
        program: &'static str,
        stderr: String,
    },
}

/// Emits one scroll action to the system input queue.
///
/// Implementations return once the event has been posted; receipt by the
/// target application is never confirmed.
#[async_trait]
pub trait InputSynthesizer: Send + Sync {
    async fn send_scroll(&self, spec: &ScrollSpec) -> Result<(), InputError>;
}

/// Synthesizer backed by the `ydotool` client.
#[derive(Debug, Clone)]
pub struct YdotoolSynthesizer {
    program: &'static str,
}

impl Default for YdotoolSynthesizer {
    fn default() -> Self {
        Self { program: "ydotool" }
    }
}

/// Builds the `ydotool` argument list for one scroll action.
pub fn ydotool_args(spec: &ScrollSpec) -> Vec<String> {
    let events = spec.events();
    match spec {
        ScrollSpec::Key(_) => {
            let mut args = vec!["key".to_string()];
            args.extend(events.iter().filter_map(|event| match event {
                SyntheticEvent::KeyDown(code) => Some(format!("{}:1", code)),
                SyntheticEvent::KeyUp(code) => Some(format!("{}:0", code)),
                SyntheticEvent::Wheel { .. } => None,
            }));
            args
        }
        ScrollSpec::Wheel { .. } => {
            let delta = events
                .iter()
                .find_map(|event| match event {
                    SyntheticEvent::Wheel { delta_y } => Some(*delta_y),
                    _ => None,
                })
                .unwrap_or(0);
            vec![
                "mousemove".to_string(),
                "--wheel".to_string(),
                "-x".to_string(),
                "0".to_string(),
                "-y".to_string(),
                delta.to_string(),
            ]
        }
    }
}

#[async_trait]
impl InputSynthesizer for YdotoolSynthesizer {
    async fn send_scroll(&self, spec: &ScrollSpec) -> Result<(), InputError> {
        let args = ydotool_args(spec);
        log::debug!("Posting synthetic input: {} {}", self.program, args.join(" "));

        let output = Command::new(self.program)
            .args(&args)
            .output()
            .await
            .map_err(|source| InputError::Spawn {
                program: self.program,
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InputError::Rejected {
                program: self.program,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::NavigationKey;

    #[test]
    fn wheel_args_carry_negated_delta() {
        let args = ydotool_args(&ScrollSpec::Wheel { pixels: 600 });
        assert_eq!(args, ["mousemove", "--wheel", "-x", "0", "-y", "-600"]);
    }

    #[test]
    fn key_args_press_and_release_once() {
        let args = ydotool_args(&ScrollSpec::Key(NavigationKey::PageDown));
        assert_eq!(args, ["key", "109:1", "109:0"]);
    }

    #[tokio::test]
    async fn missing_binary_reports_spawn_error() {
        let synth = YdotoolSynthesizer {
            program: "scrollshot-no-such-ydotool",
        };
        let err = synth
            .send_scroll(&ScrollSpec::Wheel { pixels: 10 })
            .await
            .expect_err("binary does not exist");
        assert!(matches!(err, InputError::Spawn { .. }), "{err:?}");
    }
}
