//! Capability checks for screen capture and synthetic input.

use std::path::PathBuf;

/// Answers whether the current user may capture the screen and post input.
pub trait Permissions: Send + Sync {
    /// `Err(reason)` when frames cannot be acquired at all.
    fn screen_capture(&self) -> Result<(), String>;

    /// `Err(reason)` when synthetic input cannot be posted.
    fn input_synthesis(&self) -> Result<(), String>;
}

/// Checks that the helper binaries are installed.
#[derive(Debug, Clone)]
pub struct SystemPermissions {
    capture_program: &'static str,
    input_program: &'static str,
}

impl Default for SystemPermissions {
    fn default() -> Self {
        Self {
            capture_program: "grim",
            input_program: "ydotool",
        }
    }
}

impl SystemPermissions {
    pub fn new(capture_program: &'static str, input_program: &'static str) -> Self {
        Self {
            capture_program,
            input_program,
        }
    }
}

/// First executable named `program` on `PATH`.
fn locate(program: &str, purpose: &str) -> Result<PathBuf, String> {
    which::which(program)
        .map_err(|e| format!("{} not found in PATH ({}): {}", program, purpose, e))
}

impl Permissions for SystemPermissions {
    fn screen_capture(&self) -> Result<(), String> {
        let path = locate(self.capture_program, "needed for screen capture")?;
        log::debug!("Screen capture via {}", path.display());
        Ok(())
    }

    fn input_synthesis(&self) -> Result<(), String> {
        let path = locate(self.input_program, "needed for automatic scrolling")?;
        log::debug!("Input synthesis via {}", path.display());
        if std::env::var_os("YDOTOOL_SOCKET").is_none()
            && !PathBuf::from("/tmp/.ydotool_socket").exists()
            && std::env::var_os("XDG_RUNTIME_DIR")
                .map(|dir| PathBuf::from(dir).join(".ydotool_socket"))
                .is_none_or(|socket| !socket.exists())
        {
            log::warn!("ydotoold socket not found; scroll events may not be delivered");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_programs_are_reported() {
        let permissions = SystemPermissions::new("scrollshot-no-grim", "scrollshot-no-ydotool");
        let capture = permissions.screen_capture().unwrap_err();
        assert!(capture.contains("scrollshot-no-grim"));
        let input = permissions.input_synthesis().unwrap_err();
        assert!(input.contains("automatic scrolling"));
    }

    #[test]
    fn present_program_passes() {
        let permissions = SystemPermissions::new("sh", "sh");
        assert!(permissions.screen_capture().is_ok());
        assert!(permissions.input_synthesis().is_ok());
    }
}
