//! Picking the region to capture.

use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use crate::capture::{CaptureError, Region};

/// Smallest selection, in logical pixels per side, that counts as a region.
pub const MIN_SELECTION_SIZE: i32 = 10;

/// Lets the user draw a rectangle on screen.
#[async_trait]
pub trait AreaSelector: Send + Sync {
    /// `Ok(None)` when the user dismissed the picker.
    async fn select(&self) -> Result<Option<Region>, CaptureError>;
}

/// Filters out selections too small to be intentional.
pub fn accept_selection(region: Region) -> Option<Region> {
    if region.width < MIN_SELECTION_SIZE || region.height < MIN_SELECTION_SIZE {
        log::info!("Ignoring {} selection: below minimum size", region);
        return None;
    }
    Some(region)
}

/// Parses `"x,y wxh"` as printed by slurp and accepted by `--region`.
pub fn parse_geometry(text: &str) -> Result<Region, CaptureError> {
    let invalid = || CaptureError::InvalidGeometry(text.trim().to_string());

    let (position, size) = text.trim().split_once(' ').ok_or_else(invalid)?;
    let (x, y) = position.split_once(',').ok_or_else(invalid)?;
    let (width, height) = size.trim().split_once('x').ok_or_else(invalid)?;

    let number = |s: &str| s.trim().parse::<i32>().map_err(|_| invalid());
    Ok(Region::new(
        number(x)?,
        number(y)?,
        number(width)?,
        number(height)?,
    ))
}

/// Region selection through `slurp`.
#[derive(Debug, Clone, Copy)]
pub struct SlurpSelector {
    program: &'static str,
}

impl Default for SlurpSelector {
    fn default() -> Self {
        Self { program: "slurp" }
    }
}

impl SlurpSelector {
    #[cfg(test)]
    fn with_program(program: &'static str) -> Self {
        Self { program }
    }
}

/// Turns slurp's exit status and output into a selection.
fn selection_from_output(output: &Output) -> Result<Option<Region>, CaptureError> {
    // slurp exits non-zero when the selection is dismissed with Escape.
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::info!("slurp ended without a selection: {}", stderr.trim());
        return Ok(None);
    }

    let geometry = std::str::from_utf8(&output.stdout)
        .map_err(|e| CaptureError::InvalidResponse(format!("Invalid slurp output: {}", e)))?
        .trim();
    if geometry.is_empty() {
        return Ok(None);
    }
    log::debug!("slurp selected {}", geometry);
    Ok(accept_selection(parse_geometry(geometry)?))
}

#[async_trait]
impl AreaSelector for SlurpSelector {
    async fn select(&self) -> Result<Option<Region>, CaptureError> {
        let output = Command::new(self.program)
            .args(["-f", "%x,%y %wx%h"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CaptureError::SelectorUnavailable(format!("{}: {}", self.program, e)))?;

        selection_from_output(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slurp_geometry() {
        assert_eq!(
            parse_geometry("12,-40 800x600\n").unwrap(),
            Region::new(12, -40, 800, 600)
        );
    }

    #[test]
    fn rejects_malformed_geometry() {
        for text in ["", "12,40", "12 800x600", "a,b cxd", "1,2 3x"] {
            assert!(parse_geometry(text).is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn tiny_selection_is_no_selection() {
        assert_eq!(accept_selection(Region::new(0, 0, 5, 5)), None);
        assert_eq!(accept_selection(Region::new(0, 0, 9, 400)), None);
        let ok = Region::new(0, 0, 10, 10);
        assert_eq!(accept_selection(ok), Some(ok));
    }

    fn shell_output(script: &str) -> Output {
        std::process::Command::new("sh")
            .args(["-c", script])
            .output()
            .unwrap()
    }

    #[test]
    fn slurp_output_becomes_region() {
        let output = shell_output("printf '40,50 320x200\\n'");
        assert_eq!(
            selection_from_output(&output).unwrap(),
            Some(Region::new(40, 50, 320, 200))
        );
    }

    #[test]
    fn dismissed_or_tiny_selection_is_none() {
        let dismissed = shell_output("echo 'selection cancelled' >&2; exit 1");
        assert_eq!(selection_from_output(&dismissed).unwrap(), None);

        let tiny = shell_output("printf '0,0 4x4'");
        assert_eq!(selection_from_output(&tiny).unwrap(), None);
    }

    #[tokio::test]
    async fn missing_slurp_is_reported() {
        let err = SlurpSelector::with_program("scrollshot-no-slurp")
            .select()
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::SelectorUnavailable(_)));
        assert!(err.to_string().contains("scrollshot-no-slurp"));
    }
}
