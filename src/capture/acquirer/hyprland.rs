use std::process::{Command, Stdio};

use async_trait::async_trait;
use serde_json::Value;
use tokio::task;

use crate::capture::dependencies::DisplaySource;
use crate::capture::types::{CaptureError, Display, Region, WindowInfo};

/// Displays and windows as reported by `hyprctl`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyprlandDisplays;

#[async_trait]
impl DisplaySource for HyprlandDisplays {
    async fn displays(&self) -> Result<Vec<Display>, CaptureError> {
        let json = hyprctl_json("monitors").await?;
        parse_monitors(&json)
    }

    async fn windows(&self) -> Result<Vec<WindowInfo>, CaptureError> {
        let json = hyprctl_json("clients").await?;
        parse_clients(&json)
    }
}

async fn hyprctl_json(query: &'static str) -> Result<Value, CaptureError> {
    task::spawn_blocking(move || -> Result<Value, CaptureError> {
        let output = Command::new("hyprctl")
            .args([query, "-j"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                CaptureError::InvalidResponse(format!("Failed to run hyprctl {}: {}", query, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::InvalidResponse(format!(
                "hyprctl {} failed: {}",
                query,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            CaptureError::InvalidResponse(format!("Failed to parse hyprctl {} output: {}", query, e))
        })
    })
    .await
    .map_err(|e| CaptureError::InvalidResponse(format!("hyprctl task failed to join: {}", e)))?
}

fn as_list<'a>(json: &'a Value, what: &str) -> Result<&'a Vec<Value>, CaptureError> {
    json.as_array().ok_or_else(|| {
        CaptureError::InvalidResponse(format!("hyprctl {} did not return an array", what))
    })
}

fn int_field(value: &Value, key: &str) -> Option<i32> {
    value
        .get(key)
        .and_then(|v| v.as_f64())
        .map(|v| v.round() as i32)
}

fn pair_field(value: &Value, key: &str) -> Option<(i32, i32)> {
    let pair = value.get(key)?.as_array()?;
    let first = pair.first()?.as_f64()?;
    let second = pair.get(1)?.as_f64()?;
    Some((first.round() as i32, second.round() as i32))
}

/// Parses `hyprctl monitors -j`.
///
/// Hyprland reports the mode in physical pixels; the layout position is
/// already logical, so only the size is divided by the scale. Rotated outputs
/// (odd transforms) swap width and height.
pub fn parse_monitors(json: &Value) -> Result<Vec<Display>, CaptureError> {
    let mut displays = Vec::new();
    for monitor in as_list(json, "monitors")? {
        let Some(name) = monitor.get("name").and_then(|v| v.as_str()) else {
            log::debug!("Skipping monitor without a name");
            continue;
        };
        let (Some(x), Some(y), Some(width), Some(height)) = (
            int_field(monitor, "x"),
            int_field(monitor, "y"),
            int_field(monitor, "width"),
            int_field(monitor, "height"),
        ) else {
            log::debug!("Skipping monitor {} with incomplete geometry", name);
            continue;
        };

        let scale = monitor
            .get("scale")
            .and_then(|v| v.as_f64())
            .filter(|s| *s > 0.0)
            .unwrap_or(1.0);
        let rotated = monitor
            .get("transform")
            .and_then(|v| v.as_i64())
            .is_some_and(|t| t % 2 == 1);
        let (width, height) = if rotated {
            (height, width)
        } else {
            (width, height)
        };

        displays.push(Display {
            name: name.to_string(),
            x,
            y,
            width: (f64::from(width) / scale).round() as i32,
            height: (f64::from(height) / scale).round() as i32,
            scale,
            focused: monitor
                .get("focused")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        });
    }
    Ok(displays)
}

/// Parses `hyprctl clients -j`, skipping unmapped entries.
pub fn parse_clients(json: &Value) -> Result<Vec<WindowInfo>, CaptureError> {
    let mut windows = Vec::new();
    for client in as_list(json, "clients")? {
        if client.get("mapped").and_then(|v| v.as_bool()) == Some(false) {
            continue;
        }
        let (Some((x, y)), Some((width, height))) =
            (pair_field(client, "at"), pair_field(client, "size"))
        else {
            continue;
        };
        let text = |key: &str| {
            client
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        windows.push(WindowInfo {
            address: text("address"),
            class: text("class"),
            title: text("title"),
            pid: client
                .get("pid")
                .and_then(|v| v.as_u64())
                .and_then(|pid| u32::try_from(pid).ok())
                .unwrap_or(0),
            bounds: Region::new(x, y, width, height),
        });
    }
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn monitors_are_converted_to_logical_size() {
        let json = json!([
            {"id": 0, "name": "eDP-1", "x": 0, "y": 0, "width": 2880, "height": 1800,
             "scale": 2.0, "transform": 0, "focused": true},
            {"id": 1, "name": "DP-2", "x": 1440, "y": 0, "width": 1080, "height": 1920,
             "scale": 1.0, "transform": 1, "focused": false}
        ]);
        let displays = parse_monitors(&json).unwrap();
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].bounds(), Region::new(0, 0, 1440, 900));
        assert!(displays[0].focused);
        assert_eq!(displays[1].bounds(), Region::new(1440, 0, 1920, 1080));
    }

    #[test]
    fn incomplete_monitors_are_skipped() {
        let json = json!([{"name": "HDMI-A-1", "x": 0}, {"x": 0, "y": 0}]);
        assert!(parse_monitors(&json).unwrap().is_empty());
    }

    #[test]
    fn non_array_is_invalid_response() {
        let err = parse_monitors(&json!({"error": "nope"})).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidResponse(_)));
    }

    #[test]
    fn clients_parse_geometry_and_identity() {
        let json = json!([
            {"address": "0x55", "mapped": true, "at": [100, 50], "size": [640, 480],
             "class": "scrollshot", "title": "", "pid": 4242},
            {"address": "0x56", "mapped": false, "at": [0, 0], "size": [10, 10],
             "class": "hidden", "title": "x", "pid": 1}
        ]);
        let windows = parse_clients(&json).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].address, "0x55");
        assert_eq!(windows[0].class, "scrollshot");
        assert_eq!(windows[0].pid, 4242);
        assert_eq!(windows[0].bounds, Region::new(100, 50, 640, 480));
    }
}
