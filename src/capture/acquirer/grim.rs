use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::task::{self, JoinHandle};

use super::{ActiveStream, FrameSink, FrameStream, OUTPUT_SCALE, StreamConfig};
use crate::capture::types::{AcquiredFrame, CaptureError};

/// Frame stream backed by one `grim` invocation per frame.
#[derive(Debug, Clone)]
pub struct GrimStream {
    program: &'static str,
}

impl Default for GrimStream {
    fn default() -> Self {
        Self { program: "grim" }
    }
}

impl GrimStream {
    #[cfg(test)]
    fn with_program(program: &'static str) -> Self {
        Self { program }
    }
}

/// Arguments for a grim run writing a PPM of `config.region` to stdout.
pub fn grim_args(config: &StreamConfig) -> Vec<String> {
    vec![
        "-g".to_string(),
        config.region.to_geometry(),
        "-s".to_string(),
        OUTPUT_SCALE.to_string(),
        "-t".to_string(),
        "ppm".to_string(),
        "-".to_string(),
    ]
}

struct GrimCapture {
    task: JoinHandle<()>,
}

impl ActiveStream for GrimCapture {
    fn stop(self: Box<Self>) {
        // Dropping the child on abort kills grim if it is still running.
        self.task.abort();
    }
}

#[async_trait]
impl FrameStream for GrimStream {
    async fn start(
        &self,
        config: &StreamConfig,
        sink: FrameSink,
    ) -> Result<Box<dyn ActiveStream>, CaptureError> {
        if !config.filter.excluded.is_empty() {
            log::debug!(
                "grim cannot mask windows; relying on hidden overlays for {} window(s)",
                config.filter.excluded.len()
            );
        }

        let args = grim_args(config);
        log::debug!("Capturing region via {}: {}", self.program, args.join(" "));

        let child = Command::new(self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::StreamStart(format!("Failed to run grim: {}", e)))?;

        let (expected_width, expected_height) = (config.output_width, config.output_height);
        let task = tokio::spawn(async move {
            let output = match child.wait_with_output().await {
                Ok(output) => output,
                Err(e) => {
                    log::warn!("grim did not finish: {}", e);
                    sink.end();
                    return;
                }
            };

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                log::warn!("grim failed: {}", stderr.trim());
                sink.end();
                return;
            }
            if output.stdout.is_empty() {
                log::warn!("grim returned empty screenshot");
                sink.end();
                return;
            }

            let decoded = task::spawn_blocking(move || decode_frame(&output.stdout)).await;
            match decoded {
                Ok(Ok(frame)) => {
                    if (frame.width, frame.height) != (expected_width, expected_height) {
                        log::debug!(
                            "grim returned {}x{}, expected {}x{}",
                            frame.width,
                            frame.height,
                            expected_width,
                            expected_height
                        );
                    }
                    if !sink.deliver(frame) {
                        log::debug!("Discarding late grim frame");
                    }
                }
                Ok(Err(e)) => {
                    log::warn!("Could not decode grim output: {}", e);
                    sink.end();
                }
                Err(e) => {
                    log::warn!("Frame decode task failed to join: {}", e);
                    sink.end();
                }
            }
        });

        Ok(Box::new(GrimCapture { task }))
    }
}

/// Decodes grim output (PPM, or PNG from older builds) into an RGBA frame.
pub fn decode_frame(bytes: &[u8]) -> Result<AcquiredFrame, CaptureError> {
    let format = image::guess_format(bytes).unwrap_or(image::ImageFormat::Pnm);
    let image = image::load_from_memory_with_format(bytes, format)?;
    Ok(AcquiredFrame::new(image.to_rgba8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::acquirer::{CaptureFilter, FrameSlot};
    use crate::capture::types::{Display, Region};

    fn config() -> StreamConfig {
        let region = Region::new(10, 20, 300, 200);
        StreamConfig::new(
            region,
            CaptureFilter {
                display: Display::covering(&region),
                excluded: vec![],
            },
        )
    }

    #[test]
    fn args_request_scaled_ppm_on_stdout() {
        assert_eq!(
            grim_args(&config()),
            vec!["-g", "10,20 300x200", "-s", "2", "-t", "ppm", "-"]
        );
    }

    #[test]
    fn decodes_binary_ppm() {
        let mut bytes = b"P6\n2 1\n255\n".to_vec();
        bytes.extend_from_slice(&[255, 0, 0, 0, 0, 255]);
        let frame = decode_frame(&bytes).unwrap();
        assert_eq!((frame.width, frame.height), (2, 1));
        assert_eq!(frame.image.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(frame.image.get_pixel(1, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = decode_frame(b"not an image").unwrap_err();
        assert!(matches!(err, CaptureError::ImageError(_)));
    }

    #[tokio::test]
    async fn missing_binary_fails_to_start() {
        let stream = GrimStream::with_program("scrollshot-test-no-such-grim");
        let slot = FrameSlot::new();
        let err = stream.start(&config(), slot.begin()).await.err().unwrap();
        assert!(matches!(err, CaptureError::StreamStart(_)));
    }
}
