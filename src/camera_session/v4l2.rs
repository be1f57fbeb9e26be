//! V4L2 capture backend - one raw frame per grab via ffmpeg

use super::{CameraDevice, CameraStream, Facing, Frame};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// V4L2 camera pair (one device node per facing)
pub struct V4l2Camera {
    environment_device: String,
    user_device: String,
    width: u32,
    height: u32,
    timeout_secs: u64,
}

impl V4l2Camera {
    /// # Arguments
    /// * `environment_device` - device node for the outward camera (e.g. /dev/video0)
    /// * `user_device` - device node for the inward camera (e.g. /dev/video1)
    /// * `width`/`height` - capture resolution requested from the device
    /// * `timeout_secs` - ffmpeg timeout per frame grab
    pub fn new(
        environment_device: String,
        user_device: String,
        width: u32,
        height: u32,
        timeout_secs: u64,
    ) -> Self {
        Self {
            environment_device,
            user_device,
            width,
            height,
            timeout_secs,
        }
    }

    fn device_for(&self, facing: Facing) -> &str {
        match facing {
            Facing::Environment => &self.environment_device,
            Facing::User => &self.user_device,
        }
    }

    /// Check if ffmpeg is available
    pub async fn check_ffmpeg() -> Result<String> {
        let output = Command::new("ffmpeg")
            .arg("-version")
            .output()
            .await
            .map_err(|e| Error::DeviceUnavailable(format!("ffmpeg not found: {}", e)))?;

        if !output.status.success() {
            return Err(Error::DeviceUnavailable(
                "ffmpeg version check failed".to_string(),
            ));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        let first_line = version.lines().next().unwrap_or("unknown");
        Ok(first_line.to_string())
    }
}

#[async_trait]
impl CameraDevice for V4l2Camera {
    async fn open(&self, facing: Facing) -> Result<Box<dyn CameraStream>> {
        let device = self.device_for(facing).to_string();

        if !std::path::Path::new(&device).exists() {
            return Err(Error::DeviceUnavailable(format!(
                "capture device {} does not exist",
                device
            )));
        }

        Ok(Box::new(V4l2Stream {
            device,
            width: self.width,
            height: self.height,
            timeout_secs: self.timeout_secs,
            stopped: false,
        }))
    }
}

struct V4l2Stream {
    device: String,
    width: u32,
    height: u32,
    timeout_secs: u64,
    stopped: bool,
}

#[async_trait]
impl CameraStream for V4l2Stream {
    /// Grab one raw RGB24 frame from the device
    ///
    /// Uses kill_on_drop(true) so a timeout drops the Child and SIGKILLs
    /// the ffmpeg process instead of leaving it attached to the device.
    async fn grab_frame(&mut self) -> Result<Frame> {
        if self.stopped {
            return Err(Error::DeviceUnavailable(format!(
                "stream on {} already stopped",
                self.device
            )));
        }

        let video_size = format!("{}x{}", self.width, self.height);
        let child = Command::new("ffmpeg")
            .args([
                "-f", "v4l2",
                "-video_size", &video_size,
                "-i", &self.device,
                "-frames:v", "1",
                "-f", "rawvideo",
                "-pix_fmt", "rgb24",
                "-loglevel", "error",
                "-",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    Error::PermissionDenied(format!("cannot spawn ffmpeg: {}", e))
                }
                _ => Error::DeviceUnavailable(format!("ffmpeg spawn failed: {}", e)),
            })?;

        let timeout = Duration::from_secs(self.timeout_secs);
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let msg = stderr.trim().to_string();
                    if msg.contains("Permission denied") {
                        return Err(Error::PermissionDenied(format!(
                            "{}: {}",
                            self.device, msg
                        )));
                    }
                    return Err(Error::DeviceUnavailable(format!(
                        "ffmpeg failed on {}: {}",
                        self.device, msg
                    )));
                }

                let expected = (self.width as usize) * (self.height as usize) * 3;
                if output.stdout.len() != expected {
                    return Err(Error::Encoding(format!(
                        "no frame available from {} (got {} bytes, expected {})",
                        self.device,
                        output.stdout.len(),
                        expected
                    )));
                }

                Ok(Frame {
                    width: self.width,
                    height: self.height,
                    data: output.stdout,
                })
            }
            Ok(Err(e)) => Err(Error::DeviceUnavailable(format!(
                "ffmpeg execution failed: {}",
                e
            ))),
            Err(_) => {
                tracing::warn!(
                    device = %self.device,
                    timeout_sec = self.timeout_secs,
                    "ffmpeg frame grab timeout, process killed via kill_on_drop"
                );
                Err(Error::DeviceUnavailable(format!(
                    "frame grab timeout on {} ({}s)",
                    self.device, self.timeout_secs
                )))
            }
        }
    }

    fn stop(&mut self) {
        // No persistent child process; stopping just invalidates the handle
        self.stopped = true;
    }
}
