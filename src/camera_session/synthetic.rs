//! Synthetic capture backend - deterministic frames without hardware

use super::{CameraDevice, CameraStream, Facing, Frame};
use crate::error::{Error, Result};
use async_trait::async_trait;

/// Synthetic camera producing a fixed asymmetric gradient
///
/// Used when no capture hardware is present (CAMERA_BACKEND=synthetic)
/// and as the camera double in tests. The gradient differs left-to-right
/// so mirroring is observable, and the user facing is tinted so frames
/// from the two facings are distinguishable.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(64, 48)
    }
}

#[async_trait]
impl CameraDevice for SyntheticCamera {
    async fn open(&self, facing: Facing) -> Result<Box<dyn CameraStream>> {
        Ok(Box::new(SyntheticStream {
            width: self.width,
            height: self.height,
            facing,
            stopped: false,
        }))
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    facing: Facing,
    stopped: bool,
}

#[async_trait]
impl CameraStream for SyntheticStream {
    async fn grab_frame(&mut self) -> Result<Frame> {
        if self.stopped {
            return Err(Error::DeviceUnavailable(
                "synthetic stream already stopped".to_string(),
            ));
        }

        let (w, h) = (self.width as usize, self.height as usize);
        let tint = match self.facing {
            Facing::Environment => 0u8,
            Facing::User => 128u8,
        };

        let mut data = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                // Horizontal ramp in red, vertical ramp in green
                data.push(((x * 255) / w.max(1)) as u8);
                data.push(((y * 255) / h.max(1)) as u8);
                data.push(tint);
            }
        }

        Ok(Frame {
            width: self.width,
            height: self.height,
            data,
        })
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_synthetic_frame_shape() {
        let camera = SyntheticCamera::new(8, 4);
        let mut stream = camera.open(Facing::Environment).await.unwrap();
        let frame = stream.grab_frame().await.unwrap();

        assert!(frame.is_complete());
        assert_eq!(frame.width, 8);
        assert_eq!(frame.height, 4);
    }

    #[tokio::test]
    async fn test_facings_produce_distinct_frames() {
        let camera = SyntheticCamera::default();

        let mut env = camera.open(Facing::Environment).await.unwrap();
        let mut user = camera.open(Facing::User).await.unwrap();

        let a = env.grab_frame().await.unwrap();
        let b = user.grab_frame().await.unwrap();
        assert_ne!(a.data, b.data);
    }

    #[tokio::test]
    async fn test_stopped_stream_fails() {
        let camera = SyntheticCamera::default();
        let mut stream = camera.open(Facing::User).await.unwrap();
        stream.stop();

        assert!(matches!(
            stream.grab_frame().await,
            Err(Error::DeviceUnavailable(_))
        ));
    }
}
