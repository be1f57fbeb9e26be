//! CameraSessionManager - Exclusive Camera Stream Ownership
//!
//! ## Responsibilities
//!
//! - Acquire/release of at most one live camera stream
//! - Facing-aware re-acquisition (document sides vs selfie)
//! - Guaranteed release on every exit path (drop included)

mod synthetic;
mod v4l2;

pub use synthetic::SyntheticCamera;
pub use v4l2::V4l2Camera;

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which physical camera a session targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Outward camera, used for document sides
    Environment,
    /// Inward camera, used for selfies
    User,
}

impl Facing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Environment => "environment",
            Facing::User => "user",
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw RGB24 frame at the stream's native resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Packed RGB, `width * height * 3` bytes
    pub data: Vec<u8>,
}

impl Frame {
    /// Whether the frame carries a full pixel buffer
    pub fn is_complete(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == (self.width as usize) * (self.height as usize) * 3
    }

    /// Horizontal mirror (pure computation, no suspension)
    pub fn mirrored(&self) -> Frame {
        let w = self.width as usize;
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.data.chunks_exact(w * 3) {
            for px in row.chunks_exact(3).rev() {
                data.extend_from_slice(px);
            }
        }
        Frame {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// A live stream handle produced by a [`CameraDevice`]
#[async_trait]
pub trait CameraStream: Send {
    /// Grab one frame at native resolution
    async fn grab_frame(&mut self) -> Result<Frame>;

    /// Stop the underlying tracks; must be idempotent
    fn stop(&mut self);
}

/// Capture device backend (V4L2 via ffmpeg, synthetic, ...)
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self, facing: Facing) -> Result<Box<dyn CameraStream>>;
}

/// Exclusive handle to a live capture stream
pub struct CameraSession {
    stream: Box<dyn CameraStream>,
    facing: Facing,
    released: bool,
}

impl CameraSession {
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Grab one frame; fails once the session has been released
    pub async fn grab_frame(&mut self) -> Result<Frame> {
        if self.released {
            return Err(Error::DeviceUnavailable(
                "camera session already released".to_string(),
            ));
        }
        self.stream.grab_frame().await
    }

    /// Stop every underlying track; releasing twice is a no-op
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.stream.stop();
        self.released = true;
        tracing::debug!(facing = %self.facing, "Camera session released");
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Owns the single live camera session
pub struct CameraSessionManager {
    device: Arc<dyn CameraDevice>,
    active: Option<CameraSession>,
}

impl CameraSessionManager {
    pub fn new(device: Arc<dyn CameraDevice>) -> Self {
        Self {
            device,
            active: None,
        }
    }

    /// Acquire a session for the given facing, releasing any live one first
    pub async fn acquire(&mut self, facing: Facing) -> Result<&mut CameraSession> {
        self.release();

        let stream = self.device.open(facing).await?;
        tracing::debug!(facing = %facing, "Camera session acquired");

        Ok(self.active.insert(CameraSession {
            stream,
            facing,
            released: false,
        }))
    }

    /// Keep a live session whose facing already matches, otherwise re-acquire
    pub async fn ensure_facing(&mut self, facing: Facing) -> Result<&mut CameraSession> {
        match self.active.take() {
            Some(session) if session.facing == facing => Ok(self.active.insert(session)),
            stale => {
                if let Some(mut session) = stale {
                    session.release();
                }
                self.acquire(facing).await
            }
        }
    }

    /// Release the active session, if any; idempotent
    pub fn release(&mut self) {
        if let Some(mut session) = self.active.take() {
            session.release();
        }
    }

    pub fn active(&mut self) -> Option<&mut CameraSession> {
        self.active.as_mut()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
