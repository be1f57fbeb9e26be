//! ImageEncoder - one live frame to a JPEG still
//!
//! ## Responsibilities
//!
//! - Single frame grab encoding at native resolution
//! - Horizontal mirror for selfie shots (stored image matches what the
//!   subject saw in the viewfinder)
//! - Fixed high quality factor: document text legibility over file size

use crate::camera_session::Frame;
use crate::capture_flow::Side;
use crate::error::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

/// JPEG quality factor (0.95 in the canvas-based capture this replaces)
const JPEG_QUALITY: u8 = 95;

pub struct ImageEncoder {
    quality: u8,
}

impl ImageEncoder {
    pub fn new() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }

    /// Encode one frame for the given side
    ///
    /// Fails with an encoding error when the stream handed over an empty
    /// or truncated frame; the caller must not advance the sequencer then.
    pub fn encode(&self, frame: &Frame, side: Side) -> Result<Vec<u8>> {
        if !frame.is_complete() {
            return Err(Error::Encoding(format!(
                "no frame available ({}x{}, {} bytes)",
                frame.width,
                frame.height,
                frame.data.len()
            )));
        }

        let mirrored;
        let pixels = if side == Side::Selfie {
            mirrored = frame.mirrored();
            &mirrored
        } else {
            frame
        };

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality)
            .encode(
                &pixels.data,
                pixels.width,
                pixels.height,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| Error::Encoding(format!("jpeg encode failed: {}", e)))?;

        tracing::debug!(
            side = %side,
            width = frame.width,
            height = frame.height,
            bytes = jpeg.len(),
            "Frame encoded"
        );

        Ok(jpeg)
    }
}

impl Default for ImageEncoder {
    fn default() -> Self {
        Self::new()
    }
}
