//! Capture flow - ordered multi-shot capture driver
//!
//! ## Responsibilities
//!
//! - Side ordering and shot count (CaptureSequencer)
//! - Driving camera acquisition, frame grab, encode, and submission
//! - Explicit discard-and-restart distinct from per-shot retry

mod sequencer;
mod types;

pub use sequencer::{CaptureSequencer, SequencerState, Transition};
pub use types::{CaptureConfig, CapturedShot, Side};

use crate::camera_session::{CameraDevice, CameraSessionManager};
use crate::error::{Error, Result};
use crate::image_encoder::ImageEncoder;
use crate::upload_pipeline::UploadPipeline;
use crate::verification::VerificationRecord;
use serde::Serialize;
use std::sync::Arc;

/// Station state snapshot for the UI
#[derive(Debug, Clone, Serialize)]
pub struct CaptureState {
    #[serde(flatten)]
    pub sequencer: SequencerState,
    pub shots_taken: usize,
    pub shot_count: usize,
    pub camera_active: bool,
}

/// Drives one capture station flow end to end
pub struct CaptureService {
    camera: CameraSessionManager,
    encoder: ImageEncoder,
    sequencer: CaptureSequencer,
    shots: Vec<CapturedShot>,
    pipeline: Arc<UploadPipeline>,
}

impl CaptureService {
    pub fn new(
        device: Arc<dyn CameraDevice>,
        config: CaptureConfig,
        pipeline: Arc<UploadPipeline>,
    ) -> Self {
        Self {
            camera: CameraSessionManager::new(device),
            encoder: ImageEncoder::new(),
            sequencer: CaptureSequencer::new(config),
            shots: Vec::new(),
            pipeline,
        }
    }

    pub fn state(&self) -> CaptureState {
        CaptureState {
            sequencer: self.sequencer.state(),
            shots_taken: self.sequencer.shots_taken(),
            shot_count: self.sequencer.config().shot_count(),
            camera_active: self.camera.is_active(),
        }
    }

    /// Acquire the initial-facing camera for the preview
    pub async fn start(&mut self) -> Result<CaptureState> {
        let facing = self.sequencer.config().initial_facing();
        self.camera.acquire(facing).await?;
        Ok(self.state())
    }

    /// Capture one shot for the current side
    ///
    /// Camera and encoding failures leave the sequencer untouched so the
    /// same shot can be retried. Each new side that needs a different
    /// physical camera re-acquires with the matching facing.
    pub async fn capture_shot(&mut self) -> Result<CaptureState> {
        let side = self.sequencer.current_side().ok_or_else(|| {
            Error::Validation("capture set already complete; reset or submit".to_string())
        })?;

        let session = self.camera.ensure_facing(side.facing()).await?;
        let frame = session.grab_frame().await?;
        let jpeg = self.encoder.encode(&frame, side)?;

        let transition = self.sequencer.accept_shot()?;
        self.shots.push(CapturedShot::new(side, jpeg));

        tracing::info!(
            side = %side,
            shots_taken = self.sequencer.shots_taken(),
            shot_count = self.sequencer.config().shot_count(),
            "Shot captured"
        );

        match transition.next {
            Some(next) if transition.facing_changed => {
                // Hard requirement: a stale session for the old facing
                // shows a black/frozen preview for the new side.
                self.camera.ensure_facing(next.facing()).await?;
            }
            Some(_) => {}
            None => self.camera.release(),
        }

        Ok(self.state())
    }

    /// Discard every captured shot and return to the first side
    ///
    /// The explicit restart operation; not a side effect of error
    /// handling.
    pub async fn discard_and_restart(&mut self) -> Result<CaptureState> {
        self.shots.clear();
        self.sequencer.reset();
        let facing = self.sequencer.config().initial_facing();
        self.camera.acquire(facing).await?;

        tracing::info!("Capture flow discarded and restarted");
        Ok(self.state())
    }

    /// Submit the captured set as one verification record
    ///
    /// On success the shot set is cleared and the flow restarts for the
    /// next submission. On failure the shots are preserved so the user
    /// does not have to recapture.
    pub async fn submit(&mut self) -> Result<VerificationRecord> {
        let record = self.pipeline.submit(&self.shots).await?;

        self.shots.clear();
        self.sequencer.reset();
        let facing = self.sequencer.config().initial_facing();
        if let Err(e) = self.camera.acquire(facing).await {
            tracing::warn!(error = %e, "Camera re-acquisition after submit failed");
        }

        Ok(record)
    }

    /// Release the camera on teardown
    pub fn shutdown(&mut self) {
        self.camera.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera_session::{Facing, SyntheticCamera};
    use crate::storage::MemoryStorage;
    use crate::verification::{MemoryRecordStore, VerificationStatus};

    fn service(shot_count: usize) -> (CaptureService, Arc<MemoryRecordStore>) {
        let config = CaptureConfig::from_shot_count(shot_count).unwrap();
        let storage = Arc::new(MemoryStorage::new("id-photos"));
        let records = Arc::new(MemoryRecordStore::new());
        let pipeline = Arc::new(UploadPipeline::new(
            storage,
            records.clone(),
            config.sides().to_vec(),
        ));
        let device = Arc::new(SyntheticCamera::default());
        (CaptureService::new(device, config, pipeline), records)
    }

    #[tokio::test]
    async fn test_two_shot_flow_end_to_end() {
        let (mut service, records) = service(2);

        service.start().await.unwrap();
        service.capture_shot().await.unwrap();
        let state = service.capture_shot().await.unwrap();
        assert_eq!(state.sequencer, SequencerState::Complete);
        // Camera released once the set is complete
        assert!(!state.camera_active);

        let record = service.submit().await.unwrap();
        assert_eq!(record.status, VerificationStatus::Pending);
        assert!(record.front_photo_url.ends_with("_front.jpg"));
        assert!(record.back_photo_url.ends_with("_back.jpg"));
        assert_eq!(record.selfie_url, None);
        assert_eq!(records.count().await, 1);

        // Flow restarted for the next submission
        let state = service.state();
        assert_eq!(state.shots_taken, 0);
        assert!(state.camera_active);
    }

    #[tokio::test]
    async fn test_capture_rejected_once_complete() {
        let (mut service, _records) = service(2);
        service.start().await.unwrap();
        service.capture_shot().await.unwrap();
        service.capture_shot().await.unwrap();

        assert!(matches!(
            service.capture_shot().await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_selfie_side_switches_facing() {
        let (mut service, _records) = service(3);
        service.start().await.unwrap();

        service.capture_shot().await.unwrap(); // front
        service.capture_shot().await.unwrap(); // back -> selfie next
        let session = service.camera.active().expect("selfie camera live");
        assert_eq!(session.facing(), Facing::User);

        service.capture_shot().await.unwrap(); // selfie
        assert!(service.sequencer.is_complete());
    }

    #[tokio::test]
    async fn test_incomplete_submit_preserves_shots() {
        let (mut service, records) = service(3);
        service.start().await.unwrap();
        service.capture_shot().await.unwrap();
        service.capture_shot().await.unwrap();

        let result = service.submit().await;
        assert!(matches!(result, Err(Error::IncompleteSet(_))));
        assert_eq!(records.count().await, 0);
        // Shot set kept for the retry
        assert_eq!(service.shots.len(), 2);
        assert_eq!(service.sequencer.shots_taken(), 2);
    }

    #[tokio::test]
    async fn test_discard_and_restart_clears_everything() {
        let (mut service, _records) = service(2);
        service.start().await.unwrap();
        service.capture_shot().await.unwrap();

        let state = service.discard_and_restart().await.unwrap();
        assert_eq!(state.shots_taken, 0);
        assert_eq!(state.sequencer, SequencerState::Capturing(Side::Front));
        assert!(state.camera_active);
        assert!(service.shots.is_empty());
    }
}
