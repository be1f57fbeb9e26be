//! UploadPipeline - shot set to durable verification record
//!
//! ## Responsibilities
//!
//! - Shot set validation (one image per required side)
//! - Sequential, deterministic uploads under one submission folder
//! - Record creation strictly after every upload succeeded

use crate::capture_flow::{CapturedShot, Side};
use crate::error::{Error, Result};
use crate::storage::{object_path, ObjectStorage};
use crate::verification::{NewVerification, RecordStore, VerificationRecord};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct UploadPipeline {
    storage: Arc<dyn ObjectStorage>,
    records: Arc<dyn RecordStore>,
    required_sides: Vec<Side>,
}

impl UploadPipeline {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        records: Arc<dyn RecordStore>,
        required_sides: Vec<Side>,
    ) -> Self {
        Self {
            storage,
            records,
            required_sides,
        }
    }

    pub fn required_sides(&self) -> &[Side] {
        &self.required_sides
    }

    /// Submit one complete shot set
    ///
    /// Uploads run strictly in side order so a failure short-circuits
    /// before later sides and the logs show how far the submission got.
    /// No record is created unless every upload succeeded; a failed
    /// submission leaves no partial record and is not retried here.
    pub async fn submit(&self, shots: &[CapturedShot]) -> Result<VerificationRecord> {
        let by_side = self.validate(shots)?;

        let submission_id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let timestamp_millis = created_at.timestamp_millis();

        tracing::info!(
            submission_id = %submission_id,
            sides = self.required_sides.len(),
            "Submission started"
        );

        let mut urls: HashMap<Side, String> = HashMap::new();
        for side in &self.required_sides {
            let shot = by_side[side];
            let path = object_path(&submission_id, timestamp_millis, *side);

            self.storage
                .upload(&path, shot.jpeg.clone(), "image/jpeg")
                .await
                .map_err(|e| {
                    tracing::warn!(
                        submission_id = %submission_id,
                        side = %side,
                        path = %path,
                        uploaded = urls.len(),
                        error = %e,
                        "Submission aborted on upload failure"
                    );
                    match e {
                        Error::Storage(msg) => Error::Storage(msg),
                        other => Error::Storage(other.to_string()),
                    }
                })?;

            tracing::info!(
                submission_id = %submission_id,
                side = %side,
                path = %path,
                bytes = shot.jpeg.len(),
                "Photo uploaded"
            );
            urls.insert(*side, self.storage.public_url(&path));
        }

        let record = self
            .records
            .insert(NewVerification {
                id: submission_id.clone(),
                created_at,
                front_photo_url: urls.remove(&Side::Front).unwrap_or_default(),
                back_photo_url: urls.remove(&Side::Back).unwrap_or_default(),
                selfie_url: urls.remove(&Side::Selfie),
            })
            .await?;

        tracing::info!(
            record_id = %record.id,
            status = %record.status,
            "Verification record created"
        );
        Ok(record)
    }

    /// Exactly one shot per required side
    fn validate<'a>(&self, shots: &'a [CapturedShot]) -> Result<HashMap<Side, &'a CapturedShot>> {
        let mut by_side: HashMap<Side, &CapturedShot> = HashMap::new();
        for shot in shots {
            if by_side.insert(shot.side, shot).is_some() {
                return Err(Error::IncompleteSet(format!(
                    "duplicate shot for side {}",
                    shot.side
                )));
            }
        }

        let missing: Vec<&str> = self
            .required_sides
            .iter()
            .filter(|side| !by_side.contains_key(side))
            .map(|side| side.as_str())
            .collect();

        if !missing.is_empty() {
            return Err(Error::IncompleteSet(format!(
                "required sides missing: {}",
                missing.join(", ")
            )));
        }
        Ok(by_side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::verification::{MemoryRecordStore, VerificationStatus};
    use async_trait::async_trait;

    fn shot(side: Side) -> CapturedShot {
        CapturedShot::new(side, vec![0xFF, 0xD8, side as u8])
    }

    fn pipeline_with(
        sides: Vec<Side>,
    ) -> (UploadPipeline, Arc<MemoryStorage>, Arc<MemoryRecordStore>) {
        let storage = Arc::new(MemoryStorage::new("id-photos"));
        let records = Arc::new(MemoryRecordStore::new());
        let pipeline = UploadPipeline::new(storage.clone(), records.clone(), sides);
        (pipeline, storage, records)
    }

    /// Storage that fails on any path for the given side
    struct FailingStorage {
        inner: MemoryStorage,
        fail_on: Side,
    }

    #[async_trait]
    impl ObjectStorage for FailingStorage {
        async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
            if path.ends_with(&format!("_{}.jpg", self.fail_on)) {
                return Err(Error::Storage(format!("injected failure on {}", path)));
            }
            self.inner.upload(path, bytes, content_type).await
        }

        fn public_url(&self, path: &str) -> String {
            self.inner.public_url(path)
        }

        async fn list(&self, prefix: &str) -> Result<Vec<String>> {
            self.inner.list(prefix).await
        }
    }

    #[tokio::test]
    async fn test_two_shot_submission_creates_pending_record() {
        let (pipeline, storage, records) = pipeline_with(vec![Side::Front, Side::Back]);

        let record = pipeline
            .submit(&[shot(Side::Front), shot(Side::Back)])
            .await
            .unwrap();

        assert_eq!(record.status, VerificationStatus::Pending);
        assert!(record.front_photo_url.contains(&record.id));
        assert!(record.front_photo_url.ends_with("_front.jpg"));
        assert!(record.back_photo_url.ends_with("_back.jpg"));
        assert_eq!(record.selfie_url, None);

        assert_eq!(storage.object_count().await, 2);
        assert_eq!(records.count().await, 1);
    }

    #[tokio::test]
    async fn test_three_shot_submission_sets_selfie_url() {
        let (pipeline, _storage, _records) =
            pipeline_with(vec![Side::Front, Side::Back, Side::Selfie]);

        let record = pipeline
            .submit(&[shot(Side::Front), shot(Side::Back), shot(Side::Selfie)])
            .await
            .unwrap();

        assert!(record.selfie_url.unwrap().ends_with("_selfie.jpg"));
    }

    #[tokio::test]
    async fn test_incomplete_set_creates_no_record() {
        let (pipeline, storage, records) =
            pipeline_with(vec![Side::Front, Side::Back, Side::Selfie]);

        let result = pipeline.submit(&[shot(Side::Front), shot(Side::Back)]).await;

        match result {
            Err(Error::IncompleteSet(msg)) => assert!(msg.contains("selfie")),
            other => panic!("expected IncompleteSet, got {:?}", other.map(|r| r.id)),
        }
        assert_eq!(storage.object_count().await, 0);
        assert_eq!(records.count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_side_rejected() {
        let (pipeline, _storage, records) = pipeline_with(vec![Side::Front, Side::Back]);

        let result = pipeline.submit(&[shot(Side::Front), shot(Side::Front)]).await;
        assert!(matches!(result, Err(Error::IncompleteSet(_))));
        assert_eq!(records.count().await, 0);
    }

    #[tokio::test]
    async fn test_upload_failure_aborts_without_record() {
        let storage = Arc::new(FailingStorage {
            inner: MemoryStorage::new("id-photos"),
            fail_on: Side::Back,
        });
        let records = Arc::new(MemoryRecordStore::new());
        let pipeline = UploadPipeline::new(
            storage.clone(),
            records.clone(),
            vec![Side::Front, Side::Back],
        );

        let result = pipeline.submit(&[shot(Side::Front), shot(Side::Back)]).await;
        assert!(matches!(result, Err(Error::Storage(_))));

        // The failing side short-circuited; the earlier upload happened,
        // but no record was created.
        assert_eq!(records.count().await, 0);
        assert_eq!(storage.inner.object_count().await, 1);
    }
}
