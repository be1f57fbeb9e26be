//! Moderation workflow - reviewer operations over verification records
//!
//! ## Responsibilities
//!
//! - Record list with status filter and free-text search
//! - Review detail with independent per-image load states
//! - One-way status gate (pending -> approved/rejected)
//! - Single-image replacement with pre-flight validation

mod types;

pub use types::{ImageProbeState, ReviewDetail, ReviewImage, StatusFilter, StatusUpdateRequest};

use crate::capture_flow::Side;
use crate::error::{Error, Result};
use crate::storage::{object_path, ObjectStorage};
use crate::verification::{RecordStore, VerificationRecord, VerificationStatus};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Replacement uploads above this size are rejected before any remote call
pub const MAX_REPLACEMENT_BYTES: usize = 5 * 1024 * 1024;

pub struct ModerationService {
    storage: Arc<dyn ObjectStorage>,
    records: Arc<dyn RecordStore>,
    client: reqwest::Client,
}

impl ModerationService {
    pub fn new(storage: Arc<dyn ObjectStorage>, records: Arc<dyn RecordStore>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            storage,
            records,
            client,
        }
    }

    /// List records, newest first, filtered in process
    pub async fn list(
        &self,
        filter: StatusFilter,
        search: &str,
    ) -> Result<Vec<VerificationRecord>> {
        let mut records = self.records.list_newest_first().await?;

        records.retain(|r| filter.matches(r.status));

        let needle = search.trim().to_lowercase();
        if !needle.is_empty() {
            records.retain(|r| Self::matches_search(r, &needle));
        }

        Ok(records)
    }

    /// Free-text match over id, creation date, and notes
    fn matches_search(record: &VerificationRecord, needle: &str) -> bool {
        if record.id.to_lowercase().contains(needle) {
            return true;
        }
        let rfc3339 = record.created_at.to_rfc3339().to_lowercase();
        if rfc3339.contains(needle) {
            return true;
        }
        if let Some(notes) = &record.notes {
            if notes.to_lowercase().contains(needle) {
                return true;
            }
        }
        false
    }

    /// Open the review detail: record plus three independent image probes
    ///
    /// The probes run concurrently; one broken image never blocks the
    /// other two, and every probe ends in a terminal state.
    pub async fn review(&self, id: &str) -> Result<ReviewDetail> {
        let record = self
            .records
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("verification {} not found", id)))?;

        let (front, back, selfie) = futures::join!(
            self.probe_image(Side::Front, record.photo_url(Side::Front)),
            self.probe_image(Side::Back, record.photo_url(Side::Back)),
            self.probe_image(Side::Selfie, record.photo_url(Side::Selfie)),
        );

        Ok(ReviewDetail {
            record,
            images: vec![front, back, selfie],
        })
    }

    async fn probe_image(&self, side: Side, url: Option<&str>) -> ReviewImage {
        let Some(url) = url else {
            return ReviewImage {
                side,
                url: None,
                state: ImageProbeState::NotProvided,
            };
        };

        let state = match self.client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => ImageProbeState::Loaded,
            Ok(resp) => {
                tracing::warn!(side = %side, url = %url, status = %resp.status(), "Image probe failed");
                ImageProbeState::Failed
            }
            Err(e) => {
                tracing::warn!(side = %side, url = %url, error = %e, "Image probe failed");
                ImageProbeState::Failed
            }
        };

        ReviewImage {
            side,
            url: Some(url.to_string()),
            state,
        }
    }

    /// Approve or reject a pending record
    ///
    /// The status is a one-way gate: once terminal, further transitions
    /// are rejected rather than re-applied.
    pub async fn set_status(
        &self,
        id: &str,
        status: VerificationStatus,
        notes: Option<String>,
    ) -> Result<VerificationRecord> {
        if status == VerificationStatus::Pending {
            return Err(Error::Validation(
                "status must be approved or rejected".to_string(),
            ));
        }

        let updated = self
            .records
            .update_status(id, status, notes.as_deref())
            .await?;

        if !updated {
            return match self.records.get(id).await? {
                None => Err(Error::NotFound(format!("verification {} not found", id))),
                Some(record) => Err(Error::Update(format!(
                    "verification {} is already {}",
                    id, record.status
                ))),
            };
        }

        tracing::info!(record_id = %id, status = %status, "Verification status updated");

        self.records
            .get(id)
            .await?
            .ok_or_else(|| Error::Update(format!("verification {} vanished after update", id)))
    }

    /// Replace one photo on a record
    ///
    /// Validates type and size before anything remote. The new object is
    /// uploaded to a fresh path under the record-id folder with a new
    /// timestamp; the prior object stays in storage as evidence in case
    /// the record update fails after the upload succeeded. Only the
    /// affected url column changes.
    pub async fn replace_image(
        &self,
        id: &str,
        side: Side,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        if !content_type.starts_with("image/") {
            return Err(Error::Validation(format!(
                "replacement must be an image, got {}",
                content_type
            )));
        }
        if bytes.len() > MAX_REPLACEMENT_BYTES {
            return Err(Error::Validation(format!(
                "replacement image is {} bytes; limit is {} (5 MB)",
                bytes.len(),
                MAX_REPLACEMENT_BYTES
            )));
        }

        let record = self
            .records
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("verification {} not found", id)))?;

        // Path derives from the record id, never parsed from the old URL
        let path = object_path(&record.id, Utc::now().timestamp_millis(), side);
        self.storage.upload(&path, bytes, content_type).await?;
        let url = self.storage.public_url(&path);

        self.records.update_photo_url(id, side, &url).await?;

        tracing::info!(
            record_id = %id,
            side = %side,
            path = %path,
            "Photo replaced"
        );
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::verification::MemoryRecordStore;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, status: VerificationStatus, day: u32) -> VerificationRecord {
        VerificationRecord {
            id: id.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            front_photo_url: format!("memory://id-photos/{}/1_front.jpg", id),
            back_photo_url: format!("memory://id-photos/{}/1_back.jpg", id),
            selfie_url: None,
            status,
            notes: None,
        }
    }

    async fn seeded() -> (ModerationService, Arc<MemoryStorage>, Arc<MemoryRecordStore>) {
        let storage = Arc::new(MemoryStorage::new("id-photos"));
        let records = Arc::new(MemoryRecordStore::new());
        records
            .seed(record("rec-pending", VerificationStatus::Pending, 3))
            .await;
        records
            .seed(record("rec-approved", VerificationStatus::Approved, 2))
            .await;
        records
            .seed(record("rec-rejected", VerificationStatus::Rejected, 1))
            .await;
        (
            ModerationService::new(storage.clone(), records.clone()),
            storage,
            records,
        )
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (service, _storage, _records) = seeded().await;
        let all = service.list(StatusFilter::All, "").await.unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rec-pending", "rec-approved", "rec-rejected"]);
    }

    #[tokio::test]
    async fn test_list_pending_filter() {
        let (service, _storage, _records) = seeded().await;
        let pending = service.list(StatusFilter::Pending, "").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "rec-pending");
    }

    #[tokio::test]
    async fn test_search_over_id_date_and_notes() {
        let (service, _storage, records) = seeded().await;
        let mut noted = record("rec-noted", VerificationStatus::Pending, 5);
        noted.notes = Some("Blurry back side".to_string());
        records.seed(noted).await;

        let by_id = service.list(StatusFilter::All, "rec-app").await.unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].id, "rec-approved");

        let by_date = service.list(StatusFilter::All, "2024-03-05").await.unwrap();
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[0].id, "rec-noted");

        let by_notes = service.list(StatusFilter::All, "blurry").await.unwrap();
        assert_eq!(by_notes.len(), 1);
        assert_eq!(by_notes[0].id, "rec-noted");
    }

    #[tokio::test]
    async fn test_status_gate_is_one_way() {
        let (service, _storage, _records) = seeded().await;

        let approved = service
            .set_status("rec-pending", VerificationStatus::Approved, Some("ok".into()))
            .await
            .unwrap();
        assert_eq!(approved.status, VerificationStatus::Approved);
        assert_eq!(approved.notes.as_deref(), Some("ok"));

        // A second transition must not flip the status again
        let again = service
            .set_status("rec-pending", VerificationStatus::Rejected, None)
            .await;
        assert!(matches!(again, Err(Error::Update(_))));

        let on_terminal = service
            .set_status("rec-rejected", VerificationStatus::Approved, None)
            .await;
        assert!(matches!(on_terminal, Err(Error::Update(_))));
    }

    #[tokio::test]
    async fn test_set_status_rejects_pending_target() {
        let (service, _storage, _records) = seeded().await;
        let result = service
            .set_status("rec-pending", VerificationStatus::Pending, None)
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_replace_image_touches_only_one_field() {
        let (service, storage, records) = seeded().await;
        let before = records.get("rec-pending").await.unwrap().unwrap();

        let url = service
            .replace_image("rec-pending", Side::Back, vec![0xFF, 0xD8, 1], "image/jpeg")
            .await
            .unwrap();

        let after = records.get("rec-pending").await.unwrap().unwrap();
        assert_eq!(after.back_photo_url, url);
        assert_ne!(after.back_photo_url, before.back_photo_url);
        assert_eq!(after.front_photo_url, before.front_photo_url);
        assert_eq!(after.selfie_url, before.selfie_url);
        assert_eq!(after.status, before.status);
        assert_eq!(after.notes, before.notes);

        // Fresh path under the record-id folder; prior object untouched
        assert_eq!(storage.list("rec-pending/").await.unwrap().len(), 1);
        assert!(url.contains("rec-pending/"));
        assert!(url.ends_with("_back.jpg"));
    }

    #[tokio::test]
    async fn test_oversized_replacement_rejected_before_upload() {
        let (service, storage, _records) = seeded().await;
        let six_mb = vec![0u8; 6 * 1024 * 1024];

        let result = service
            .replace_image("rec-pending", Side::Front, six_mb, "image/jpeg")
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        // Validation failed before any storage call
        assert_eq!(storage.object_count().await, 0);
    }

    #[tokio::test]
    async fn test_non_image_replacement_rejected() {
        let (service, storage, _records) = seeded().await;

        let result = service
            .replace_image("rec-pending", Side::Front, vec![1, 2, 3], "application/pdf")
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(storage.object_count().await, 0);
    }

    #[tokio::test]
    async fn test_review_probes_are_independent_and_terminal() {
        let (service, _storage, records) = seeded().await;
        let mut with_selfie = record("rec-selfie", VerificationStatus::Pending, 6);
        with_selfie.selfie_url = Some("memory://id-photos/rec-selfie/1_selfie.jpg".to_string());
        records.seed(with_selfie).await;

        let detail = service.review("rec-selfie").await.unwrap();
        assert_eq!(detail.images.len(), 3);
        // memory:// URLs are unreachable over HTTP: every probe still
        // reaches a terminal state instead of hanging
        for image in &detail.images {
            assert_eq!(image.state, ImageProbeState::Failed);
        }

        let detail = service.review("rec-pending").await.unwrap();
        let selfie = &detail.images[2];
        assert_eq!(selfie.state, ImageProbeState::NotProvided);
        assert_eq!(selfie.url, None);
    }

    #[tokio::test]
    async fn test_review_missing_record() {
        let (service, _storage, _records) = seeded().await;
        assert!(matches!(
            service.review("nope").await,
            Err(Error::NotFound(_))
        ));
    }
}
