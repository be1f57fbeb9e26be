//! Verification records - durable store for submitted capture sets
//!
//! ## Responsibilities
//!
//! - Record model and status lifecycle
//! - Capability contract for the relational collaborator
//! - MySQL repository and in-memory store

mod memory;
mod repository;
mod types;

pub use memory::MemoryRecordStore;
pub use repository::MySqlRecordStore;
pub use types::{NewVerification, VerificationRecord, VerificationStatus};

use crate::capture_flow::Side;
use crate::error::Result;
use async_trait::async_trait;

/// Record store capability contract
///
/// Records are created once per submission and mutated only by the
/// moderation workflow; nothing here deletes them.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record with status pending
    async fn insert(&self, record: NewVerification) -> Result<VerificationRecord>;

    async fn get(&self, id: &str) -> Result<Option<VerificationRecord>>;

    /// All records, newest first by creation time
    async fn list_newest_first(&self) -> Result<Vec<VerificationRecord>>;

    /// Transition status and notes, conditional on the record still being
    /// pending. Returns false when the condition did not hold (record
    /// missing or already terminal), so a lost moderation race is visible
    /// to the caller instead of silently re-flipping the status.
    async fn update_status(
        &self,
        id: &str,
        status: VerificationStatus,
        notes: Option<&str>,
    ) -> Result<bool>;

    /// Overwrite the single photo-url column for one side
    async fn update_photo_url(&self, id: &str, side: Side, url: &str) -> Result<()>;
}
