//! In-memory record store for tests and hardware-free development

use super::types::{NewVerification, VerificationRecord, VerificationStatus};
use super::RecordStore;
use crate::capture_flow::Side;
use crate::error::{Error, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<VerificationRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Seed a record directly (test setup)
    pub async fn seed(&self, record: VerificationRecord) {
        self.records.write().await.push(record);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: NewVerification) -> Result<VerificationRecord> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(Error::Record(format!("duplicate record id {}", record.id)));
        }

        let stored = VerificationRecord {
            id: record.id,
            created_at: record.created_at,
            front_photo_url: record.front_photo_url,
            back_photo_url: record.back_photo_url,
            selfie_url: record.selfie_url,
            status: VerificationStatus::Pending,
            notes: None,
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: &str) -> Result<Option<VerificationRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<VerificationRecord>> {
        let mut records = self.records.read().await.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn update_status(
        &self,
        id: &str,
        status: VerificationStatus,
        notes: Option<&str>,
    ) -> Result<bool> {
        let mut records = self.records.write().await;
        match records
            .iter_mut()
            .find(|r| r.id == id && r.status == VerificationStatus::Pending)
        {
            Some(record) => {
                record.status = status;
                record.notes = notes.map(str::to_string);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_photo_url(&self, id: &str, side: Side, url: &str) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("verification {} not found", id)))?;

        match side {
            Side::Front => record.front_photo_url = url.to_string(),
            Side::Back => record.back_photo_url = url.to_string(),
            Side::Selfie => record.selfie_url = Some(url.to_string()),
        }
        Ok(())
    }
}
