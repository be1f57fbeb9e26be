//! MySQL repository for verification records

use super::types::{NewVerification, VerificationRecord, VerificationStatus};
use super::RecordStore;
use crate::capture_flow::Side;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

/// Record SELECT columns
const RECORD_COLUMNS: &str = r#"
    id, created_at, front_photo_url, back_photo_url, selfie_url, status, notes
"#;

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    id: String,
    created_at: DateTime<Utc>,
    front_photo_url: String,
    back_photo_url: String,
    selfie_url: Option<String>,
    status: String,
    notes: Option<String>,
}

impl TryFrom<RecordRow> for VerificationRecord {
    type Error = Error;

    fn try_from(row: RecordRow) -> Result<Self> {
        Ok(VerificationRecord {
            status: VerificationStatus::parse(&row.status)
                .map_err(|_| Error::Record(format!("corrupt status value: {}", row.status)))?,
            id: row.id,
            created_at: row.created_at,
            front_photo_url: row.front_photo_url,
            back_photo_url: row.back_photo_url,
            selfie_url: row.selfie_url,
            notes: row.notes,
        })
    }
}

/// Side to photo-url column mapping; column names are fixed here, never
/// interpolated from request input
fn photo_column(side: Side) -> &'static str {
    match side {
        Side::Front => "front_photo_url",
        Side::Back => "back_photo_url",
        Side::Selfie => "selfie_url",
    }
}

#[derive(Clone)]
pub struct MySqlRecordStore {
    pool: MySqlPool,
}

impl MySqlRecordStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: &str) -> Result<Option<VerificationRecord>> {
        let query = format!(
            "SELECT {} FROM identity_verifications WHERE id = ?",
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, RecordRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(VerificationRecord::try_from).transpose()
    }
}

#[async_trait]
impl RecordStore for MySqlRecordStore {
    async fn insert(&self, record: NewVerification) -> Result<VerificationRecord> {
        sqlx::query(
            r#"
            INSERT INTO identity_verifications (
                id, created_at, front_photo_url, back_photo_url, selfie_url, status, notes
            ) VALUES (?, ?, ?, ?, ?, 'pending', NULL)
            "#,
        )
        .bind(&record.id)
        .bind(record.created_at)
        .bind(&record.front_photo_url)
        .bind(&record.back_photo_url)
        .bind(&record.selfie_url)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Record(format!("insert failed: {}", e)))?;

        self.fetch(&record.id)
            .await?
            .ok_or_else(|| Error::Record("record not found after insert".to_string()))
    }

    async fn get(&self, id: &str) -> Result<Option<VerificationRecord>> {
        self.fetch(id).await
    }

    async fn list_newest_first(&self) -> Result<Vec<VerificationRecord>> {
        let query = format!(
            "SELECT {} FROM identity_verifications ORDER BY created_at DESC",
            RECORD_COLUMNS
        );
        let rows = sqlx::query_as::<_, RecordRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Fetch(format!("record list failed: {}", e)))?;

        rows.into_iter()
            .map(VerificationRecord::try_from)
            .collect()
    }

    async fn update_status(
        &self,
        id: &str,
        status: VerificationStatus,
        notes: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE identity_verifications SET status = ?, notes = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(status.as_str())
        .bind(notes)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Update(format!("status update failed: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_photo_url(&self, id: &str, side: Side, url: &str) -> Result<()> {
        let query = format!(
            "UPDATE identity_verifications SET {} = ? WHERE id = ?",
            photo_column(side)
        );
        let result = sqlx::query(&query)
            .bind(url)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Update(format!("photo url update failed: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("verification {} not found", id)));
        }
        Ok(())
    }
}
