//! Verification record type definitions

use crate::capture_flow::Side;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record status; one-way gate from pending to a terminal value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(VerificationStatus::Pending),
            "approved" => Ok(VerificationStatus::Approved),
            "rejected" => Ok(VerificationStatus::Rejected),
            other => Err(Error::Validation(format!("unknown status: {}", other))),
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One durable verification record (`identity_verifications` row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub front_photo_url: String,
    pub back_photo_url: String,
    pub selfie_url: Option<String>,
    pub status: VerificationStatus,
    pub notes: Option<String>,
}

impl VerificationRecord {
    /// Photo URL for a side; None when the side was not captured
    pub fn photo_url(&self, side: Side) -> Option<&str> {
        match side {
            Side::Front => Some(self.front_photo_url.as_str()),
            Side::Back => Some(self.back_photo_url.as_str()),
            Side::Selfie => self.selfie_url.as_deref(),
        }
    }
}

/// Insert payload for a freshly submitted capture set
#[derive(Debug, Clone)]
pub struct NewVerification {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub front_photo_url: String,
    pub back_photo_url: String,
    pub selfie_url: Option<String>,
}
