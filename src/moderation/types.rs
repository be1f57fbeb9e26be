//! Moderation type definitions

use crate::capture_flow::Side;
use crate::verification::{VerificationRecord, VerificationStatus};
use serde::{Deserialize, Serialize};

/// Status filter for the record list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    pub fn matches(&self, status: VerificationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == VerificationStatus::Pending,
            StatusFilter::Approved => status == VerificationStatus::Approved,
            StatusFilter::Rejected => status == VerificationStatus::Rejected,
        }
    }
}

/// Terminal load state of one image probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageProbeState {
    /// URL resolved and returned the image
    Loaded,
    /// URL present but the fetch failed (broken image)
    Failed,
    /// No URL for this side (e.g. no selfie in a 2-shot flow)
    NotProvided,
}

/// One image panel in the review detail
#[derive(Debug, Clone, Serialize)]
pub struct ReviewImage {
    pub side: Side,
    pub url: Option<String>,
    pub state: ImageProbeState,
}

/// Review detail: the record plus independent per-image states
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDetail {
    pub record: VerificationRecord,
    pub images: Vec<ReviewImage>,
}

/// Approve/reject request body
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: VerificationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}
