//! Veristation - ID document capture and review station
//!
//! ## Architecture
//!
//! 1. CameraSession - exclusive camera acquisition per facing
//! 2. CaptureFlow - ordered multi-shot capture driver
//! 3. ImageEncoder - raw frame to JPEG, selfie mirroring
//! 4. UploadPipeline - shot set to durable verification record
//! 5. Storage - object storage backends (Supabase REST, in-memory)
//! 6. Verification - record types and store backends (MySQL, in-memory)
//! 7. Moderation - reviewer list, detail, status gate, photo replacement
//! 8. WebAPI - REST API endpoints
//!
//! ## Design Principles
//!
//! - Capture and review share the record types, nothing else
//! - Every remote system sits behind a capability trait
//! - Single responsibility per module

pub mod camera_session;
pub mod capture_flow;
pub mod error;
pub mod image_encoder;
pub mod models;
pub mod moderation;
pub mod state;
pub mod storage;
pub mod upload_pipeline;
pub mod verification;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
