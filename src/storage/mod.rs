//! Object storage - uploaded photo persistence
//!
//! ## Responsibilities
//!
//! - Capability contract for the object store (upload / public URL / list)
//! - Deterministic storage path construction
//! - Supabase REST backend and in-memory backend

mod memory;
mod supabase;

pub use memory::MemoryStorage;
pub use supabase::SupabaseStorage;

use crate::capture_flow::Side;
use crate::error::Result;
use async_trait::async_trait;

/// Object storage capability contract
///
/// Public URLs are treated as opaque strings; only the path layout is
/// owned by this crate.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload one object; overwrites an existing object at the same path
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Durable public URL for the object at `path`
    fn public_url(&self, path: &str) -> String;

    /// List object paths under a prefix (diagnostics only)
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Backend reachability probe
    async fn health_check(&self) -> bool {
        true
    }
}

/// Storage path for one photo: `{folder}/{unix_millis}_{side}.jpg`
///
/// The layout is bit-stable; existing records resolve their photos
/// through it, so it must never change shape.
pub fn object_path(folder: &str, timestamp_millis: i64, side: Side) -> String {
    format!("{}/{}_{}.jpg", folder, timestamp_millis, side)
}
