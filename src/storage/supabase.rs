//! Supabase storage backend (REST API over reqwest)

use super::ObjectStorage;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Supabase storage bucket client
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    /// # Arguments
    /// * `base_url` - project URL (e.g. https://xyz.supabase.co)
    /// * `service_key` - service role key used as bearer token
    /// * `bucket` - bucket holding the photo objects
    pub fn new(base_url: String, service_key: String, bucket: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
        }
    }

    fn encoded_path(path: &str) -> String {
        path.split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    async fn probe_bucket(&self) -> Result<bool> {
        let url = format!("{}/storage/v1/bucket/{}", self.base_url, self.bucket);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .send()
            .await?;
        Ok(resp.status().is_success())
    }
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            Self::encoded_path(path)
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("content-type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("upload request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "upload of {} rejected: {} - {}",
                path, status, body
            )));
        }

        tracing::debug!(path = %path, bucket = %self.bucket, "Object uploaded");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            self.bucket,
            Self::encoded_path(path)
        )
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, self.bucket);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&json!({ "prefix": prefix, "limit": 1000 }))
            .send()
            .await
            .map_err(|e| Error::Storage(format!("list request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(Error::Storage(format!(
                "list of {} rejected: {}",
                prefix,
                resp.status()
            )));
        }

        let objects: Vec<ListedObject> = resp
            .json()
            .await
            .map_err(|e| Error::Storage(format!("list response parse failed: {}", e)))?;

        Ok(objects
            .into_iter()
            .map(|o| format!("{}/{}", prefix.trim_end_matches('/'), o.name))
            .collect())
    }

    async fn health_check(&self) -> bool {
        self.probe_bucket().await.unwrap_or(false)
    }
}
