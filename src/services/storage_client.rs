use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::SupabaseConfig;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage API error ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("Storage request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to decode storage response: {0}")]
    Decode(String),
}

/// Object storage seam used by data export, account deletion and program ingest.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Write `body` at `path`, replacing any existing object.
    async fn upload(&self, bucket: &str, path: &str, content_type: &str, body: Vec<u8>) -> Result<(), StorageError>;

    /// An absolute download URL valid for `expires_in_secs`.
    async fn create_signed_url(&self, bucket: &str, path: &str, expires_in_secs: u64) -> Result<String, StorageError>;

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Object names directly under `prefix`.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StorageError>;

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), StorageError>;
}

#[derive(Deserialize)]
struct SignedUrl {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[derive(Deserialize)]
struct ListedObject {
    name: String,
}

/// Supabase Storage REST client authenticated with the service role key.
pub struct SupabaseStorageClient {
    client: Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseStorageClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StorageError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: format!("{}/storage/v1", config.url.trim_end_matches('/')),
            service_role_key: config.service_role_key.clone(),
        })
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, bucket, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.service_role_key)
            .header("apikey", &self.service_role_key)
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, StorageError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        error!("Storage API error: {} - {}", status, body);
        Err(StorageError::Rejected { status, body })
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorageClient {
    async fn upload(&self, bucket: &str, path: &str, content_type: &str, body: Vec<u8>) -> Result<(), StorageError> {
        let request = self
            .authorized(self.client.post(self.object_url(bucket, path)))
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body);

        Self::send(request).await?;
        debug!("Uploaded {}/{}", bucket, path);
        Ok(())
    }

    async fn create_signed_url(&self, bucket: &str, path: &str, expires_in_secs: u64) -> Result<String, StorageError> {
        let url = format!("{}/object/sign/{}/{}", self.base_url, bucket, path.trim_start_matches('/'));
        let request = self
            .authorized(self.client.post(url))
            .json(&json!({ "expiresIn": expires_in_secs }));

        let signed: SignedUrl = Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))?;

        // The API answers with a path relative to the storage root
        if signed.signed_url.starts_with("http") {
            Ok(signed.signed_url)
        } else {
            Ok(format!("{}/{}", self.base_url, signed.signed_url.trim_start_matches('/')))
        }
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, StorageError> {
        let request = self.authorized(self.client.get(self.object_url(bucket, path)));
        let bytes = Self::send(request).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StorageError> {
        let url = format!("{}/object/list/{}", self.base_url, bucket);
        let request = self
            .authorized(self.client.post(url))
            .json(&json!({ "prefix": prefix, "limit": 1000, "offset": 0 }));

        let objects: Vec<ListedObject> = Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))?;

        Ok(objects.into_iter().map(|o| o.name).collect())
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), StorageError> {
        if paths.is_empty() {
            return Ok(());
        }

        let url = format!("{}/object/{}", self.base_url, bucket);
        let request = self
            .authorized(self.client.delete(url))
            .json(&json!({ "prefixes": paths }));

        Self::send(request).await?;
        debug!("Removed {} objects from {}", paths.len(), bucket);
        Ok(())
    }
}
