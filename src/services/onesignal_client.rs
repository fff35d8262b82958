use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::config::OneSignalConfig;
use crate::models::OneSignalPayload;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("OneSignal API error ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("OneSignal request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to decode OneSignal response: {0}")]
    Decode(String),
}

/// The notification id from a create acknowledgement.
///
/// An ack without a non-empty string `id` cannot be cancelled later, so it is
/// treated as an undecodable response.
pub fn notification_id(ack: &Value) -> Result<&str, ProviderError> {
    ack.get("id")
        .and_then(|v| v.as_str())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProviderError::Decode(format!("response has no notification id: {}", ack)))
}

/// Push provider seam; the dispatch and reminder services only see this.
#[async_trait]
pub trait PushProvider: Send + Sync {
    fn app_id(&self) -> &str;

    /// Submit a notification, immediate or with `send_after` set.
    async fn create_notification(&self, payload: &OneSignalPayload) -> Result<Value, ProviderError>;

    async fn cancel_notification(&self, notification_id: &str) -> Result<Value, ProviderError>;
}

/// OneSignal REST API v1 client
///
/// No retries: a non-2xx answer is handed back with its body untouched.
pub struct OneSignalClient {
    client: Client,
    app_id: String,
    rest_api_key: String,
    base_url: String,
}

impl OneSignalClient {
    pub fn new(config: &OneSignalConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            app_id: config.app_id.clone(),
            rest_api_key: config.rest_api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn notifications_url(&self) -> String {
        format!("{}/api/v1/notifications", self.base_url)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, ProviderError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("OneSignal API error: {} - {}", status, body);
            return Err(ProviderError::Rejected { status, body });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PushProvider for OneSignalClient {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    async fn create_notification(&self, payload: &OneSignalPayload) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(self.notifications_url())
            .header("Authorization", format!("Basic {}", self.rest_api_key))
            .json(payload)
            .send()
            .await?;

        let result = Self::read_json(response).await?;
        let id = result.get("id").and_then(|v| v.as_str()).unwrap_or("<no id>");
        info!("OneSignal accepted notification {}", id);
        Ok(result)
    }

    async fn cancel_notification(&self, notification_id: &str) -> Result<Value, ProviderError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.notifications_url(), notification_id))
            .query(&[("app_id", self.app_id.as_str())])
            .header("Authorization", format!("Basic {}", self.rest_api_key))
            .send()
            .await?;

        Self::read_json(response).await
    }
}
