use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_ONESIGNAL_BASE_URL: &str = "https://onesignal.com";

/// OneSignal credentials and client settings
#[derive(Debug, Clone)]
pub struct OneSignalConfig {
    pub app_id: String,
    pub rest_api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OneSignalConfig {
    pub fn new(app_id: impl Into<String>, rest_api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            rest_api_key: rest_api_key.into(),
            base_url: DEFAULT_ONESIGNAL_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn from_env() -> Result<Self> {
        let app_id = env::var("ONESIGNAL_APP_ID")
            .map_err(|_| anyhow!("ONESIGNAL_APP_ID must be set"))?;
        // The reminder functions historically read ONESIGNAL_API_KEY
        let rest_api_key = env::var("ONESIGNAL_REST_API_KEY")
            .or_else(|_| env::var("ONESIGNAL_API_KEY"))
            .map_err(|_| anyhow!("ONESIGNAL_REST_API_KEY must be set"))?;
        let base_url = env::var("ONESIGNAL_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_ONESIGNAL_BASE_URL.to_string());
        let timeout_secs = env::var("ONESIGNAL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(Self {
            app_id,
            rest_api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
