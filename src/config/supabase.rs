use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_MEDIA_BUCKET: &str = "vagus-media";
pub const DEFAULT_INGEST_BUCKET: &str = "program_ingest";

/// Supabase project settings: storage access and the JWT secret that signs user sessions.
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
    pub jwt_secret: String,
    pub media_bucket: String,
    pub ingest_bucket: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_role_key", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("media_bucket", &self.media_bucket)
            .field("ingest_bucket", &self.ingest_bucket)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SupabaseConfig {
    pub fn new(
        url: impl Into<String>,
        service_role_key: impl Into<String>,
        jwt_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            service_role_key: service_role_key.into(),
            jwt_secret: jwt_secret.into(),
            media_bucket: DEFAULT_MEDIA_BUCKET.to_string(),
            ingest_bucket: DEFAULT_INGEST_BUCKET.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_env() -> Result<Self> {
        let url = env::var("SUPABASE_URL").map_err(|_| anyhow!("SUPABASE_URL must be set"))?;
        let service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .map_err(|_| anyhow!("SUPABASE_SERVICE_ROLE_KEY must be set"))?;
        let jwt_secret = env::var("SUPABASE_JWT_SECRET")
            .map_err(|_| anyhow!("SUPABASE_JWT_SECRET must be set"))?;
        let timeout_secs = env::var("SUPABASE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let mut config = Self::new(url, service_role_key, jwt_secret);
        config.media_bucket =
            env::var("SUPABASE_MEDIA_BUCKET").unwrap_or_else(|_| DEFAULT_MEDIA_BUCKET.to_string());
        config.ingest_bucket =
            env::var("SUPABASE_INGEST_BUCKET").unwrap_or_else(|_| DEFAULT_INGEST_BUCKET.to_string());
        config.timeout = Duration::from_secs(timeout_secs);
        Ok(config)
    }
}
