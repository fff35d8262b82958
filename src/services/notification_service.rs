use std::sync::Arc;

use crate::errors::{AppError, DISPATCH_UPSTREAM_MESSAGE};
use crate::models::{DispatchResponse, NotificationIntent, OneSignalPayload, SendNotificationRequest};
use crate::services::PushProvider;

/// Validates dispatch requests and forwards them to the push provider.
#[derive(Clone)]
pub struct NotificationService {
    provider: Arc<dyn PushProvider>,
}

impl NotificationService {
    pub fn new(provider: Arc<dyn PushProvider>) -> Self {
        Self { provider }
    }

    /// Build the provider payload without sending it.
    pub fn build_payload(&self, request: SendNotificationRequest) -> Result<OneSignalPayload, AppError> {
        let intent = NotificationIntent::try_from(request)?;
        Ok(OneSignalPayload::for_intent(self.provider.app_id(), &intent))
    }

    /// One provider call per request; nothing is retried or stored locally.
    pub async fn send(&self, request: SendNotificationRequest) -> Result<DispatchResponse, AppError> {
        let payload = self.build_payload(request)?;

        let result = self
            .provider
            .create_notification(&payload)
            .await
            .map_err(|e| AppError::upstream(DISPATCH_UPSTREAM_MESSAGE, e))?;

        tracing::info!("Notification sent successfully: {}", result);

        Ok(DispatchResponse::sent(result))
    }
}
