use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Body of a dispatch request as the mobile client sends it.
///
/// Every field is optional on the wire so that missing values surface as
/// `InvalidRequest` with a readable message instead of a deserializer error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[serde(rename = "type")]
    pub target_type: Option<String>,
    pub user_id: Option<String>,
    pub user_ids: Option<Vec<String>>,
    pub role: Option<String>,
    pub topic: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub route: Option<String>,
    pub screen: Option<String>,
    pub id: Option<String>,
    pub additional_data: Option<Map<String, Value>>,
}

/// Who receives a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelector {
    User(String),
    Users(Vec<String>),
    Role(String),
    Topic(String),
}

/// A validated dispatch request.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationIntent {
    pub target: TargetSelector,
    pub title: String,
    pub message: String,
    pub route: Option<String>,
    pub screen: Option<String>,
    pub id: Option<String>,
    pub additional_data: Map<String, Value>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<SendNotificationRequest> for NotificationIntent {
    type Error = AppError;

    fn try_from(request: SendNotificationRequest) -> Result<Self, Self::Error> {
        let (title, message) = match (present(request.title), present(request.message)) {
            (Some(title), Some(message)) => (title, message),
            _ => return Err(AppError::invalid("Title and message are required")),
        };

        let target = match request.target_type.as_deref() {
            Some("user") => TargetSelector::User(
                present(request.user_id)
                    .ok_or_else(|| AppError::invalid("User ID required for user notification"))?,
            ),
            Some("users") => match request.user_ids {
                Some(ids) if !ids.is_empty() => TargetSelector::Users(ids),
                _ => return Err(AppError::invalid("User IDs required for users notification")),
            },
            Some("role") => TargetSelector::Role(
                present(request.role)
                    .ok_or_else(|| AppError::invalid("Role required for role notification"))?,
            ),
            Some("topic") => TargetSelector::Topic(
                present(request.topic)
                    .ok_or_else(|| AppError::invalid("Topic required for topic notification"))?,
            ),
            _ => return Err(AppError::invalid("Invalid notification type")),
        };

        Ok(NotificationIntent {
            target,
            title,
            message,
            route: present(request.route),
            screen: present(request.screen),
            id: present(request.id),
            additional_data: request.additional_data.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
}

impl LocalizedText {
    pub fn en(text: impl Into<String>) -> Self {
        Self { en: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionButton {
    pub id: String,
    pub text: String,
}

/// Request body for OneSignal's create-notification endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneSignalPayload {
    pub app_id: String,
    pub headings: LocalizedText,
    pub contents: LocalizedText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_player_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_external_user_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_segments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<ActionButton>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios_sound: Option<String>,
}

impl OneSignalPayload {
    pub fn new(app_id: impl Into<String>, heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            headings: LocalizedText::en(heading),
            contents: LocalizedText::en(content),
            include_player_ids: None,
            include_external_user_ids: None,
            included_segments: None,
            data: None,
            url: None,
            send_after: None,
            buttons: None,
            android_channel_id: None,
            ios_sound: None,
        }
    }

    /// Build the provider payload for a dispatch intent.
    pub fn for_intent(app_id: &str, intent: &NotificationIntent) -> Self {
        let mut payload = Self::new(app_id, intent.title.clone(), intent.message.clone());

        let mut data = Map::new();
        if let Some(route) = &intent.route {
            data.insert("route".to_string(), Value::String(route.clone()));
        }
        if let Some(screen) = &intent.screen {
            data.insert("screen".to_string(), Value::String(screen.clone()));
        }
        if let Some(id) = &intent.id {
            data.insert("id".to_string(), Value::String(id.clone()));
        }
        for (key, value) in &intent.additional_data {
            data.insert(key.clone(), value.clone());
        }
        payload.data = Some(data);
        payload.url = intent.route.clone();

        match &intent.target {
            TargetSelector::User(user_id) => {
                payload.include_external_user_ids = Some(vec![user_id.clone()]);
            }
            TargetSelector::Users(user_ids) => {
                payload.include_external_user_ids = Some(user_ids.clone());
            }
            TargetSelector::Role(segment) | TargetSelector::Topic(segment) => {
                payload.included_segments = Some(vec![segment.clone()]);
            }
        }

        payload
    }
}

/// Success envelope of the dispatch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub success: bool,
    pub message: String,
    pub one_signal_result: Value,
}

impl DispatchResponse {
    pub fn sent(provider_result: Value) -> Self {
        Self {
            success: true,
            message: "Notification sent successfully".to_string(),
            one_signal_result: provider_result,
        }
    }
}
