use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::config::OpenAiConfig;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("OPENAI_API_KEY not configured")]
    NotConfigured,
    #[error("OpenAI API error ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("OpenAI request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("No content returned from OpenAI")]
    EmptyReply,
    #[error("Failed to parse OpenAI response as JSON: {0}")]
    InvalidJson(String),
}

/// Turns free-form program text into the structured program document.
#[async_trait]
pub trait ProgramParser: Send + Sync {
    /// Recorded next to each result as `model_hint`.
    fn model(&self) -> &str;

    async fn parse(&self, text: &str) -> Result<Value, ParserError>;
}

const SYSTEM_PROMPT: &str = r#"You are a fitness program parser. Parse the following text and extract structured information about:
- Notes (general notes about the program)
- Supplements (name, dosage, timing, notes)
- Nutrition plan (calories, meals with items, macros)
- Workout plan (days with exercises, sets, reps, tempo, rest)

Return a JSON object with this exact structure:
{
  "notes": "string or null",
  "supplements": [{"name":"string","dosage":"string or null","timing":"string or null","notes":"string or null"}],
  "nutrition_plan": {
    "calories_target": "number or null",
    "meals": [{"name":"string or null","time":"string or null","items":[{"food":"string","qty":"string or null","units":"string or null","kcal":"number or null","macros":{"p":"number or null","c":"number or null","f":"number or null"}}]}]
  },
  "workout_plan": {
    "days": [{"day":"string","exercises":[{"name":"string","sets":"number or null","reps":"string or number or null","tempo":"string or null","rest":"string or null","notes":"string or null"}]}]
  }
}"#;

/// Chat Completions client. One request per parse, no retries.
pub struct OpenAiProgramParser {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiProgramParser {
    pub fn new(config: &OpenAiConfig) -> Result<Self, ParserError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ProgramParser for OpenAiProgramParser {
    fn model(&self) -> &str {
        &self.model
    }

    async fn parse(&self, text: &str) -> Result<Value, ParserError> {
        let api_key = self.api_key.as_deref().ok_or(ParserError::NotConfigured)?;

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": text },
                ],
                "temperature": 0.1,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("OpenAI API error: {} - {}", status, body);
            return Err(ParserError::Rejected { status, body });
        }

        let reply: Value = serde_json::from_str(&body).map_err(|e| ParserError::InvalidJson(e.to_string()))?;
        let content = reply
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .filter(|content| !content.trim().is_empty())
            .ok_or(ParserError::EmptyReply)?;

        let parsed = serde_json::from_str(content).map_err(|e| ParserError::InvalidJson(e.to_string()))?;
        info!("Parsed program text ({} chars) with {}", text.len(), self.model);
        Ok(parsed)
    }
}
