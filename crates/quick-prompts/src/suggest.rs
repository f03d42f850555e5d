//! Category suggestions from an OpenAI-compatible chat completion API
//!
//! The model is asked for a JSON object; replies are accepted in any of the
//! shapes models tend to produce:
//! - `{"suggestions": [...]}`
//! - `{"prompts": [...]}`
//! - a bare array

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::constants::suggest;
use crate::store::{Prompt, UserSettings};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that categorizes prompts. \
Analyze the provided prompts and suggest a suitable category for each one. \
Return a JSON object of the form {\"prompts\": [{\"promptId\": \"id_from_input\", \
\"category\": \"your_suggested_category\"}]}. Your response MUST be valid JSON.";

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("No API key provided")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {message}")]
    Api {
        message: String,
        kind: Option<String>,
        code: Option<String>,
    },

    #[error("No content returned from API")]
    EmptyResponse,

    #[error("Failed to parse API response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("API returned unexpected JSON structure")]
    UnexpectedShape,
}

/// Suggested category for one prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySuggestion {
    pub prompt_id: String,
    pub category: String,
}

#[async_trait]
pub trait CategorySuggester: Send + Sync {
    async fn suggest_categories(
        &self,
        prompts: &[Prompt],
    ) -> Result<Vec<CategorySuggestion>, SuggestError>;
}

pub struct OpenAiCategorySuggester {
    http_client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiCategorySuggester {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: api_key.into(),
            api_url: suggest::API_URL.to_string(),
            model: suggest::DEFAULT_MODEL.to_string(),
        }
    }

    /// Build from stored settings; fails when no API key is configured
    pub fn from_settings(settings: &UserSettings) -> Result<Self, SuggestError> {
        let api_key = settings
            .openai_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SuggestError::MissingApiKey)?;
        let mut suggester = Self::new(api_key);
        if let Some(model) = settings.selected_model_id.as_deref().filter(|m| !m.is_empty()) {
            suggester.model = model.to_string();
        }
        Ok(suggester)
    }

    /// Point at another OpenAI-compatible endpoint
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Chat completion request body for `prompts`
    pub fn build_request(&self, prompts: &[Prompt]) -> Value {
        let listing: Vec<Value> = prompts
            .iter()
            .map(|p| json!({ "id": p.id, "text": p.text }))
            .collect();
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Value::Array(listing).to_string() },
            ],
            "response_format": { "type": "json_object" },
            "temperature": suggest::TEMPERATURE,
            "max_tokens": suggest::MAX_TOKENS,
        })
    }
}

#[async_trait]
impl CategorySuggester for OpenAiCategorySuggester {
    async fn suggest_categories(
        &self,
        prompts: &[Prompt],
    ) -> Result<Vec<CategorySuggestion>, SuggestError> {
        if self.api_key.trim().is_empty() {
            return Err(SuggestError::MissingApiKey);
        }

        log::debug!(
            "Requesting categories for {} prompts from {}",
            prompts.len(),
            self.model
        );

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(prompts))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(api_error(status, &body));
        }

        let body: Value = response.json().await?;
        let content = body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .ok_or(SuggestError::EmptyResponse)?;

        parse_suggestions(content)
    }
}

fn api_error(status: reqwest::StatusCode, body: &Value) -> SuggestError {
    let error = body.get("error");
    let field = |name: &str| {
        error
            .and_then(|e| e.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    SuggestError::Api {
        message: field("message").unwrap_or_else(|| format!("Request failed ({})", status)),
        kind: field("type"),
        code: field("code"),
    }
}

/// Parse the model's message content into suggestions
pub fn parse_suggestions(content: &str) -> Result<Vec<CategorySuggestion>, SuggestError> {
    let value: Value = serde_json::from_str(content)?;
    let items = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map
            .remove("suggestions")
            .filter(Value::is_array)
            .or_else(|| map.remove("prompts").filter(Value::is_array))
            .ok_or(SuggestError::UnexpectedShape)?,
        _ => {
            log::warn!("Unexpected suggestion payload: {}", content);
            return Err(SuggestError::UnexpectedShape);
        }
    };
    Ok(serde_json::from_value(items)?)
}
