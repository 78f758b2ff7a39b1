//! `GeminiGenerator`: Google Gemini `generateContent` backend.
//!
//! One POST per topic, a single user turn, no history.  The API key travels
//! in the `x-goog-api-key` header so it never appears in the request URL.
//! All connection details come from [`GenerationConfig`]; nothing is
//! hardcoded here.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ApiKey, GenerationConfig};
use crate::poem::generator::{GenerationError, Poem, PoemGenerator};
use crate::poem::prompt::PromptBuilder;

/// Calls `{base_url}/{api_version}/models/{model}:generateContent`.
pub struct GeminiGenerator {
    client: reqwest::Client,
    config: GenerationConfig,
    api_key: ApiKey,
    prompt_builder: PromptBuilder,
}

impl GeminiGenerator {
    /// Build a generator from application config and the startup API key.
    ///
    /// When `config.timeout_secs` is `None` the HTTP client never times out,
    /// so a hung service hangs the request.
    pub fn from_config(config: &GenerationConfig, api_key: ApiKey) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            api_key,
            prompt_builder: PromptBuilder::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version,
            self.config.model
        )
    }
}

/// Pull the poem out of a `generateContent` response body.
///
/// Text lives at `candidates[0].content.parts[*].text`; multiple parts are
/// concatenated.  A response without candidates but with
/// `promptFeedback.blockReason` is reported as [`GenerationError::Blocked`].
pub fn parse_response(json: &Value) -> Result<Poem, GenerationError> {
    let candidate = match json["candidates"].as_array().and_then(|c| c.first()) {
        Some(candidate) => candidate,
        None => {
            return Err(match json["promptFeedback"]["blockReason"].as_str() {
                Some(reason) => GenerationError::Blocked(reason.to_string()),
                None => GenerationError::EmptyResponse,
            });
        }
    };

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect()
        })
        .unwrap_or_default();

    Poem::parse(&text).ok_or(GenerationError::EmptyResponse)
}

#[async_trait]
impl PoemGenerator for GeminiGenerator {
    async fn generate(&self, topic: &str) -> Result<Poem, GenerationError> {
        let prompt = self.prompt_builder.build(topic);

        let body = serde_json::json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        parse_response(&json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
