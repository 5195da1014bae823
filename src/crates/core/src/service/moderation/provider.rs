use crate::util::errors::{CampusError, CampusResult};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::json;

/// Classification of one piece of user text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModerationResult {
    pub flagged: bool,
    /// Provider-specific refusal text; the gate falls back to its default.
    pub denial_message: Option<String>,
}

impl ModerationResult {
    pub fn allowed() -> Self {
        Self::default()
    }

    pub fn flagged(denial_message: Option<String>) -> Self {
        Self {
            flagged: true,
            denial_message,
        }
    }
}

#[async_trait]
pub trait ModerationProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> CampusResult<ModerationResult>;
}

/// Used when moderation is disabled in configuration.
pub struct NoopModeration;

#[async_trait]
impl ModerationProvider for NoopModeration {
    fn name(&self) -> &str {
        "noop"
    }

    async fn classify(&self, _text: &str) -> CampusResult<ModerationResult> {
        Ok(ModerationResult::allowed())
    }
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    #[serde(default)]
    results: Vec<ModerationResponseItem>,
}

#[derive(Debug, Deserialize)]
struct ModerationResponseItem {
    #[serde(default)]
    flagged: bool,
    #[serde(default)]
    categories: serde_json::Map<String, serde_json::Value>,
}

/// OpenAI `/moderations` endpoint.
pub struct OpenAiModeration {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiModeration {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ModerationProvider for OpenAiModeration {
    fn name(&self) -> &str {
        "openai"
    }

    async fn classify(&self, text: &str) -> CampusResult<ModerationResult> {
        let url = format!("{}/moderations", self.base_url.trim_end_matches('/'));
        let mut request = self.http.post(&url).json(&json!({
            "model": self.model,
            "input": text,
        }));
        if let Some(api_key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?.error_for_status()?;
        let body: ModerationResponse = response.json().await?;
        let item = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CampusError::provider("Moderation response contained no results"))?;

        if item.flagged {
            let categories: Vec<&str> = item
                .categories
                .iter()
                .filter(|(_, value)| value.as_bool().unwrap_or(false))
                .map(|(name, _)| name.as_str())
                .collect();
            debug!("Moderation flagged input: categories={:?}", categories);
            return Ok(ModerationResult::flagged(None));
        }

        Ok(ModerationResult::allowed())
    }
}
