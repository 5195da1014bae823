use crate::stream_handler::handle_openai_stream;
use crate::types::request::ChatCompletionRequest;
use crate::types::unified::UnifiedResponse;
use anyhow::{anyhow, Context, Result};
use log::{debug, error};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tokio::sync::mpsc;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct OpenAIClientConfig {
    /// e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub api_key: Option<String>,
    /// Maximum silence between two SSE events before the stream is failed.
    pub idle_timeout: Duration,
}

impl Default for OpenAIClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// Streaming client for OpenAI-compatible `chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    http: reqwest::Client,
    config: OpenAIClientConfig,
}

impl OpenAIClient {
    pub fn new(config: OpenAIClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_http_client(http, config))
    }

    pub fn with_http_client(http: reqwest::Client, config: OpenAIClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &OpenAIClientConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Send a streaming request and return the receiver of unified events.
    ///
    /// Non-2xx responses fail here with the response body in the error. Errors
    /// that happen mid-stream arrive as an `Err` item on the channel.
    pub async fn stream_chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<mpsc::UnboundedReceiver<Result<UnifiedResponse>>> {
        let url = self.endpoint();
        debug!(
            "Sending chat completion request: url={}, model={}, messages={}, tools={}",
            url,
            request.model,
            request.messages.len(),
            request.tools.len()
        );

        let mut builder = self
            .http
            .post(&url)
            .header(ACCEPT, "text/event-stream")
            .header(CONTENT_TYPE, "application/json")
            .json(request);
        if let Some(api_key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to reach model provider at {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Chat completion request rejected: status={}, body={}",
                status, body
            );
            return Err(anyhow!(
                "Model provider returned {}: {}",
                status,
                body.chars().take(500).collect::<String>()
            ));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let idle_timeout = self.config.idle_timeout;
        tokio::spawn(async move {
            handle_openai_stream(response, tx, idle_timeout).await;
        });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = OpenAIClient::new(OpenAIClientConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..Default::default()
        })
        .expect("client builds");
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
}
