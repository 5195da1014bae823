use crate::util::errors::CampusResult;
use async_trait::async_trait;
use campus_ai_adapters::{
    ChatCompletionRequest, ChatMessage, OpenAIClient, OpenAIClientConfig, ToolDefinition,
    UnifiedResponse,
};
use log::debug;
use std::time::Duration;
use tokio::sync::mpsc;

pub type ModelStream = mpsc::UnboundedReceiver<anyhow::Result<UnifiedResponse>>;

/// One model round trip.
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

/// Streaming language model behind the orchestrator.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn model_name(&self) -> &str;

    /// Start a streamed completion. Mid-stream failures arrive on the
    /// returned channel.
    async fn stream(&self, request: ModelRequest) -> CampusResult<ModelStream>;
}

#[derive(Debug, Clone)]
pub struct OpenAiModelSettings {
    pub model: String,
    pub reasoning_effort: Option<String>,
    pub parallel_tool_calls: bool,
}

pub struct OpenAiModelProvider {
    client: OpenAIClient,
    settings: OpenAiModelSettings,
}

impl OpenAiModelProvider {
    pub fn new(client: OpenAIClient, settings: OpenAiModelSettings) -> Self {
        Self { client, settings }
    }

    pub fn from_parts(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        idle_timeout: Duration,
        settings: OpenAiModelSettings,
    ) -> Self {
        let client = OpenAIClient::with_http_client(
            http,
            OpenAIClientConfig {
                base_url: base_url.into(),
                api_key,
                idle_timeout,
            },
        );
        Self::new(client, settings)
    }

    fn build_request(&self, request: ModelRequest) -> ChatCompletionRequest {
        ChatCompletionRequest::streaming(self.settings.model.clone(), request.messages)
            .with_tools(request.tools, self.settings.parallel_tool_calls)
            .with_reasoning_effort(self.settings.reasoning_effort.clone())
    }
}

#[async_trait]
impl ModelProvider for OpenAiModelProvider {
    fn model_name(&self) -> &str {
        &self.settings.model
    }

    async fn stream(&self, request: ModelRequest) -> CampusResult<ModelStream> {
        let request = self.build_request(request);
        debug!(
            "Streaming model request: model={}, messages={}",
            request.model,
            request.messages.len()
        );
        Ok(self.client.stream_chat(&request).await?)
    }
}
