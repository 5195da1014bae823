//! Chat turn pipeline
//!
//! moderation gate -> intent router -> prompt composer -> streaming
//! orchestrator, all writing into one [`StreamWriter`].

use crate::agentic::execution::{StreamWriter, StreamingOrchestrator, TurnUsage};
use crate::agentic::prompts::PromptComposer;
use crate::agentic::routing::{ConversationMode, IntentRouter};
use crate::agentic::tools::implementations::{
    KnowledgeBaseSearchTool, WebSearchSettings, WebSearchTool,
};
use crate::agentic::tools::ToolRegistry;
use crate::infrastructure::ai::{ModelProvider, OpenAiModelProvider, OpenAiModelSettings};
use crate::infrastructure::search::{ExaSearch, HttpVectorIndex, VectorIndex, WebSearchProvider};
use crate::service::config::ChatConfig;
use crate::service::moderation::{
    GateDecision, ModerationGate, ModerationProvider, NoopModeration, OpenAiModeration,
};
use crate::util::errors::{CampusError, CampusResult};
use campus_core_types::{latest_user_text, ChatRequest, FinishReason, UIStreamEvent};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const GENERIC_ERROR_TEXT: &str = "An error occurred while generating the response.";

/// External collaborators of a chat turn.
pub struct ChatServiceParts {
    pub moderation: Arc<dyn ModerationProvider>,
    pub model: Arc<dyn ModelProvider>,
    pub vector_index: Arc<dyn VectorIndex>,
    pub web_search: Arc<dyn WebSearchProvider>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTurnStatus {
    Denied,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTurnSummary {
    pub status: ChatTurnStatus,
    pub mode: Option<ConversationMode>,
    pub steps: u32,
    pub tool_calls: u32,
    pub usage: TurnUsage,
}

impl ChatTurnSummary {
    fn new(status: ChatTurnStatus, mode: Option<ConversationMode>) -> Self {
        Self {
            status,
            mode,
            steps: 0,
            tool_calls: 0,
            usage: TurnUsage::default(),
        }
    }
}

pub struct ChatService {
    gate: ModerationGate,
    router: IntentRouter,
    composer: PromptComposer,
    orchestrator: StreamingOrchestrator,
    max_duration: Duration,
}

impl ChatService {
    pub fn new(config: &ChatConfig, parts: ChatServiceParts) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(KnowledgeBaseSearchTool::new(parts.vector_index)));
        tools.register(Arc::new(WebSearchTool::new(
            parts.web_search,
            WebSearchSettings {
                num_results: config.web_search.num_results,
                snippet_chars: config.web_search.snippet_chars,
                include_domains: config.web_search.include_domains.clone(),
            },
        )));

        Self {
            gate: ModerationGate::new(parts.moderation, config.moderation.failure_policy),
            router: IntentRouter::from_config(&config.chat),
            composer: PromptComposer::from_config(&config.assistant),
            orchestrator: StreamingOrchestrator::new(parts.model, tools),
            max_duration: Duration::from_secs(config.chat.max_duration_secs),
        }
    }

    /// Wire the HTTP-backed providers described by `config`.
    ///
    /// No single provider exchange may outlive the turn ceiling.
    pub fn from_config(config: &ChatConfig) -> CampusResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.chat.max_duration_secs))
            .build()?;

        if config.model.api_key.is_none() {
            warn!("No model API key configured; requests to the model provider may be rejected");
        }

        let moderation: Arc<dyn ModerationProvider> = if config.moderation.enabled {
            Arc::new(OpenAiModeration::new(
                http.clone(),
                config.moderation.base_url.clone(),
                config.moderation.api_key.clone(),
                config.moderation.model.clone(),
            ))
        } else {
            info!("Moderation disabled by configuration");
            Arc::new(NoopModeration)
        };

        let model = Arc::new(OpenAiModelProvider::from_parts(
            http.clone(),
            config.model.base_url.clone(),
            config.model.api_key.clone(),
            Duration::from_secs(config.model.idle_timeout_secs),
            OpenAiModelSettings {
                model: config.model.model.clone(),
                reasoning_effort: config.model.reasoning_effort.clone(),
                parallel_tool_calls: config.model.parallel_tool_calls,
            },
        ));

        let vector_index = Arc::new(HttpVectorIndex::new(
            http.clone(),
            config.knowledge_base.endpoint.clone(),
            config.knowledge_base.api_key.clone(),
            config.knowledge_base.top_k,
        ));

        let web_search = Arc::new(ExaSearch::new(
            http,
            config.web_search.base_url.clone(),
            config.web_search.api_key.clone(),
        ));

        Ok(Self::new(
            config,
            ChatServiceParts {
                moderation,
                model,
                vector_index,
                web_search,
            },
        ))
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.orchestrator.tools().names()
    }

    /// Run one chat turn, streaming events into `tx`.
    ///
    /// Every path ends with exactly one `finish` event unless the receiver is
    /// already gone. One deadline of `max_duration` covers moderation and the
    /// model run together.
    pub async fn handle(
        &self,
        request: ChatRequest,
        tx: mpsc::Sender<UIStreamEvent>,
        cancel: CancellationToken,
    ) -> ChatTurnSummary {
        let deadline = Instant::now() + self.max_duration;
        let mut writer = StreamWriter::new(tx);
        let latest = latest_user_text(&request.messages);

        let decision = self.gate.check(latest.as_deref(), deadline).await;
        if let GateDecision::Deny { message } = decision {
            writer.write_denial(&message).await;
            return ChatTurnSummary::new(ChatTurnStatus::Denied, None);
        }

        let directive = self.router.route(latest.as_deref());
        let messages = self.composer.compose(&directive, &request.messages);
        info!(
            "Chat turn started: mode={:?}, step_budget={}, history={}",
            directive.mode,
            directive.step_budget,
            request.messages.len()
        );

        writer
            .start(Some(format!("msg_{}", uuid::Uuid::new_v4().simple())))
            .await;

        let run = tokio::time::timeout_at(
            deadline,
            self.orchestrator
                .run(messages, directive.step_budget, &mut writer, &cancel),
        )
        .await;

        let mut summary = ChatTurnSummary::new(ChatTurnStatus::Completed, Some(directive.mode));
        match run {
            Ok(Ok(outcome)) => {
                summary.steps = outcome.steps;
                summary.tool_calls = outcome.tool_calls;
                summary.usage = outcome.usage;
                info!(
                    "Chat turn finished: steps={}, tool_calls={}, finish_reason={:?}, prompt_tokens={}, completion_tokens={}, total_tokens={}",
                    outcome.steps,
                    outcome.tool_calls,
                    outcome.finish_reason,
                    outcome.usage.prompt_tokens,
                    outcome.usage.completion_tokens,
                    outcome.usage.total_tokens
                );
                writer.finish(Some(outcome.finish_reason)).await;
            }
            Ok(Err(CampusError::Cancelled)) => {
                info!("Chat turn cancelled");
                summary.status = ChatTurnStatus::Cancelled;
                writer.abort(Some("cancelled".to_string())).await;
                writer.finish(None).await;
            }
            Ok(Err(e)) => {
                error!("Chat turn failed: error={}", e);
                summary.status = ChatTurnStatus::Failed;
                writer.error(GENERIC_ERROR_TEXT).await;
                writer.finish(Some(FinishReason::Error)).await;
            }
            Err(_) => {
                let secs = self.max_duration.as_secs();
                warn!("Chat turn timed out: max_duration_secs={}", secs);
                summary.status = ChatTurnStatus::TimedOut;
                writer.error(CampusError::Timeout(secs).to_string()).await;
                writer.finish(Some(FinishReason::Error)).await;
            }
        }
        summary
    }
}
