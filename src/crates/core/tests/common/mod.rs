#![allow(dead_code)]

use async_trait::async_trait;
use campus_ai_adapters::{UnifiedResponse, UnifiedTokenUsage, UnifiedToolCall};
use campus_core::infrastructure::ai::{ModelProvider, ModelRequest, ModelStream};
use campus_core::infrastructure::search::{
    VectorIndex, WebSearchHit, WebSearchProvider, WebSearchRequest,
};
use campus_core::service::moderation::{ModerationProvider, ModerationResult};
use campus_core::{CampusError, CampusResult, ChatConfig, ChatService, ChatServiceParts};
use campus_core_types::{ChatRequest, UIMessage, UIStreamEvent};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// One scripted model response.
#[derive(Debug, Clone, Default)]
pub struct ScriptStep {
    pub events: Vec<UnifiedResponse>,
    pub stream_error: Option<String>,
    /// Keep the stream open forever after `events`.
    pub hang: bool,
}

impl ScriptStep {
    pub fn text(text: &str) -> Self {
        Self {
            events: vec![
                UnifiedResponse {
                    text: Some(text.to_string()),
                    ..Default::default()
                },
                UnifiedResponse {
                    finish_reason: Some("stop".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    pub fn tool_call(id: &str, name: &str, arguments: &str) -> Self {
        Self {
            events: vec![
                UnifiedResponse {
                    tool_call: Some(UnifiedToolCall {
                        index: 0,
                        id: Some(id.to_string()),
                        name: Some(name.to_string()),
                        arguments: Some(arguments.to_string()),
                    }),
                    ..Default::default()
                },
                UnifiedResponse {
                    finish_reason: Some("tool_calls".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            stream_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    pub fn with_reasoning(mut self, reasoning: &str) -> Self {
        self.events.insert(
            0,
            UnifiedResponse {
                reasoning_content: Some(reasoning.to_string()),
                ..Default::default()
            },
        );
        self
    }

    /// Trailing usage-only chunk, as providers send after `finish_reason`.
    pub fn with_usage(mut self, prompt_tokens: u32, completion_tokens: u32) -> Self {
        self.events.push(UnifiedResponse {
            usage: Some(UnifiedTokenUsage {
                prompt_token_count: prompt_tokens,
                candidates_token_count: completion_tokens,
                total_token_count: prompt_tokens + completion_tokens,
                cached_content_token_count: None,
            }),
            ..Default::default()
        });
        self
    }
}

/// Model that replays scripted steps and records every request.
pub struct ScriptedModel {
    steps: Mutex<VecDeque<ScriptStep>>,
    fallback: ScriptStep,
    requests: Mutex<Vec<ModelRequest>>,
    held: Mutex<Vec<mpsc::UnboundedSender<anyhow::Result<UnifiedResponse>>>>,
}

impl ScriptedModel {
    pub fn new(steps: Vec<ScriptStep>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            fallback: ScriptStep::text("Done."),
            requests: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
        })
    }

    /// Returns `step` for every call.
    pub fn repeating(step: ScriptStep) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(VecDeque::new()),
            fallback: step,
            requests: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("lock").len()
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn stream(&self, request: ModelRequest) -> CampusResult<ModelStream> {
        self.requests.lock().expect("lock").push(request);
        let step = self
            .steps
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        let (tx, rx) = mpsc::unbounded_channel();
        for event in step.events {
            let _ = tx.send(Ok(event));
        }
        if let Some(message) = step.stream_error {
            let _ = tx.send(Err(anyhow::anyhow!(message)));
        }
        if step.hang {
            self.held.lock().expect("lock").push(tx);
        }
        Ok(rx)
    }
}

pub enum ModerationBehavior {
    Allow,
    Flag(Option<String>),
    Fail,
    /// Never answers.
    Hang,
}

pub struct FakeModeration {
    behavior: ModerationBehavior,
    calls: AtomicUsize,
}

impl FakeModeration {
    pub fn new(behavior: ModerationBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModerationProvider for FakeModeration {
    fn name(&self) -> &str {
        "fake"
    }

    async fn classify(&self, _text: &str) -> CampusResult<ModerationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            ModerationBehavior::Allow => Ok(ModerationResult::allowed()),
            ModerationBehavior::Flag(message) => Ok(ModerationResult::flagged(message.clone())),
            ModerationBehavior::Fail => Err(CampusError::provider("moderation unavailable")),
            ModerationBehavior::Hang => std::future::pending().await,
        }
    }
}

/// Vector index returning a fixed payload, or failing when `None`.
pub struct FakeIndex {
    payload: Option<Value>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeIndex {
    pub fn returning(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            payload: Some(payload),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            payload: None,
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn search(&self, query: &str) -> CampusResult<Value> {
        self.queries.lock().expect("lock").push(query.to_string());
        self.payload
            .clone()
            .ok_or_else(|| CampusError::provider("index offline"))
    }
}

pub struct FakeWebSearch {
    hits: Vec<WebSearchHit>,
}

impl FakeWebSearch {
    pub fn returning(hits: Vec<WebSearchHit>) -> Arc<Self> {
        Arc::new(Self { hits })
    }
}

#[async_trait]
impl WebSearchProvider for FakeWebSearch {
    async fn search(&self, _request: &WebSearchRequest) -> CampusResult<Vec<WebSearchHit>> {
        Ok(self.hits.clone())
    }
}

pub struct Harness {
    pub service: ChatService,
    pub model: Arc<ScriptedModel>,
    pub moderation: Arc<FakeModeration>,
    pub index: Arc<FakeIndex>,
}

pub fn harness(
    config: &ChatConfig,
    moderation: ModerationBehavior,
    model: Arc<ScriptedModel>,
    index: Arc<FakeIndex>,
) -> Harness {
    let moderation = FakeModeration::new(moderation);
    let service = ChatService::new(
        config,
        ChatServiceParts {
            moderation: moderation.clone(),
            model: model.clone(),
            vector_index: index.clone(),
            web_search: FakeWebSearch::returning(Vec::new()),
        },
    );
    Harness {
        service,
        model,
        moderation,
        index,
    }
}

pub fn user_request(text: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![UIMessage::user("u1", text)],
    }
}

pub async fn collect(mut rx: mpsc::Receiver<UIStreamEvent>) -> Vec<UIStreamEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

/// Checks per-block start/delta/end ordering and a single trailing finish.
pub fn assert_well_formed(events: &[UIStreamEvent]) {
    use std::collections::HashMap;

    assert!(
        matches!(events.first(), Some(UIStreamEvent::Start { .. })),
        "stream must begin with start: {:?}",
        events
    );
    assert_eq!(events.iter().filter(|e| e.is_finish()).count(), 1);
    assert!(events.last().is_some_and(UIStreamEvent::is_finish));

    // 0 = not started, 1 = open, 2 = ended
    let mut blocks: HashMap<String, u8> = HashMap::new();
    for event in events {
        let Some(id) = event.content_id() else {
            continue;
        };
        let state = blocks.entry(id.to_string()).or_insert(0);
        match event {
            UIStreamEvent::TextStart { .. } | UIStreamEvent::ReasoningStart { .. } => {
                assert_eq!(*state, 0, "block {} started twice", id);
                *state = 1;
            }
            UIStreamEvent::TextDelta { .. } | UIStreamEvent::ReasoningDelta { .. } => {
                assert_eq!(*state, 1, "delta outside open block {}", id);
            }
            _ => {
                assert_eq!(*state, 1, "block {} ended while not open", id);
                *state = 2;
            }
        }
    }
    assert!(blocks.values().all(|state| *state == 2), "unclosed block");
}
