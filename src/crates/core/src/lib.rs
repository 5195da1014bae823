// Campus Assistant Core Library - chat turn pipeline, independent of the HTTP surface
// Four-layer architecture: Util -> Infrastructure -> Service -> Agentic

pub mod agentic; // Agentic layer - Tools, prompts, routing, streaming step loop
pub mod infrastructure; // Infrastructure layer - Model, vector index and web search providers
pub mod service; // Service layer - Config, moderation, chat pipeline
pub mod util; // Utility layer - Errors, text helpers

// Export main types
pub use util::errors::*;

// Export service layer components
pub use service::{
    chat::{ChatService, ChatServiceParts, ChatTurnStatus, ChatTurnSummary},
    config::{ChatConfig, ModerationFailurePolicy},
    moderation::{ModerationGate, ModerationProvider, ModerationResult},
};

// Export infrastructure components
pub use infrastructure::{
    ai::{ModelProvider, ModelRequest, ModelStream},
    search::{VectorIndex, WebSearchHit, WebSearchProvider, WebSearchRequest},
};

// Export Agentic layer core types
pub use agentic::{
    execution::{RunOutcome, StreamWriter, StreamingOrchestrator, TurnUsage},
    prompts::PromptComposer,
    routing::{ConversationMode, IntentRouter, TurnDirective},
    tools::{Tool, ToolOutcome, ToolRegistry},
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CORE_NAME: &str = "Campus Assistant Core";
