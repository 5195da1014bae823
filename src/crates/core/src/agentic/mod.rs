//! Agentic layer - tools, prompts, routing and the streaming step loop

pub mod execution;
pub mod prompts;
pub mod routing;
pub mod tools;

pub use execution::{RunOutcome, StreamWriter, StreamingOrchestrator, TurnUsage};
pub use prompts::{PromptBundle, PromptComposer, PromptSegment};
pub use routing::{ConversationMode, IntentRouter, TurnDirective};
pub use tools::{Tool, ToolOutcome, ToolRegistry, ToolResult};
