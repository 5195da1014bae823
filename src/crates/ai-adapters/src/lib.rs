//! OpenAI-compatible chat completion adapter
//!
//! Builds streaming `chat/completions` requests, parses the SSE response into
//! provider-neutral [`UnifiedResponse`] events and hands them to the caller over
//! an mpsc channel.

pub mod client;
pub mod stream_handler;
pub mod types;

pub use client::{OpenAIClient, OpenAIClientConfig};
pub use stream_handler::handle_openai_stream;
pub use types::request::{
    ChatCompletionRequest, ChatMessage, ChatRole, ChatToolCall, FunctionDefinition,
    FunctionInvocation, StreamOptions, ToolDefinition,
};
pub use types::unified::{UnifiedResponse, UnifiedTokenUsage, UnifiedToolCall};
