//! Streaming execution of a chat turn

pub mod orchestrator;
pub mod stream_writer;
pub mod tool_calls;

pub use orchestrator::{RunOutcome, StreamingOrchestrator, TurnUsage};
pub use stream_writer::StreamWriter;
pub use tool_calls::{AssembledToolCall, ToolCallAccumulator};
