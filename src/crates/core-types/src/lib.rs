//! Campus Assistant shared DTOs
//!
//! Types that cross the HTTP boundary: the inbound UI message history and the
//! outbound UI message stream events. Kept free of runtime dependencies so the
//! server, the core library and tests can all share them.

pub mod events;
pub mod message;

pub use events::{FinishReason, UIStreamEvent};
pub use message::{latest_user_text, ChatRequest, UIMessage, UIMessagePart, UIRole};

/// Header advertised on streamed chat responses so AI SDK clients parse the body
/// as a UI message stream.
pub const UI_MESSAGE_STREAM_HEADER: &str = "x-vercel-ai-ui-message-stream";
pub const UI_MESSAGE_STREAM_VERSION: &str = "v1";
