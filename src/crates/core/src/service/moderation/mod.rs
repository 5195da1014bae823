//! Moderation gate
//!
//! Classifies the latest user message and short-circuits the turn with a
//! canned denial when it is flagged.

pub mod gate;
pub mod provider;

pub use gate::{GateDecision, ModerationGate, DEFAULT_DENIAL_MESSAGE, DENIAL_TEXT_ID};
pub use provider::{ModerationProvider, ModerationResult, NoopModeration, OpenAiModeration};
