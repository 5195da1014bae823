//! Service layer - configuration, moderation and the chat pipeline

pub mod chat;
pub mod config;
pub mod moderation;

pub use chat::{ChatService, ChatServiceParts, ChatTurnStatus, ChatTurnSummary};
pub use config::{ChatConfig, ModerationFailurePolicy};
pub use moderation::{GateDecision, ModerationGate, ModerationProvider, ModerationResult};
