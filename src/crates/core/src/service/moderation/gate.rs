use super::provider::{ModerationProvider, ModerationResult};
use crate::service::config::ModerationFailurePolicy;
use crate::util::errors::CampusResult;
use log::{info, warn};
use std::sync::Arc;
use tokio::time::Instant;

pub const DEFAULT_DENIAL_MESSAGE: &str =
    "Your message violates our guidelines. I can't answer that.";

/// Content id used for the single text block of a denial stream.
pub const DENIAL_TEXT_ID: &str = "moderation-denial-text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny { message: String },
}

impl GateDecision {
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }
}

/// Screens the latest user utterance before any model or tool work happens.
pub struct ModerationGate {
    provider: Arc<dyn ModerationProvider>,
    failure_policy: ModerationFailurePolicy,
}

impl ModerationGate {
    pub fn new(provider: Arc<dyn ModerationProvider>, failure_policy: ModerationFailurePolicy) -> Self {
        Self {
            provider,
            failure_policy,
        }
    }

    /// Empty or absent text skips the provider entirely. A provider that has
    /// not answered by `deadline` counts as a failed check.
    pub async fn check(&self, text: Option<&str>, deadline: Instant) -> GateDecision {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return GateDecision::Allow;
        };
        match tokio::time::timeout_at(deadline, self.provider.classify(text)).await {
            Ok(verdict) => self.decide(verdict),
            Err(_) => self.on_failure("no verdict before the turn deadline"),
        }
    }

    fn decide(&self, verdict: CampusResult<ModerationResult>) -> GateDecision {
        match verdict {
            Ok(result) if result.flagged => {
                info!("Moderation denied request: provider={}", self.provider.name());
                let message = result
                    .denial_message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DEFAULT_DENIAL_MESSAGE.to_string());
                GateDecision::Deny { message }
            }
            Ok(_) => GateDecision::Allow,
            Err(e) => self.on_failure(&e.to_string()),
        }
    }

    fn on_failure(&self, error: &str) -> GateDecision {
        match self.failure_policy {
            ModerationFailurePolicy::Allow => {
                warn!(
                    "Moderation check failed, allowing request: provider={}, error={}",
                    self.provider.name(),
                    error
                );
                GateDecision::Allow
            }
            ModerationFailurePolicy::Deny => {
                warn!(
                    "Moderation check failed, denying request: provider={}, error={}",
                    self.provider.name(),
                    error
                );
                GateDecision::Deny {
                    message: DEFAULT_DENIAL_MESSAGE.to_string(),
                }
            }
        }
    }
}
