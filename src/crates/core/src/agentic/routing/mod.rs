//! Intent routing
//!
//! Picks the instruction set and step budget for a turn from the latest user
//! message. Detection is a plain case-insensitive substring match on the
//! trigger keyword, so "compared to last year" also selects comparison mode.

use crate::service::config::{ChatLimitsConfig, MIN_COMPARISON_STEP_BUDGET};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationMode {
    Standard,
    Comparison,
}

/// Per-turn routing decision handed to the composer and orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnDirective {
    pub mode: ConversationMode,
    pub step_budget: u32,
}

impl TurnDirective {
    pub fn is_comparison(&self) -> bool {
        self.mode == ConversationMode::Comparison
    }
}

#[derive(Debug, Clone)]
pub struct IntentRouter {
    trigger_keyword: String,
    standard_budget: u32,
    comparison_budget: u32,
}

impl IntentRouter {
    pub fn new(trigger_keyword: &str, standard_budget: u32, comparison_budget: u32) -> Self {
        Self {
            trigger_keyword: trigger_keyword.to_lowercase(),
            standard_budget: standard_budget.max(1),
            comparison_budget: comparison_budget.max(MIN_COMPARISON_STEP_BUDGET),
        }
    }

    pub fn from_config(config: &ChatLimitsConfig) -> Self {
        Self::new(
            &config.trigger_keyword,
            config.standard_step_budget,
            config.comparison_step_budget,
        )
    }

    pub fn route(&self, latest_user_text: Option<&str>) -> TurnDirective {
        let is_comparison = latest_user_text
            .map(|text| text.to_lowercase().contains(&self.trigger_keyword))
            .unwrap_or(false);

        let directive = if is_comparison {
            TurnDirective {
                mode: ConversationMode::Comparison,
                step_budget: self.comparison_budget,
            }
        } else {
            TurnDirective {
                mode: ConversationMode::Standard,
                step_budget: self.standard_budget,
            }
        };
        debug!(
            "Routed turn: mode={:?}, step_budget={}",
            directive.mode, directive.step_budget
        );
        directive
    }
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::from_config(&ChatLimitsConfig::default())
    }
}
