use super::segments;
use crate::agentic::routing::TurnDirective;
use crate::service::config::AssistantConfig;
use campus_ai_adapters::ChatMessage;
use campus_core_types::{UIMessage, UIRole};
use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSegment {
    Identity,
    ToolCalling,
    ToolOptions,
    BehaviorRules,
    FollowupYes,
    FollowupNo,
    OtherRules,
    ToneStyle,
    Guardrails,
    Citations,
    DateTime,
    Comparison,
}

impl PromptSegment {
    /// Segments every turn starts with, in order.
    pub const BASE_ORDER: [PromptSegment; 10] = [
        Self::Identity,
        Self::ToolCalling,
        Self::ToolOptions,
        Self::BehaviorRules,
        Self::FollowupYes,
        Self::FollowupNo,
        Self::OtherRules,
        Self::ToneStyle,
        Self::Guardrails,
        Self::Citations,
    ];
}

/// Ordered system instructions for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptBundle {
    entries: Vec<(PromptSegment, String)>,
}

impl PromptBundle {
    fn push(&mut self, segment: PromptSegment, text: String) {
        self.entries.push((segment, text));
    }

    pub fn segments(&self) -> Vec<PromptSegment> {
        self.entries.iter().map(|(segment, _)| *segment).collect()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, text)| text.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_system_messages(self) -> Vec<ChatMessage> {
        self.entries
            .into_iter()
            .map(|(_, text)| ChatMessage::system(text))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PromptComposer {
    assistant_name: String,
    owner_name: String,
    include_date_time: bool,
}

impl PromptComposer {
    pub fn new(
        assistant_name: impl Into<String>,
        owner_name: impl Into<String>,
        include_date_time: bool,
    ) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            owner_name: owner_name.into(),
            include_date_time,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.owner_name.clone(),
            config.include_date_time,
        )
    }

    pub fn bundle(&self, directive: &TurnDirective) -> PromptBundle {
        self.bundle_at(directive, Local::now())
    }

    pub fn bundle_at(&self, directive: &TurnDirective, now: DateTime<Local>) -> PromptBundle {
        let mut bundle = PromptBundle::default();
        let mut order = PromptSegment::BASE_ORDER.to_vec();
        if self.include_date_time {
            order.push(PromptSegment::DateTime);
        }
        // Last so it refines the general rules.
        if directive.is_comparison() {
            order.push(PromptSegment::Comparison);
        }
        for segment in order {
            bundle.push(segment, self.render(segment, now));
        }
        bundle
    }

    fn render(&self, segment: PromptSegment, now: DateTime<Local>) -> String {
        match segment {
            PromptSegment::Identity => segments::IDENTITY
                .replace("{assistant_name}", &self.assistant_name)
                .replace("{owner_name}", &self.owner_name),
            PromptSegment::ToolCalling => segments::TOOL_CALLING.to_string(),
            PromptSegment::ToolOptions => segments::TOOL_OPTIONS.to_string(),
            PromptSegment::BehaviorRules => segments::BEHAVIOR_RULES.to_string(),
            PromptSegment::FollowupYes => segments::FOLLOWUP_YES.to_string(),
            PromptSegment::FollowupNo => segments::FOLLOWUP_NO.to_string(),
            PromptSegment::OtherRules => segments::OTHER_RULES.to_string(),
            PromptSegment::ToneStyle => segments::TONE_STYLE.to_string(),
            PromptSegment::Guardrails => segments::GUARDRAILS.to_string(),
            PromptSegment::Citations => segments::CITATIONS.to_string(),
            PromptSegment::Comparison => segments::COMPARISON.to_string(),
            PromptSegment::DateTime => format!(
                "<date_time>\nThe current date and time is {}.\n</date_time>",
                now.format("%A, %B %-d, %Y %H:%M %:z")
            ),
        }
    }

    /// System segments followed by the converted history.
    pub fn compose(&self, directive: &TurnDirective, history: &[UIMessage]) -> Vec<ChatMessage> {
        let mut messages = self.bundle(directive).into_system_messages();
        messages.extend(convert_history(history));
        messages
    }
}

/// UI history to model messages. Only text parts survive; messages left
/// without text are skipped.
pub fn convert_history(history: &[UIMessage]) -> Vec<ChatMessage> {
    history
        .iter()
        .filter_map(|message| {
            let text = message.text_content();
            if text.trim().is_empty() {
                return None;
            }
            Some(match message.role {
                UIRole::System => ChatMessage::system(text),
                UIRole::User => ChatMessage::user(text),
                UIRole::Assistant => ChatMessage::assistant(text),
            })
        })
        .collect()
}
