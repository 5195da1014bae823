//! Tool framework
//!
//! A tool produces a [`ToolOutcome`]; the tool itself decides how that
//! outcome is worded for the model. Tools never fail the turn: invalid input
//! and backend errors both end up as text the model can read.

use async_trait::async_trait;
use campus_ai_adapters::ToolDefinition;
use serde_json::{json, Value};

/// What a retrieval call produced, before it is rendered for the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Found(String),
    Empty,
    Failed(String),
}

impl ToolOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub outcome: ToolOutcome,
    pub result_for_assistant: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub result: bool,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            result: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            result: false,
            message: Some(message.into()),
        }
    }
}

/// Non-blank `query` string from tool input.
pub fn query_from_input(input: &Value) -> Option<&str> {
    input
        .get("query")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
}

/// `{query: string}` schema shared by the retrieval tools.
pub fn query_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": description
            }
        },
        "required": ["query"],
        "additionalProperties": false
    })
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> String;

    fn input_schema(&self) -> Value;

    fn validate_input(&self, input: &Value) -> ValidationResult {
        if query_from_input(input).is_none() {
            return ValidationResult::invalid("query is required");
        }
        ValidationResult::ok()
    }

    async fn call_impl(&self, input: &Value) -> ToolOutcome;

    /// Model-facing text for an outcome.
    fn render(&self, input: &Value, outcome: &ToolOutcome) -> String;

    async fn call(&self, input: &Value) -> ToolResult {
        let validation = self.validate_input(input);
        let outcome = if validation.result {
            self.call_impl(input).await
        } else {
            ToolOutcome::Failed(
                validation
                    .message
                    .unwrap_or_else(|| "invalid input".to_string()),
            )
        };
        let result_for_assistant = self.render(input, &outcome);
        ToolResult {
            outcome,
            result_for_assistant,
        }
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.input_schema())
    }
}
