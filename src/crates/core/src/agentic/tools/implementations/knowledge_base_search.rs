use crate::agentic::tools::framework::{query_from_input, query_schema, Tool, ToolOutcome};
use crate::infrastructure::search::VectorIndex;
use crate::util::text::truncate_chars;
use async_trait::async_trait;
use log::{error, info};
use serde_json::Value;
use std::sync::Arc;

pub const KNOWLEDGE_BASE_TOOL_NAME: &str = "knowledgeBaseSearch";
pub const NO_RESULTS: &str = "NO_RESULTS";
pub const ERROR_IN_KB_SEARCH: &str = "ERROR_IN_KB_SEARCH";
pub const KB_MAX_CHARS: usize = 4000;

const TEXT_FIELDS: [&str; 3] = ["text", "content", "pageContent"];

/// Semantic search over the internal knowledge base.
pub struct KnowledgeBaseSearchTool {
    index: Arc<dyn VectorIndex>,
}

impl KnowledgeBaseSearchTool {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }
}

/// Turn whatever the index returned into a bounded text outcome.
pub fn normalize_kb_response(value: &Value) -> ToolOutcome {
    match value {
        Value::Null => ToolOutcome::Empty,
        Value::String(text) if text.trim().is_empty() => ToolOutcome::Empty,
        Value::String(text) => ToolOutcome::Found(truncate_chars(text, KB_MAX_CHARS)),
        Value::Array(items) => {
            let combined = items
                .iter()
                .filter_map(item_text)
                .collect::<Vec<_>>()
                .join("\n\n");
            if combined.trim().is_empty() {
                ToolOutcome::Empty
            } else {
                ToolOutcome::Found(truncate_chars(&combined, KB_MAX_CHARS))
            }
        }
        other => {
            let serialized = other.to_string();
            if serialized.trim().is_empty() {
                ToolOutcome::Empty
            } else {
                ToolOutcome::Found(truncate_chars(&serialized, KB_MAX_CHARS))
            }
        }
    }
}

fn item_text(item: &Value) -> Option<&str> {
    if let Some(text) = item.as_str() {
        return Some(text).filter(|t| !t.trim().is_empty());
    }
    first_text_field(item).or_else(|| item.get("metadata").and_then(first_text_field))
}

fn first_text_field(source: &Value) -> Option<&str> {
    TEXT_FIELDS
        .iter()
        .filter_map(|field| source.get(*field).and_then(Value::as_str))
        .find(|t| !t.trim().is_empty())
}

#[async_trait]
impl Tool for KnowledgeBaseSearchTool {
    fn name(&self) -> &str {
        KNOWLEDGE_BASE_TOOL_NAME
    }

    fn description(&self) -> String {
        "Search the internal knowledge base for information about programs, admissions, \
         fees, placements and campus life."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        query_schema(
            "The query to search the knowledge base for. Optimally a hypothetical answer for similarity search.",
        )
    }

    async fn call_impl(&self, input: &Value) -> ToolOutcome {
        let Some(query) = query_from_input(input) else {
            return ToolOutcome::Failed("query is required".to_string());
        };
        info!("Knowledge base search: query={}", query);

        match self.index.search(query).await {
            Ok(value) => normalize_kb_response(&value),
            Err(e) => {
                error!("Knowledge base search failed: query={}, error={}", query, e);
                ToolOutcome::Failed(e.to_string())
            }
        }
    }

    fn render(&self, _input: &Value, outcome: &ToolOutcome) -> String {
        match outcome {
            ToolOutcome::Found(text) => text.clone(),
            ToolOutcome::Empty => NO_RESULTS.to_string(),
            ToolOutcome::Failed(_) => ERROR_IN_KB_SEARCH.to_string(),
        }
    }
}
