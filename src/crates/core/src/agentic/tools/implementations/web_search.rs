use crate::agentic::tools::framework::{query_from_input, query_schema, Tool, ToolOutcome};
use crate::infrastructure::search::{WebSearchHit, WebSearchProvider, WebSearchRequest};
use crate::util::text::{collapse_whitespace, truncate_chars};
use async_trait::async_trait;
use log::{error, info};
use serde_json::Value;
use std::sync::Arc;

pub const WEB_SEARCH_TOOL_NAME: &str = "webSearch";

#[derive(Debug, Clone)]
pub struct WebSearchSettings {
    pub num_results: u32,
    pub snippet_chars: usize,
    pub include_domains: Vec<String>,
}

/// Web search over an allowlist of domains.
pub struct WebSearchTool {
    provider: Arc<dyn WebSearchProvider>,
    settings: WebSearchSettings,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn WebSearchProvider>, settings: WebSearchSettings) -> Self {
        Self { provider, settings }
    }
}

/// Numbered result list, one block per hit.
pub fn format_hits(hits: &[WebSearchHit], snippet_chars: usize) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let snippet = hit
                .text
                .as_deref()
                .map(|text| collapse_whitespace(&truncate_chars(text, snippet_chars)))
                .unwrap_or_default();
            let date = hit
                .published_date
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| format!(" (published: {})", d))
                .unwrap_or_default();
            let title = hit
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("Untitled");
            format!("{}. {}{}\n{}\n{}", i + 1, title, date, hit.url, snippet)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        WEB_SEARCH_TOOL_NAME
    }

    fn description(&self) -> String {
        "Search the web for up-to-date information".to_string()
    }

    fn input_schema(&self) -> Value {
        query_schema("The search query")
    }

    async fn call_impl(&self, input: &Value) -> ToolOutcome {
        let Some(query) = query_from_input(input) else {
            return ToolOutcome::Failed("query is required".to_string());
        };
        info!("Web search: query={}", query);

        let request = WebSearchRequest {
            query: query.to_string(),
            num_results: self.settings.num_results,
            include_domains: self.settings.include_domains.clone(),
        };
        match self.provider.search(&request).await {
            Ok(hits) if hits.is_empty() => ToolOutcome::Empty,
            Ok(hits) => ToolOutcome::Found(format_hits(&hits, self.settings.snippet_chars)),
            Err(e) => {
                error!("Web search failed: query={}, error={}", query, e);
                ToolOutcome::Failed(e.to_string())
            }
        }
    }

    fn render(&self, input: &Value, outcome: &ToolOutcome) -> String {
        let query = input
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default();
        match outcome {
            ToolOutcome::Found(summary) => format!(
                "Here are some web search results for \"{}\":\n\n{}",
                query, summary
            ),
            ToolOutcome::Empty => format!(
                "I searched the web for \"{}\" but couldn't find any relevant results.",
                query
            ),
            ToolOutcome::Failed(_) => format!(
                "I tried to search the web for \"{}\", but there was an internal error while fetching results.",
                query
            ),
        }
    }
}
