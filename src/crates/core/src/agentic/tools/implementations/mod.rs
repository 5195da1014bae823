//! Retrieval tool implementations

pub mod knowledge_base_search;
pub mod web_search;

pub use knowledge_base_search::{
    normalize_kb_response, KnowledgeBaseSearchTool, ERROR_IN_KB_SEARCH, KB_MAX_CHARS,
    KNOWLEDGE_BASE_TOOL_NAME, NO_RESULTS,
};
pub use web_search::{format_hits, WebSearchSettings, WebSearchTool, WEB_SEARCH_TOOL_NAME};
