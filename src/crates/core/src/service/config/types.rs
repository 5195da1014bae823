use serde::{Deserialize, Serialize};

/// Minimum step budget for comparison turns; each compared entity and
/// parameter may need its own retrieval call.
pub const MIN_COMPARISON_STEP_BUDGET: u32 = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub assistant: AssistantConfig,
    pub model: ModelConfig,
    pub moderation: ModerationConfig,
    pub knowledge_base: KnowledgeBaseConfig,
    pub web_search: WebSearchConfig,
    pub chat: ChatLimitsConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub name: String,
    pub owner_name: String,
    /// Append the current date and time as the last base instruction.
    pub include_date_time: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "Campus Assistant".to_string(),
            owner_name: "the Campus Assistant team".to_string(),
            include_date_time: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub reasoning_effort: Option<String>,
    pub parallel_tool_calls: bool,
    pub idle_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-5-mini".to_string(),
            reasoning_effort: Some("low".to_string()),
            parallel_tool_calls: false,
            idle_timeout_secs: 600,
        }
    }
}

/// What to do when the moderation provider itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationFailurePolicy {
    /// Let the message through and log a warning.
    Allow,
    /// Answer with the default denial.
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub failure_policy: ModerationFailurePolicy,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "omni-moderation-latest".to_string(),
            failure_policy: ModerationFailurePolicy::Allow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    /// Similarity search endpoint; the knowledge base tool reports an error
    /// sentinel while this is unset.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub top_k: u32,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            top_k: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub num_results: u32,
    pub snippet_chars: usize,
    pub include_domains: Vec<String>,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.exa.ai".to_string(),
            api_key: None,
            num_results: 3,
            snippet_chars: 300,
            include_domains: vec![
                "https://cracku.in".to_string(),
                "https://www.imsindia.com/".to_string(),
                "https://shiksha.com".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatLimitsConfig {
    pub standard_step_budget: u32,
    pub comparison_step_budget: u32,
    pub max_duration_secs: u64,
    pub trigger_keyword: String,
}

impl Default for ChatLimitsConfig {
    fn default() -> Self {
        Self {
            standard_step_budget: 10,
            comparison_step_budget: MIN_COMPARISON_STEP_BUDGET,
            max_duration_secs: 30,
            trigger_keyword: "compare".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}
