use super::types::{ChatConfig, MIN_COMPARISON_STEP_BUDGET};
use crate::util::errors::{CampusError, CampusResult};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "CAMPUS_CONFIG";
const CONFIG_DIR_NAME: &str = "campus-assistant";
const CONFIG_FILE_NAME: &str = "config.toml";

impl ChatConfig {
    pub fn from_toml_str(raw: &str) -> CampusResult<Self> {
        let config: ChatConfig = toml::from_str(raw)?;
        Ok(config)
    }

    /// Load configuration.
    ///
    /// Lookup order: `explicit_path`, `$CAMPUS_CONFIG`, the per-user config
    /// directory, built-in defaults. Environment variables then fill in missing
    /// API keys and override endpoints, and the result is validated.
    pub fn load(explicit_path: Option<&Path>) -> CampusResult<Self> {
        let path = match explicit_path {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var(CONFIG_PATH_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .or_else(default_config_path),
        };

        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(&path).map_err(|e| {
                    CampusError::config(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                info!("Loaded configuration: path={}", path.display());
                Self::from_toml_str(&raw)?
            }
            Some(path) if explicit_path.is_some() => {
                return Err(CampusError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            _ => {
                debug!("No config file found, using defaults");
                ChatConfig::default()
            }
        };

        config.apply_env_overrides_with(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override secrets and endpoints from environment-style lookups.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            if self.model.api_key.is_none() {
                self.model.api_key = Some(key.clone());
            }
            if self.moderation.api_key.is_none() {
                self.moderation.api_key = Some(key);
            }
        }
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            self.model.base_url = base_url;
        }
        if let Some(model) = get("CAMPUS_MODEL") {
            self.model.model = model;
        }
        if let Some(key) = get("EXA_API_KEY") {
            self.web_search.api_key = Some(key);
        }
        if let Some(endpoint) = get("CAMPUS_KB_ENDPOINT") {
            self.knowledge_base.endpoint = Some(endpoint);
        }
        if let Some(key) = get("CAMPUS_KB_API_KEY") {
            self.knowledge_base.api_key = Some(key);
        }
    }

    /// Reject unusable values and clamp the comparison budget.
    pub fn validate(&mut self) -> CampusResult<()> {
        if self.model.model.trim().is_empty() {
            return Err(CampusError::config("model.model must not be empty"));
        }
        if self.chat.standard_step_budget == 0 {
            return Err(CampusError::config(
                "chat.standard_step_budget must be at least 1",
            ));
        }
        if self.chat.max_duration_secs == 0 {
            return Err(CampusError::config(
                "chat.max_duration_secs must be at least 1",
            ));
        }
        if self.chat.trigger_keyword.trim().is_empty() {
            return Err(CampusError::config("chat.trigger_keyword must not be empty"));
        }
        if self.web_search.num_results == 0 {
            return Err(CampusError::config("web_search.num_results must be at least 1"));
        }
        if self.chat.comparison_step_budget < MIN_COMPARISON_STEP_BUDGET {
            warn!(
                "Comparison step budget raised to minimum: configured={}, minimum={}",
                self.chat.comparison_step_budget, MIN_COMPARISON_STEP_BUDGET
            );
            self.chat.comparison_step_budget = MIN_COMPARISON_STEP_BUDGET;
        }
        Ok(())
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::config::types::ModerationFailurePolicy;
    use std::collections::HashMap;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ChatConfig::from_toml_str("").expect("parses");
        assert_eq!(config, ChatConfig::default());
        assert_eq!(config.chat.standard_step_budget, 10);
        assert_eq!(config.chat.comparison_step_budget, 20);
        assert_eq!(config.web_search.num_results, 3);
        assert_eq!(config.moderation.failure_policy, ModerationFailurePolicy::Allow);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ChatConfig::from_toml_str(
            r#"
            [assistant]
            name = "MBA Buddy"

            [moderation]
            failure_policy = "deny"

            [web_search]
            include_domains = ["https://example.edu"]
            "#,
        )
        .expect("parses");

        assert_eq!(config.assistant.name, "MBA Buddy");
        assert_eq!(
            config.assistant.owner_name,
            ChatConfig::default().assistant.owner_name
        );
        assert_eq!(config.moderation.failure_policy, ModerationFailurePolicy::Deny);
        assert_eq!(config.web_search.include_domains, vec!["https://example.edu"]);
        assert_eq!(config.web_search.snippet_chars, 300);
    }

    #[test]
    fn rejects_unknown_failure_policy() {
        let result = ChatConfig::from_toml_str("[moderation]\nfailure_policy = \"maybe\"");
        assert!(matches!(result, Err(CampusError::Config(_))));
    }

    #[test]
    fn env_overrides_fill_missing_secrets_only() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-env"),
            ("EXA_API_KEY", "exa-env"),
            ("CAMPUS_KB_ENDPOINT", "http://kb.local/search"),
        ]);
        let mut config = ChatConfig::default();
        config.model.api_key = Some("sk-file".to_string());
        config.apply_env_overrides_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.model.api_key.as_deref(), Some("sk-file"));
        assert_eq!(config.moderation.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.web_search.api_key.as_deref(), Some("exa-env"));
        assert_eq!(
            config.knowledge_base.endpoint.as_deref(),
            Some("http://kb.local/search")
        );
    }

    #[test]
    fn validate_clamps_comparison_budget() {
        let mut config = ChatConfig::default();
        config.chat.comparison_step_budget = 5;
        config.validate().expect("valid");
        assert_eq!(config.chat.comparison_step_budget, MIN_COMPARISON_STEP_BUDGET);
    }

    #[test]
    fn validate_rejects_zero_standard_budget() {
        let mut config = ChatConfig::default();
        config.chat.standard_step_budget = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = ChatConfig::load(Some(Path::new("/definitely/not/here/config.toml")));
        assert!(matches!(result, Err(CampusError::Config(_))));
    }
}
