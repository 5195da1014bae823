//! Error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CampusError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Timed out after {0}s")]
    Timeout(u64),
}

pub type CampusResult<T> = Result<T, CampusError>;

impl CampusError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<anyhow::Error> for CampusError {
    fn from(error: anyhow::Error) -> Self {
        Self::Provider(format!("{:#}", error))
    }
}

impl From<toml::de::Error> for CampusError {
    fn from(error: toml::de::Error) -> Self {
        Self::Config(error.to_string())
    }
}
