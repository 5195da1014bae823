//! Semantic search over the internal document index

use crate::util::errors::{CampusError, CampusResult};
use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Raw search payload; interpretation is left to the caller.
    async fn search(&self, query: &str) -> CampusResult<Value>;
}

/// Similarity search exposed over HTTP.
///
/// Sends `{"query", "topK"}` and accepts either a bare JSON value or an
/// object wrapping the hits in `matches`, `results` or `documents`.
pub struct HttpVectorIndex {
    http: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    top_k: u32,
}

impl HttpVectorIndex {
    pub fn new(
        http: reqwest::Client,
        endpoint: Option<String>,
        api_key: Option<String>,
        top_k: u32,
    ) -> Self {
        Self {
            http,
            endpoint,
            api_key,
            top_k,
        }
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn search(&self, query: &str) -> CampusResult<Value> {
        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| CampusError::config("knowledge_base.endpoint is not configured"))?;

        let mut request = self.http.post(endpoint).json(&json!({
            "query": query,
            "topK": self.top_k,
        }));
        if let Some(api_key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(api_key);
        }

        let body: Value = request.send().await?.error_for_status()?.json().await?;
        let hits = unwrap_hits(body);
        debug!(
            "Vector index responded: hits={}",
            hits.as_array().map(|a| a.len()).unwrap_or(0)
        );
        Ok(hits)
    }
}

fn unwrap_hits(body: Value) -> Value {
    match body {
        Value::Object(mut map) => {
            for key in ["matches", "results", "documents"] {
                if map.get(key).is_some_and(Value::is_array) {
                    return map.remove(key).unwrap_or(Value::Null);
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}
