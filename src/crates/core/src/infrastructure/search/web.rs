//! External web search restricted to a domain allowlist

use crate::util::errors::{CampusError, CampusResult};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSearchRequest {
    pub query: String,
    pub num_results: u32,
    pub include_domains: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    async fn search(&self, request: &WebSearchRequest) -> CampusResult<Vec<WebSearchHit>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchBody<'a> {
    query: &'a str,
    num_results: u32,
    include_domains: &'a [String],
    contents: ExaContents,
}

#[derive(Debug, Serialize)]
struct ExaContents {
    text: bool,
}

#[derive(Debug, Deserialize)]
struct ExaSearchResponse {
    #[serde(default)]
    results: Vec<WebSearchHit>,
}

/// Exa `/search` with inline page text.
pub struct ExaSearch {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExaSearch {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl WebSearchProvider for ExaSearch {
    async fn search(&self, request: &WebSearchRequest) -> CampusResult<Vec<WebSearchHit>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CampusError::config("web_search.api_key is not configured"))?;

        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let body = ExaSearchBody {
            query: &request.query,
            num_results: request.num_results,
            include_domains: &request.include_domains,
            contents: ExaContents { text: true },
        };

        let response: ExaSearchResponse = self
            .http
            .post(&url)
            .header("x-api-key", api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Web search responded: results={}", response.results.len());
        Ok(response.results)
    }
}
