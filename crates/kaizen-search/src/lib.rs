//! Web search client (Tavily).
//!
//! One call per pipeline run: an "advanced" depth search that also asks the
//! engine for a synthesized answer.

use std::time::Duration;

use async_trait::async_trait;
use kaizen_http::prelude::*;
use kaizen_types::{SearchRequest, SearchResponse, WebSearch};
use serde::Serialize;
use tracing::{debug, info};

/// Public Tavily endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Environment variable conventionally holding the API key
pub const API_KEY_ENV: &str = "TAVILY_API_KEY";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
const SERVICE: &str = "Tavily";

/// Request body of `POST /search`
#[derive(Serialize)]
struct SearchPayload<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'static str,
    include_answer: bool,
    max_results: usize,
    include_domains: &'a [String],
    exclude_domains: &'a [String],
}

/// Client for the Tavily search API
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl TavilyClient {
    /// Create a client; fails if the API key is missing or blank
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let api_key = require_credential(API_KEY_ENV, api_key)?;
        Ok(Self {
            http: build_client(SEARCH_TIMEOUT)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Point the client at another endpoint (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the default retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Search for `query`, returning at most `max_results` hits
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        exclude_domains: &[String],
    ) -> Result<SearchResponse> {
        self.execute(&SearchRequest {
            query: query.to_string(),
            max_results,
            include_domains: Vec::new(),
            exclude_domains: exclude_domains.to_vec(),
        })
        .await
    }

    /// Run a fully specified search request
    pub async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let payload = build_payload(&self.api_key, request);
        let url = format!("{}/search", self.base_url);

        debug!(
            query = %request.query,
            max_results = request.max_results,
            "Sending search request"
        );

        let response: SearchResponse = self
            .retry
            .run("Tavily API", || async {
                let resp = self.http.post(&url).json(&payload).send().await?;
                read_json(SERVICE, resp).await
            })
            .await?;

        info!("Search returned {} results", response.results.len());
        Ok(response)
    }
}

fn build_payload<'a>(api_key: &'a str, request: &'a SearchRequest) -> SearchPayload<'a> {
    SearchPayload {
        api_key,
        query: &request.query,
        search_depth: "advanced",
        include_answer: true,
        max_results: request.max_results,
        include_domains: &request.include_domains,
        exclude_domains: &request.exclude_domains,
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> anyhow::Result<SearchResponse> {
        Ok(self.execute(request).await?)
    }
}
