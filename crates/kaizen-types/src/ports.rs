//! Service traits implemented by the HTTP clients
//!
//! The pipeline only sees these traits, so each phase can run against an
//! in-memory implementation in tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::{Issue, IssueComment, NewIssue, SearchRequest, SearchResponse};

/// A web search engine that can synthesize an answer
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Run one search and return the raw ranked results
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

/// A language model that answers a single-turn prompt
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Generate the model's reply to `user_prompt` under `system_prompt`
    async fn generate_response(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String>;
}

/// An issue tracker scoped to one repository
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// First open issue whose title contains `title_prefix`
    ///
    /// Lookup failures are logged by the implementation and reported as
    /// `None`; this never fails.
    async fn find_existing_issue(&self, title_prefix: &str) -> Option<Issue>;

    /// Open a new issue
    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue>;

    /// Append a comment to an existing issue
    async fn add_comment(&self, issue_number: u64, body: &str) -> Result<IssueComment>;
}
