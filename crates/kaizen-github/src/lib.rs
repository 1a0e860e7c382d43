//! Issue tracker client (GitHub REST API).
//!
//! Scoped to one repository. Finding an existing tracking issue is
//! tolerant: lookup failures are logged and treated as "no issue", so a
//! flaky search endpoint leads to a duplicate issue rather than a failed run.

use std::time::Duration;

use async_trait::async_trait;
use kaizen_http::prelude::*;
use kaizen_types::{Issue, IssueComment, IssueTracker, NewIssue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Public GitHub REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Environment variable conventionally holding the token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable conventionally holding `owner/name`
pub const REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";

const TRACKER_TIMEOUT: Duration = Duration::from_secs(30);
const ACCEPT: &str = "application/vnd.github.v3+json";
const SERVICE: &str = "GitHub";

#[derive(Debug, Deserialize)]
struct IssueSearchResponse {
    total_count: u64,
    #[serde(default)]
    items: Vec<Issue>,
}

#[derive(Debug, Serialize)]
struct CommentPayload<'a> {
    body: &'a str,
}

/// Client for one repository's issues
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    repository: String,
    base_url: String,
    retry: RetryPolicy,
}

impl GitHubClient {
    /// Create a client; fails if the token or repository is missing, or the
    /// repository is not of the form `owner/name`
    pub fn new(token: Option<&str>, repository: Option<&str>) -> Result<Self> {
        let token = require_credential(TOKEN_ENV, token)?;
        let repository = require_credential(REPOSITORY_ENV, repository)?;
        validate_repository(&repository)?;

        info!("Issue tracker initialized for {}", repository);
        Ok(Self {
            http: build_client(TRACKER_TIMEOUT)?,
            token,
            repository,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Point the client at another endpoint (GitHub Enterprise, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the default retry policy used by [`GitHubClient::create_issue`]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Repository coordinate this client is scoped to
    pub fn repository(&self) -> &str {
        &self.repository
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .post(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT)
    }

    /// Search open issues whose title contains `title_prefix`.
    ///
    /// Distinguishes "no match" (`Ok(None)`) from a failed lookup (`Err`).
    pub async fn search_issues(&self, title_prefix: &str) -> Result<Option<Issue>> {
        let url = format!("{}/search/issues", self.base_url);
        let query = search_query(&self.repository, title_prefix);
        debug!(q = %query, "Searching issues");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .query(&[("q", query.as_str())])
            .send()
            .await?;
        let data: IssueSearchResponse = read_json(SERVICE, resp).await?;

        if data.total_count == 0 {
            return Ok(None);
        }
        // `in:title` matches words, not the literal prefix
        Ok(data
            .items
            .into_iter()
            .find(|issue| issue.title.contains(title_prefix)))
    }

    /// First open issue whose title contains `title_prefix`; never fails
    pub async fn find_existing_issue(&self, title_prefix: &str) -> Option<Issue> {
        match self.search_issues(title_prefix).await {
            Ok(issue) => issue,
            Err(e) => {
                warn!("GitHub API search error: {}", e);
                None
            }
        }
    }

    /// Open a new issue; retried on failure
    pub async fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
        let url = format!("{}/repos/{}/issues", self.base_url, self.repository);

        let created: Issue = self
            .retry
            .run("GitHub API", || async {
                let resp = self.post(&url).json(issue).send().await?;
                read_json(SERVICE, resp).await
            })
            .await?;

        info!("Created issue #{}: {}", created.number, created.html_url);
        Ok(created)
    }

    /// Append a comment to an existing issue; not retried
    pub async fn add_comment(&self, issue_number: u64, body: &str) -> Result<IssueComment> {
        let url = format!(
            "{}/repos/{}/issues/{}/comments",
            self.base_url, self.repository, issue_number
        );

        let result = async {
            let resp = self.post(&url).json(&CommentPayload { body }).send().await?;
            read_json::<IssueComment>(SERVICE, resp).await
        }
        .await;

        let comment = result.map_err(|e| ApiError::Comment {
            issue_number,
            source: Box::new(e),
        })?;
        info!("Comment added to issue #{}", issue_number);
        Ok(comment)
    }
}

/// Build the issue-search query for open issues in `repository`
fn search_query(repository: &str, title_prefix: &str) -> String {
    format!("repo:{repository} is:issue is:open in:title {title_prefix}")
}

fn validate_repository(repository: &str) -> Result<()> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(ApiError::Config(format!(
            "repository must be of the form owner/name, got '{repository}'"
        ))),
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn find_existing_issue(&self, title_prefix: &str) -> Option<Issue> {
        GitHubClient::find_existing_issue(self, title_prefix).await
    }

    async fn create_issue(&self, issue: &NewIssue) -> anyhow::Result<Issue> {
        Ok(GitHubClient::create_issue(self, issue).await?)
    }

    async fn add_comment(&self, issue_number: u64, body: &str) -> anyhow::Result<IssueComment> {
        Ok(GitHubClient::add_comment(self, issue_number, body).await?)
    }
}
