//! Kaizen Types - Core types for the Kaizen review pipeline
//!
//! This module defines the data passed between the pipeline phases, the
//! domain configuration document, and the service traits the pipeline
//! talks to.

pub mod config;
pub mod ports;

pub use config::{
    AnalysisContext, DomainConfig, GlobalSettings, KaizenConfig, SearchHints, get_domain_config,
    load_config,
};
pub use ports::{CompletionModel, IssueTracker, WebSearch};

use serde::{Deserialize, Serialize};

// ============================================================================
// Research Types
// ============================================================================

/// A single ranked web search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            score,
        }
    }

    /// True if the title or content contains any of the given terms, ignoring case
    pub fn mentions_any(&self, terms: &[String]) -> bool {
        let title = self.title.to_lowercase();
        let content = self.content.to_lowercase();
        terms.iter().map(|t| t.to_lowercase()).any(|term| {
            title.contains(&term) || content.contains(&term)
        })
    }
}

/// Parameters for one web search call
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: usize,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
}

/// Body returned by the search API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Answer synthesized by the search engine, if it produced one
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Output of the collect phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchOutput {
    pub sources: Vec<SearchResult>,
    pub summary: String,
    pub search_query: String,
}

/// Output of the analyze phase
///
/// The three named sections are extracted from `full_response` on a
/// best-effort basis and are empty when the model omitted the header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub gap_analysis: String,
    pub recommendations: String,
    pub implementation_guide: String,
    pub full_response: String,
}

// ============================================================================
// Issue Tracker Types
// ============================================================================

/// An issue as reported by the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub html_url: String,
}

/// A comment created on an issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub html_url: String,
}

/// Everything needed to open a new issue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
}
