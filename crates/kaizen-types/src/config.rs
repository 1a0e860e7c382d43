//! Domain configuration document
//!
//! The document is JSON and lists the domains (skills) that can be
//! reviewed plus settings shared by every run.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Root of the configuration document
#[derive(Debug, Deserialize, Clone, Default)]
pub struct KaizenConfig {
    /// Free-form document version, informational only
    #[serde(default)]
    pub version: Option<String>,

    /// Domains that can be reviewed
    #[serde(default)]
    pub domains: Vec<DomainConfig>,

    /// Settings shared by every domain
    #[serde(default)]
    pub global_settings: GlobalSettings,
}

/// One documentation skill to research and review
#[derive(Debug, Deserialize, Clone)]
pub struct DomainConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Glob patterns, relative to the content base directory
    #[serde(default)]
    pub target_files: Vec<String>,
    #[serde(default)]
    pub search_hints: SearchHints,
    #[serde(default)]
    pub analysis_context: AnalysisContext,
}

/// Hints used to build and filter the web search
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchHints {
    #[serde(default)]
    pub primary_keywords: Vec<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub include_domains: Vec<String>,
    #[serde(default)]
    pub exclude_domains: Vec<String>,
    /// Results mentioning any of these (case-insensitive) are dropped
    #[serde(default)]
    pub exclude_terms: Vec<String>,
}

/// Context handed to the model during analysis
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AnalysisContext {
    #[serde(default)]
    pub current_version: Option<String>,
    #[serde(default)]
    pub priority_aspects: Vec<String>,
}

/// Settings shared by every domain run
#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    #[serde(default = "default_analysis_temperature")]
    pub analysis_temperature: f32,

    /// Labels attached to newly created issues, before the domain id
    #[serde(default = "default_issue_labels")]
    pub issue_labels: Vec<String>,

    #[serde(default)]
    pub issue_assignees: Vec<String>,
}

fn default_max_search_results() -> usize {
    10
}

fn default_analysis_temperature() -> f32 {
    0.3
}

fn default_issue_labels() -> Vec<String> {
    vec!["dotfiles-kaizen".to_string()]
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            max_search_results: default_max_search_results(),
            analysis_temperature: default_analysis_temperature(),
            issue_labels: default_issue_labels(),
            issue_assignees: Vec::new(),
        }
    }
}

impl KaizenConfig {
    /// Parse a configuration document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse configuration document")
    }

    /// Look up a domain by identifier
    pub fn domain(&self, domain_id: &str) -> Option<&DomainConfig> {
        self.domains.iter().find(|d| d.id == domain_id)
    }
}

/// Load the configuration document from disk
pub fn load_config(path: impl AsRef<Path>) -> Result<KaizenConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;

    let config = KaizenConfig::from_json(&content)
        .with_context(|| format!("Invalid config file {:?}", path))?;

    info!(
        "Loaded config {:?} (version {}, {} domains)",
        path,
        config.version.as_deref().unwrap_or("unversioned"),
        config.domains.len()
    );
    Ok(config)
}

/// Find the domain with the given identifier, if any
pub fn get_domain_config<'a>(
    config: &'a KaizenConfig,
    domain_id: &str,
) -> Option<&'a DomainConfig> {
    config.domain(domain_id)
}
