use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use kaizen_github::GitHubClient;
use kaizen_logging::LogFormat;
use kaizen_pipeline::{Kaizen, ReportOutcome};
use kaizen_provider::AnthropicClient;
use kaizen_search::TavilyClient;
use kaizen_types::{NewIssue, load_config};
use tracing::info;

use crate::config::Settings;

/// What to analyze and where to read it from
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub domain_id: String,
    pub config_path: PathBuf,
    pub content_base: PathBuf,
    pub dry_run: bool,
}

/// Kaizen service - wires the clients into the pipeline and runs it once
pub struct KaizenService {
    settings: Settings,
    options: RunOptions,
}

impl KaizenService {
    pub fn new(settings: Settings, options: RunOptions) -> Self {
        Self { settings, options }
    }

    /// Run the analysis for the configured domain
    pub async fn run(self) -> Result<()> {
        let format: LogFormat = self.settings.logging.format.parse()?;
        kaizen_logging::init_logging(&self.settings.logging.level, format)?;
        info!("Starting Kaizen analysis for domain {}", self.options.domain_id);

        let kaizen = self.build_pipeline()?;
        let outcome = kaizen.run_domain_analysis(&self.options.domain_id).await?;

        match outcome {
            ReportOutcome::Created(issue) => {
                info!("Tracking issue #{} created", issue.number);
            }
            ReportOutcome::Commented { issue, comment } => {
                info!("Tracking issue #{} updated: {}", issue.number, comment.html_url);
            }
            ReportOutcome::DryRun(draft) => {
                info!("Dry run, nothing was filed");
                println!("{}", render_draft(&draft));
            }
        }
        Ok(())
    }

    /// Construct every client up front so missing credentials fail before
    /// any request is made
    fn build_pipeline(&self) -> Result<Kaizen> {
        let config = load_config(&self.options.config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                self.options.config_path.display()
            )
        })?;

        let credentials = &self.settings.credentials;
        let endpoints = &self.settings.endpoints;

        let search = TavilyClient::new(credentials.tavily_api_key.as_deref())?
            .with_base_url(endpoints.search.as_str());
        let completion = AnthropicClient::new(credentials.anthropic_api_key.as_deref())?
            .with_base_url(endpoints.completion.as_str());

        let kaizen = Kaizen::new(config, Arc::new(search), Arc::new(completion))
            .with_content_base(&self.options.content_base);

        if self.options.dry_run {
            return Ok(kaizen);
        }

        let tracker = GitHubClient::new(
            credentials.github_token.as_deref(),
            credentials.github_repository.as_deref(),
        )?
        .with_base_url(endpoints.tracker.as_str());
        Ok(kaizen.with_tracker(Arc::new(tracker)))
    }
}

/// Title, labels and body of an issue that was not filed
fn render_draft(draft: &NewIssue) -> String {
    let mut out = format!("# {}\n", draft.title);
    if !draft.labels.is_empty() {
        out.push_str(&format!("Labels: {}\n", draft.labels.join(", ")));
    }
    if !draft.assignees.is_empty() {
        out.push_str(&format!("Assignees: {}\n", draft.assignees.join(", ")));
    }
    out.push_str(&draft.body);
    out
}
