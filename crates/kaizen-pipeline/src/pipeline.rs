//! The three-phase review pipeline for one domain
//!
//! Collect → gather local docs → analyze → report, each awaited before the
//! next starts. Any error aborts the run; nothing is checkpointed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Local, Utc};
use kaizen_types::{
    AnalysisOutput, CompletionModel, DomainConfig, Issue, IssueComment, IssueTracker,
    KaizenConfig, NewIssue, ResearchOutput, SearchRequest, WebSearch,
};
use tracing::info;

use crate::content::read_target_files;
use crate::prompt::{
    GAP_ANALYSIS, IMPLEMENTATION_GUIDE, RECOMMENDATIONS, SYSTEM_PROMPT, build_user_prompt,
};
use crate::report::{build_new_issue, build_update_comment, issue_title_prefix};
use crate::research::{build_query, into_research_output};
use crate::sections::MarkdownSections;

/// What the report phase did
#[derive(Debug, Clone)]
pub enum ReportOutcome {
    /// No open tracking issue existed, so one was created
    Created(Issue),
    /// An open tracking issue existed and received an update comment
    Commented { issue: Issue, comment: IssueComment },
    /// No tracker was configured; this is the issue that would have been filed
    DryRun(NewIssue),
}

/// Pipeline orchestrator
pub struct Kaizen {
    config: KaizenConfig,
    content_base: PathBuf,
    search: Arc<dyn WebSearch>,
    completion: Arc<dyn CompletionModel>,
    tracker: Option<Arc<dyn IssueTracker>>,
}

impl Kaizen {
    /// Create a pipeline that reads content from the current directory and
    /// has no tracker (dry run) until [`Kaizen::with_tracker`] is called
    pub fn new(
        config: KaizenConfig,
        search: Arc<dyn WebSearch>,
        completion: Arc<dyn CompletionModel>,
    ) -> Self {
        Self {
            config,
            content_base: PathBuf::from("."),
            search,
            completion,
            tracker: None,
        }
    }

    /// Base directory that target globs are resolved against
    pub fn with_content_base(mut self, content_base: impl Into<PathBuf>) -> Self {
        self.content_base = content_base.into();
        self
    }

    /// Report to this tracker instead of producing a dry-run draft
    pub fn with_tracker(mut self, tracker: Arc<dyn IssueTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn config(&self) -> &KaizenConfig {
        &self.config
    }

    /// Phase 1: search the web and keep the relevant results
    pub async fn collect_trends(&self, domain: &DomainConfig) -> Result<ResearchOutput> {
        info!("Starting Phase 1: Trend Collection for {}...", domain.name);

        let hints = &domain.search_hints;
        let query = build_query(hints, Local::now().year());
        info!("Search Query: {}", query);

        let request = SearchRequest {
            query: query.clone(),
            max_results: self.config.global_settings.max_search_results,
            include_domains: hints.include_domains.clone(),
            exclude_domains: hints.exclude_domains.clone(),
        };
        let response = self
            .search
            .search(&request)
            .await
            .context("Trend collection failed")?;

        let research = into_research_output(response, hints, query);
        info!("Collected {} sources", research.sources.len());
        Ok(research)
    }

    /// Current documentation of the domain, read from the content base
    pub fn read_target_files(&self, domain: &DomainConfig) -> String {
        read_target_files(&domain.target_files, &self.content_base)
    }

    /// Phase 2: ask the model to compare the research with the current docs
    pub async fn analyze_content(
        &self,
        domain: &DomainConfig,
        research: &ResearchOutput,
        current_content: &str,
    ) -> Result<AnalysisOutput> {
        info!("Starting Phase 2: Analysis for {}...", domain.name);

        let user_prompt =
            build_user_prompt(domain, research, current_content, Local::now().year());
        let full_response = self
            .completion
            .generate_response(
                SYSTEM_PROMPT,
                &user_prompt,
                self.config.global_settings.analysis_temperature,
            )
            .await
            .context("Analysis failed")?;

        let sections = MarkdownSections::parse(&full_response);
        let section = |name: &str| sections.get(name).unwrap_or_default().to_string();

        Ok(AnalysisOutput {
            gap_analysis: section(GAP_ANALYSIS),
            recommendations: section(RECOMMENDATIONS),
            implementation_guide: section(IMPLEMENTATION_GUIDE),
            full_response,
        })
    }

    /// Phase 3: file a new tracking issue or comment on the open one
    pub async fn report_findings(
        &self,
        domain: &DomainConfig,
        research: &ResearchOutput,
        analysis: &AnalysisOutput,
    ) -> Result<ReportOutcome> {
        info!("Starting Phase 3: Reporting for {}...", domain.name);

        let now = Utc::now();
        let Some(tracker) = &self.tracker else {
            info!("No issue tracker configured, skipping report");
            return Ok(ReportOutcome::DryRun(build_new_issue(
                &self.config.global_settings,
                domain,
                research,
                analysis,
                now,
            )));
        };

        if let Some(issue) = tracker.find_existing_issue(&issue_title_prefix(domain)).await {
            info!("Found existing issue #{}. Adding comment instead.", issue.number);
            let body = build_update_comment(research, analysis, now);
            let comment = tracker.add_comment(issue.number, &body).await?;
            info!("Comment added to issue #{}", issue.number);
            return Ok(ReportOutcome::Commented { issue, comment });
        }

        let new_issue =
            build_new_issue(&self.config.global_settings, domain, research, analysis, now);
        let issue = tracker.create_issue(&new_issue).await?;
        info!("Created new issue #{}: {}", issue.number, issue.html_url);
        Ok(ReportOutcome::Created(issue))
    }

    /// Run every phase for `domain_id`, strictly in sequence
    pub async fn run_domain_analysis(&self, domain_id: &str) -> Result<ReportOutcome> {
        let domain = self
            .config
            .domain(domain_id)
            .ok_or_else(|| anyhow!("Domain not found: {}", domain_id))?;

        let research = self.collect_trends(domain).await?;
        let current_content = self.read_target_files(domain);
        let analysis = self
            .analyze_content(domain, &research, &current_content)
            .await?;
        self.report_findings(domain, &research, &analysis).await
    }
}
