//! Rendering of tracking issues and update comments

use chrono::{DateTime, Utc};
use kaizen_types::{
    AnalysisOutput, DomainConfig, GlobalSettings, NewIssue, ResearchOutput, SearchResult,
};

use crate::prompt::TOP_SOURCES;

/// Tag opening every tracking issue title
pub const ISSUE_TAG: &str = "Dotfiles Kaizen";

/// Date-free title prefix shared by every tracking issue of a domain
pub fn issue_title_prefix(domain: &DomainConfig) -> String {
    format!("[{}] {}", ISSUE_TAG, domain.name)
}

/// `[<tag>] <name> - <YYYY-MM-DD>`
pub fn issue_title(domain: &DomainConfig, now: DateTime<Utc>) -> String {
    format!("{} - {}", issue_title_prefix(domain), now.format("%Y-%m-%d"))
}

/// Top sources as markdown links
pub fn format_sources_list(sources: &[SearchResult]) -> String {
    sources
        .iter()
        .take(TOP_SOURCES)
        .map(|s| format!("- [{}]({})", s.title, s.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Global labels followed by the domain id
pub fn issue_labels(settings: &GlobalSettings, domain: &DomainConfig) -> Vec<String> {
    let mut labels = settings.issue_labels.clone();
    labels.push(domain.id.clone());
    labels
}

/// Body of a newly created tracking issue
pub fn build_issue_body(
    domain: &DomainConfig,
    research: &ResearchOutput,
    analysis: &AnalysisOutput,
    now: DateTime<Utc>,
) -> String {
    format!(
        "
## 🔍 Analysis Overview
- **Domain**: {name}
- **Date**: {timestamp}
- **Search Query**: `{query}`

## 📊 Research Summary
{summary}

## 💡 Analysis & Recommendations
{analysis}

## 📚 Top Sources
{sources}

---
*This issue was automatically generated by the Dotfiles Kaizen Workflow.*
",
        name = domain.name,
        timestamp = now.format("%Y-%m-%d %H:%M:%S UTC"),
        query = research.search_query,
        summary = research.summary,
        analysis = analysis.full_response,
        sources = format_sources_list(&research.sources),
    )
}

/// Comment appended to an existing tracking issue
pub fn build_update_comment(
    research: &ResearchOutput,
    analysis: &AnalysisOutput,
    now: DateTime<Utc>,
) -> String {
    format!(
        "
### Update: {date}

**Research Summary**:
{summary}

**New Recommendations**:
{analysis}
",
        date = now.format("%Y-%m-%d"),
        summary = research.summary,
        analysis = analysis.full_response,
    )
}

/// Everything needed to open the tracking issue for this run
pub fn build_new_issue(
    settings: &GlobalSettings,
    domain: &DomainConfig,
    research: &ResearchOutput,
    analysis: &AnalysisOutput,
    now: DateTime<Utc>,
) -> NewIssue {
    NewIssue {
        title: issue_title(domain, now),
        body: build_issue_body(domain, research, analysis, now),
        labels: issue_labels(settings, domain),
        assignees: settings.issue_assignees.clone(),
    }
}
