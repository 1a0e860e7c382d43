//! End-to-end pipeline runs against in-memory services

use std::fs;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use kaizen_pipeline::{Kaizen, ReportOutcome};
use kaizen_types::{
    CompletionModel, Issue, IssueComment, IssueTracker, KaizenConfig, NewIssue, SearchRequest,
    SearchResponse, SearchResult, WebSearch,
};

const CONFIG: &str = r#"{
    "version": "1.0",
    "domains": [
        {
            "id": "docs-skill",
            "name": "Docs Skill",
            "description": "Helps write documentation",
            "target_files": ["skills/**/*.md"],
            "search_hints": {
                "primary_keywords": ["skill", "docs"],
                "focus_areas": ["clarity"],
                "exclude_domains": ["pinterest.com"],
                "exclude_terms": ["spam"]
            },
            "analysis_context": {
                "current_version": "2.1",
                "priority_aspects": ["examples"]
            }
        }
    ],
    "global_settings": {
        "max_search_results": 7,
        "analysis_temperature": 0.2,
        "issue_labels": ["dotfiles-kaizen", "automated"]
    }
}"#;

const MODEL_REPLY: &str = "\
## Gap Analysis
Examples are outdated.

## Recommendations
### High Priority
- [ ] Refresh examples

## Implementation Guide
Rewrite section 2.

## References
- https://example.com/good
";

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeSearch {
    requests: Mutex<Vec<SearchRequest>>,
    fail: bool,
}

#[async_trait]
impl WebSearch for FakeSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(anyhow!("search unavailable"));
        }
        Ok(SearchResponse {
            answer: Some("Docs should lead with examples.".to_string()),
            results: vec![
                SearchResult::new(
                    "Good practices",
                    "https://example.com/good",
                    "Write short skills.",
                    0.9,
                ),
                SearchResult::new(
                    "Cheap tricks",
                    "https://example.com/bad",
                    "Buy SPAM backlinks here",
                    0.4,
                ),
            ],
        })
    }
}

#[derive(Default)]
struct FakeModel {
    prompts: Mutex<Vec<(String, String, f32)>>,
}

#[async_trait]
impl CompletionModel for FakeModel {
    async fn generate_response(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        self.prompts.lock().unwrap().push((
            system_prompt.to_string(),
            user_prompt.to_string(),
            temperature,
        ));
        Ok(MODEL_REPLY.to_string())
    }
}

#[derive(Default)]
struct FakeTracker {
    existing: Option<Issue>,
    lookups: Mutex<Vec<String>>,
    created: Mutex<Vec<NewIssue>>,
    comments: Mutex<Vec<(u64, String)>>,
}

impl FakeTracker {
    fn with_existing(number: u64) -> Self {
        Self {
            existing: Some(Issue {
                number,
                title: "[Dotfiles Kaizen] Docs Skill - 2024-12-30".to_string(),
                html_url: format!("https://github.com/owner/repo/issues/{number}"),
            }),
            ..Default::default()
        }
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn find_existing_issue(&self, title_prefix: &str) -> Option<Issue> {
        self.lookups.lock().unwrap().push(title_prefix.to_string());
        self.existing.clone()
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
        self.created.lock().unwrap().push(issue.clone());
        Ok(Issue {
            number: 101,
            title: issue.title.clone(),
            html_url: "https://github.com/owner/repo/issues/101".to_string(),
        })
    }

    async fn add_comment(&self, issue_number: u64, body: &str) -> Result<IssueComment> {
        self.comments
            .lock()
            .unwrap()
            .push((issue_number, body.to_string()));
        Ok(IssueComment {
            id: 9000,
            html_url: format!(
                "https://github.com/owner/repo/issues/{issue_number}#issuecomment-9000"
            ),
        })
    }
}

fn pipeline(search: Arc<FakeSearch>, model: Arc<FakeModel>) -> Kaizen {
    let config = KaizenConfig::from_json(CONFIG).unwrap();
    Kaizen::new(config, search, model)
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn collect_drops_results_with_excluded_terms() {
    let search = Arc::new(FakeSearch::default());
    let kaizen = pipeline(search.clone(), Arc::new(FakeModel::default()));
    let domain = kaizen.config().domain("docs-skill").unwrap().clone();

    let research = kaizen.collect_trends(&domain).await.unwrap();

    assert_eq!(research.sources.len(), 1);
    assert_eq!(research.sources[0].title, "Good practices");
    assert_eq!(research.summary, "Docs should lead with examples.");
    assert!(research.search_query.starts_with("skill docs clarity "));

    let requests = search.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_results, 7);
    assert_eq!(requests[0].exclude_domains, vec!["pinterest.com"]);
    assert_eq!(requests[0].query, research.search_query);
}

#[tokio::test]
async fn analyze_extracts_sections_and_uses_configured_temperature() {
    let model = Arc::new(FakeModel::default());
    let kaizen = pipeline(Arc::new(FakeSearch::default()), model.clone());
    let domain = kaizen.config().domain("docs-skill").unwrap().clone();
    let research = kaizen.collect_trends(&domain).await.unwrap();

    let analysis = kaizen
        .analyze_content(&domain, &research, "# Current SKILL.md")
        .await
        .unwrap();

    assert_eq!(analysis.gap_analysis, "Examples are outdated.");
    assert!(analysis.recommendations.contains("- [ ] Refresh examples"));
    assert_eq!(analysis.implementation_guide, "Rewrite section 2.");
    assert_eq!(analysis.full_response, MODEL_REPLY);

    let prompts = model.prompts.lock().unwrap();
    let (system, user, temperature) = &prompts[0];
    assert!(system.contains("## Gap Analysis"));
    assert!(user.contains("Docs Skill"));
    assert!(user.contains("- Current version/state: 2.1"));
    assert!(user.contains("- Good practices: Write short skills."));
    assert!(!user.contains("Cheap tricks"));
    assert!(user.contains("# Current SKILL.md"));
    assert!((temperature - 0.2).abs() < f32::EPSILON);
}

#[tokio::test]
async fn no_existing_issue_creates_one() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("skills").join("docs")).unwrap();
    fs::write(dir.path().join("skills/docs/SKILL.md"), "# Docs skill").unwrap();

    let tracker = Arc::new(FakeTracker::default());
    let model = Arc::new(FakeModel::default());
    let kaizen = pipeline(Arc::new(FakeSearch::default()), model.clone())
        .with_content_base(dir.path())
        .with_tracker(tracker.clone());

    let outcome = kaizen.run_domain_analysis("docs-skill").await.unwrap();

    assert!(matches!(outcome, ReportOutcome::Created(ref issue) if issue.number == 101));
    assert_eq!(
        tracker.lookups.lock().unwrap().as_slice(),
        ["[Dotfiles Kaizen] Docs Skill"]
    );
    assert!(tracker.comments.lock().unwrap().is_empty());

    let created = tracker.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].title, format!("[Dotfiles Kaizen] Docs Skill - {}", today()));
    assert_eq!(created[0].labels, vec!["dotfiles-kaizen", "automated", "docs-skill"]);
    assert!(created[0].body.contains("- [Good practices](https://example.com/good)"));
    assert!(created[0].body.contains("Examples are outdated."));

    let prompts = model.prompts.lock().unwrap();
    assert!(prompts[0].1.contains("### File: skills/docs/SKILL.md\n\n# Docs skill"));
}

#[tokio::test]
async fn existing_issue_gets_a_comment_instead() {
    let tracker = Arc::new(FakeTracker::with_existing(42));
    let kaizen = pipeline(Arc::new(FakeSearch::default()), Arc::new(FakeModel::default()))
        .with_tracker(tracker.clone());

    let outcome = kaizen.run_domain_analysis("docs-skill").await.unwrap();

    match outcome {
        ReportOutcome::Commented { issue, comment } => {
            assert_eq!(issue.number, 42);
            assert_eq!(comment.id, 9000);
        }
        other => panic!("expected a comment, got {other:?}"),
    }
    assert!(tracker.created.lock().unwrap().is_empty());

    let comments = tracker.comments.lock().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].0, 42);
    assert!(comments[0].1.contains(&format!("### Update: {}", today())));
    assert!(comments[0].1.contains("Docs should lead with examples."));
}

#[tokio::test]
async fn missing_target_files_fall_back_to_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(FakeModel::default());
    let kaizen = pipeline(Arc::new(FakeSearch::default()), model.clone())
        .with_content_base(dir.path());

    let outcome = kaizen.run_domain_analysis("docs-skill").await.unwrap();

    assert!(matches!(outcome, ReportOutcome::DryRun(_)));
    let prompts = model.prompts.lock().unwrap();
    assert!(prompts[0].1.contains("## Current Skill Documentation\nNo matching files found."));
}

#[tokio::test]
async fn dry_run_returns_the_draft_issue() {
    let kaizen = pipeline(Arc::new(FakeSearch::default()), Arc::new(FakeModel::default()));

    let outcome = kaizen.run_domain_analysis("docs-skill").await.unwrap();

    let ReportOutcome::DryRun(draft) = outcome else {
        panic!("expected a dry run");
    };
    assert!(draft.title.starts_with("[Dotfiles Kaizen] Docs Skill - "));
    assert_eq!(draft.labels.last().map(String::as_str), Some("docs-skill"));
}

#[tokio::test]
async fn unknown_domain_is_an_error() {
    let model = Arc::new(FakeModel::default());
    let kaizen = pipeline(Arc::new(FakeSearch::default()), model.clone());

    let err = kaizen.run_domain_analysis("nope").await.unwrap_err();

    assert_eq!(err.to_string(), "Domain not found: nope");
    assert!(model.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn search_failure_stops_before_analysis() {
    let search = Arc::new(FakeSearch {
        fail: true,
        ..Default::default()
    });
    let model = Arc::new(FakeModel::default());
    let tracker = Arc::new(FakeTracker::default());
    let kaizen = pipeline(search, model.clone()).with_tracker(tracker.clone());

    let err = kaizen.run_domain_analysis("docs-skill").await.unwrap_err();

    assert!(format!("{err:#}").contains("search unavailable"));
    assert!(model.prompts.lock().unwrap().is_empty());
    assert!(tracker.lookups.lock().unwrap().is_empty());
}
