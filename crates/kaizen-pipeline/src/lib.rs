//! Kaizen review pipeline
//!
//! Researches current best practices for a documentation skill, asks a
//! language model to compare them with the skill's docs, and files the
//! findings in the issue tracker.
//!
//! ## Phases
//!
//! 1. Collect: one web search, filtered by the domain's excluded terms
//! 2. Analyze: the domain's local files plus the research go to the model
//! 3. Report: a new tracking issue, or a comment on the open one
//!
//! The external services are reached through the traits in
//! [`kaizen_types::ports`], so the pipeline itself does no HTTP.

pub mod content;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod research;
pub mod sections;

pub use content::read_target_files;
pub use pipeline::{Kaizen, ReportOutcome};
pub use sections::{MarkdownSections, extract_section};
