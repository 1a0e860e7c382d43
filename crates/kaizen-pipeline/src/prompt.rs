//! Prompt assembly for the analyze phase

use kaizen_types::{DomainConfig, ResearchOutput, SearchResult};

/// Number of sources quoted in prompts and issue bodies
pub const TOP_SOURCES: usize = 5;

/// Characters of source content quoted in the prompt
pub const SOURCE_EXCERPT_CHARS: usize = 200;

/// Section headers the model is told to produce
pub const GAP_ANALYSIS: &str = "Gap Analysis";
pub const RECOMMENDATIONS: &str = "Recommendations";
pub const IMPLEMENTATION_GUIDE: &str = "Implementation Guide";
pub const REFERENCES: &str = "References";

/// Fixed system prompt: role plus the mandated output shape
pub const SYSTEM_PROMPT: &str = "\
You are an improvement advisor specializing in Claude Code Skills documentation.
Based on the latest research and best practices, analyze the current skill documentation \
and provide actionable recommendations.

Areas to focus on:
- Quality and clarity of the skill documentation
- Relevance and correctness of sample code
- Best-practice guidance
- User experience and ease of use

Respond in Markdown using exactly these sections:

## Gap Analysis
(Gaps between the current skill documentation and the latest best practices and trends)

## Recommendations
### High Priority
- [ ] (Action item to improve the skill documentation)

### Medium Priority
- [ ] (Action item to improve the skill documentation)

### Low Priority
- [ ] (Action item to improve the skill documentation)

## Implementation Guide
(Concrete steps or example snippets for the high priority items)

## References
(List of the sources you used)
";

/// Cut `content` to `max_chars` characters, appending `...` if anything was cut
pub fn truncate_excerpt(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &content[..byte_index]),
        None => content.to_string(),
    }
}

/// Top sources as `- <title>: <excerpt>` lines for the prompt
pub fn format_sources(sources: &[SearchResult]) -> String {
    sources
        .iter()
        .take(TOP_SOURCES)
        .map(|s| format!("- {}: {}", s.title, truncate_excerpt(&s.content, SOURCE_EXCERPT_CHARS)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// User prompt embedding the domain, the research and the current docs
pub fn build_user_prompt(
    domain: &DomainConfig,
    research: &ResearchOutput,
    current_content: &str,
    year: i32,
) -> String {
    let context = &domain.analysis_context;
    format!(
        "\
Please analyze the following Claude Code Skill: {name}

## Context
- Description: {description}
- Current version/state: {version}
- Priorities: {priorities}

## Latest Research Summary ({year})
{summary}

## Key Sources
{sources}

## Current Skill Documentation
{content}

Based on the latest trends and best practices, analyze the current skill documentation \
and provide recommendations for improving it.
",
        name = domain.name,
        description = domain.description,
        version = context.current_version.as_deref().unwrap_or("Unknown"),
        priorities = context.priority_aspects.join(", "),
        summary = research.summary,
        sources = format_sources(&research.sources),
        content = current_content,
    )
}
