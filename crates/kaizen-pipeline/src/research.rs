//! Query building and result filtering for the collect phase

use kaizen_types::{ResearchOutput, SearchHints, SearchResponse, SearchResult};
use tracing::debug;

/// Summary used when the search engine returned no synthesized answer
pub const NO_SUMMARY: &str = "No summary available.";

/// `<keywords> <focus areas> <year>`, space separated
pub fn build_query(hints: &SearchHints, year: i32) -> String {
    format!(
        "{} {} {}",
        hints.primary_keywords.join(" "),
        hints.focus_areas.join(" "),
        year
    )
}

/// Drop results mentioning any excluded term, keeping their order
pub fn filter_sources(results: Vec<SearchResult>, exclude_terms: &[String]) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|result| {
            let excluded = result.mentions_any(exclude_terms);
            if excluded {
                debug!("Excluding result '{}' ({})", result.title, result.url);
            }
            !excluded
        })
        .collect()
}

/// Turn a raw search response into the collect phase's output
pub fn into_research_output(
    response: SearchResponse,
    hints: &SearchHints,
    query: String,
) -> ResearchOutput {
    ResearchOutput {
        sources: filter_sources(response.results, &hints.exclude_terms),
        summary: response.answer.unwrap_or_else(|| NO_SUMMARY.to_string()),
        search_query: query,
    }
}
