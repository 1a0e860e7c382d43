//! Second-level markdown section parsing
//!
//! The model is asked for a fixed set of `## ` sections. This splits its
//! reply on those headers so individual sections can be pulled out. A
//! missing section is an empty string, never an error.

/// Marker that opens a second-level header line
const HEADER_MARKER: &str = "## ";

/// A markdown document split into its `## ` sections, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkdownSections {
    sections: Vec<(String, String)>,
}

impl MarkdownSections {
    /// Split `text` on lines that start with `## `.
    ///
    /// Text before the first header is dropped. Lines inside fenced code
    /// blocks never start a section.
    pub fn parse(text: &str) -> Self {
        let mut sections = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;
        let mut in_fence = false;

        for line in text.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
            }

            if !in_fence {
                if let Some(header) = line.strip_prefix(HEADER_MARKER) {
                    if let Some((name, body)) = current.take() {
                        sections.push((name, join_body(&body)));
                    }
                    current = Some((header.trim().to_string(), Vec::new()));
                    continue;
                }
            }

            if let Some((_, body)) = current.as_mut() {
                body.push(line);
            }
        }

        if let Some((name, body)) = current {
            sections.push((name, join_body(&body)));
        }

        Self { sections }
    }

    /// Body of the first section whose header matches `name`.
    ///
    /// Matching ignores ASCII case and a trailing colon.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(header, _)| header_matches(header, name))
            .map(|(_, body)| body.as_str())
    }

    /// Header names in document order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(header, _)| header.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn join_body(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

fn header_matches(header: &str, name: &str) -> bool {
    header
        .trim_end_matches(':')
        .trim()
        .eq_ignore_ascii_case(name.trim())
}

/// Body of section `name` in `text`, or an empty string if it is absent
pub fn extract_section(text: &str, name: &str) -> String {
    MarkdownSections::parse(text)
        .get(name)
        .map(str::to_string)
        .unwrap_or_default()
}
