//! Local documentation gathering
//!
//! Resolves a domain's glob patterns under the content base directory and
//! concatenates the matching files into one prompt-ready block.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

/// Returned when no pattern matched a readable file
pub const NO_FILES_PLACEHOLDER: &str = "No matching files found.";

/// Separator placed between file sections
pub const FILE_SEPARATOR: &str = "\n\n---\n\n";

/// Read every file matching `patterns` under `base` into labeled sections.
///
/// Unreadable files (including non-UTF-8 files) are logged and skipped, as
/// are malformed patterns. Directories matched by a pattern are ignored.
pub fn read_target_files(patterns: &[String], base: &Path) -> String {
    let mut sections = Vec::new();

    for pattern in patterns {
        let full_pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&base.to_string_lossy()),
            pattern.trim_start_matches('/')
        );

        let paths = match glob::glob(&full_pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Invalid target pattern '{}': {}", pattern, e);
                continue;
            }
        };

        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Could not access {:?}: {}", e.path(), e.error());
                    continue;
                }
            };

            if !path.is_file() {
                continue;
            }

            match fs::read_to_string(&path) {
                Ok(content) => {
                    let relative = path.strip_prefix(base).unwrap_or(&path);
                    debug!("Read target file {:?} ({} bytes)", relative, content.len());
                    sections.push(format!("### File: {}\n\n{}", relative.display(), content));
                }
                Err(e) => {
                    warn!("Could not read {:?}: {}", path, e);
                }
            }
        }
    }

    info!("Gathered {} target files", sections.len());

    if sections.is_empty() {
        NO_FILES_PLACEHOLDER.to_string()
    } else {
        sections.join(FILE_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_read_target_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test.md"), "# Test content").unwrap();
        fs::write(dir.path().join("other.md"), "# Other content").unwrap();
        fs::write(dir.path().join("ignored.txt"), "nope").unwrap();

        let result = read_target_files(&patterns(&["*.md"]), dir.path());

        assert!(result.contains("### File: test.md\n\n# Test content"));
        assert!(result.contains("### File: other.md\n\n# Other content"));
        assert!(result.contains(FILE_SEPARATOR));
        assert!(!result.contains("nope"));
    }

    #[test]
    fn test_recursive_pattern_uses_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("skills").join("docs");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("SKILL.md"), "skill body").unwrap();

        let result = read_target_files(&patterns(&["**/SKILL.md"]), dir.path());

        let expected = Path::new("skills").join("docs").join("SKILL.md");
        assert!(result.starts_with(&format!("### File: {}", expected.display())));
        assert!(result.ends_with("skill body"));
    }

    #[test]
    fn test_read_target_files_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_target_files(&patterns(&["*.nonexistent"]), dir.path());
        assert_eq!(result, NO_FILES_PLACEHOLDER);
    }

    #[test]
    fn test_no_patterns() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_target_files(&[], dir.path()), NO_FILES_PLACEHOLDER);
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.md"), "fine").unwrap();
        fs::write(dir.path().join("bad.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let result = read_target_files(&patterns(&["*.md"]), dir.path());

        assert!(result.contains("### File: good.md"));
        assert!(!result.contains("bad.md"));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "a").unwrap();

        let result = read_target_files(&patterns(&["[", "*.md"]), dir.path());
        assert!(result.contains("### File: a.md"));
    }
}
