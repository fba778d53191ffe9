//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles
//! over the newsdesk crates:
//! - No blocking I/O inside async functions
//! - No panicking shortcuts (`unwrap`/`expect`) in production code
//!
//! The helpers here do line-level scanning, not parsing. Production code is
//! everything in a file before its `#[cfg(test)]` module.

use std::path::{Path, PathBuf};

/// Source directories holding production code, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["newsdesk/core/src", "newsdesk/cli/src"];

/// A rule violation found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File the violation was found in
    pub path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// Short category of the violation
    pub kind: &'static str,
    /// The offending line, trimmed
    pub line: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line_number,
            self.kind,
            self.line
        )
    }
}

/// Workspace root, two levels above this package
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under the production directories
#[must_use]
pub fn production_files() -> Vec<PathBuf> {
    let root = workspace_root();
    let mut files = Vec::new();

    for dir in PRODUCTION_DIRS {
        let path = root.join(dir);
        if !path.exists() {
            continue;
        }
        for entry in walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(Result::ok)
        {
            if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files
}

/// Lines of `content` that belong to production code
///
/// Stops at the first `#[cfg(test)]`. Comment-only lines are skipped and
/// trailing `//` comments are cut off.
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .filter_map(|(idx, line)| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") {
                return None;
            }
            Some((idx + 1, code_part(line)))
        })
        .collect()
}

/// `line` without a trailing `//` comment
///
/// A `//` inside a string literal such as a URL also cuts the line, which
/// only ever hides code from the scan.
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Whether the nearest function header at or above `idx` is `async`
#[must_use]
pub fn is_in_async_function(lines: &[(usize, &str)], idx: usize) -> bool {
    for (_, line) in lines[..=idx].iter().rev() {
        let line = line.trim();
        if line.starts_with("fn ") || line.contains(" fn ") {
            return line.contains("async fn");
        }
        if line.starts_with("impl ") || line.starts_with("mod ") {
            return false;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let source = "fn a() {}\n// note\nfn b() {} // trailing\n#[cfg(test)]\nmod tests {}\n";
        let lines = production_lines(source);

        assert_eq!(lines, vec![(1, "fn a() {}"), (3, "fn b() {} ")]);
    }

    #[test]
    fn test_async_detection() {
        let source = "pub async fn run() {\n    work();\n}\nfn sync() {\n    work();\n}\n";
        let lines = production_lines(source);

        assert!(is_in_async_function(&lines, 1));
        assert!(!is_in_async_function(&lines, 4));
    }

    #[test]
    fn test_production_files_are_found() {
        let files = production_files();
        assert!(files.iter().any(|p| p.ends_with("newsdesk/core/src/lib.rs")));
        assert!(files.iter().any(|p| p.ends_with("newsdesk/cli/src/main.rs")));
    }
}
