//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async functions in newsdesk production code MUST NOT block the
//! runtime thread.
//! **Required**: Use `tokio::fs`, `tokio::net`, `tokio::time::sleep` and async
//! `reqwest`, not their `std` or blocking counterparts.
//!
//! Blocking calls in synchronous functions (config loading before the
//! runtime serves requests) and in test code are acceptable.

use std::fs;

use architectural_enforcement::{
    is_in_async_function, production_files, production_lines, Violation,
};

/// Patterns that block wherever they appear in an async function
const BLOCKING_IN_ASYNC: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::thread::sleep", "Blocking sleep"),
    ("std::io::stdin()", "Blocking stdin"),
    ("std::process::Command", "Blocking process I/O"),
];

/// Patterns that are never acceptable in production code
const BLOCKING_ANYWHERE: &[(&str, &str)] = &[
    ("reqwest::blocking", "Blocking HTTP client"),
    ("use std::net", "Blocking network import"),
    ("use std::fs", "Blocking file import"),
];

fn find_blocking_io_violations() -> Vec<Violation> {
    let mut violations = Vec::new();

    for path in production_files() {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let lines = production_lines(&content);

        for (idx, (line_number, code)) in lines.iter().enumerate() {
            let mut record = |kind: &'static str| {
                violations.push(Violation {
                    path: path.clone(),
                    line_number: *line_number,
                    kind,
                    line: code.trim().to_string(),
                });
            };

            for (pattern, kind) in BLOCKING_ANYWHERE {
                if code.contains(pattern) {
                    record(kind);
                }
            }

            if BLOCKING_IN_ASYNC.iter().any(|(p, _)| code.contains(p))
                && is_in_async_function(&lines, idx)
            {
                for (pattern, kind) in BLOCKING_IN_ASYNC {
                    if code.contains(pattern) {
                        record(kind);
                    }
                }
            }
        }
    }

    violations
}

/// Test that production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_production_code() {
    let violations = find_blocking_io_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Blocking I/O calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ REQUIRED async I/O:");
        eprintln!("  - tokio::fs::read().await, tokio::net::TcpListener::bind().await");
        eprintln!("  - tokio::time::sleep().await");
        eprintln!("  - reqwest::Client (async)");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// The scan must actually see the crates it guards
#[test]
fn test_scan_covers_both_crates() {
    let files = production_files();

    assert!(
        files.iter().any(|p| p.ends_with("backend/client.rs")),
        "generation client not scanned"
    );
    assert!(
        files.iter().any(|p| p.ends_with("server.rs")),
        "web surface not scanned"
    );
}
