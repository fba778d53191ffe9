//! Integration Test: Panic Prohibition
//!
//! **Policy**: Production code propagates errors. `unwrap()`, `expect()` and
//! `panic!` are reserved for tests.

use std::fs;

use architectural_enforcement::{production_files, production_lines, Violation};

const FORBIDDEN: &[(&str, &str)] = &[
    (".unwrap()", "unwrap"),
    (".expect(", "expect"),
    ("panic!(", "panic"),
    ("unimplemented!(", "unimplemented"),
    ("todo!(", "todo"),
];

fn find_panic_violations() -> Vec<Violation> {
    let mut violations = Vec::new();

    for path in production_files() {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };

        for (line_number, code) in production_lines(&content) {
            for (pattern, kind) in FORBIDDEN {
                if code.contains(pattern) {
                    violations.push(Violation {
                        path: path.clone(),
                        line_number,
                        kind,
                        line: code.trim().to_string(),
                    });
                }
            }
        }
    }

    violations
}

#[test]
fn test_no_panics_in_production_code() {
    let violations = find_panic_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ Panicking calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Return a Result and use `?`, or handle the None/Err case.");

        panic!(
            "\nFound {} panicking call(s) in production code.",
            violations.len()
        );
    }
}
