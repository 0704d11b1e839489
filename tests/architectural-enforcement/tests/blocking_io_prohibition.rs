//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: the engine library performs no blocking I/O and spawns no
//! threads or processes. Configuration loading reads its file once, before
//! the engine exists, and is the single exception.

use std::path::Path;

use architectural_enforcement::{assert_clean, scan};

const ENGINE_SRC: &str = "visualizer/core/src";

const FORBIDDEN: &[&str] = &[
    "std::fs::",
    "std::net::",
    "std::process::",
    "std::thread::",
    "std::io::stdin",
    "std::io::stdout",
    "println!(",
    "eprintln!(",
];

fn is_blocking(code: &str) -> bool {
    FORBIDDEN.iter().any(|pattern| code.contains(pattern))
}

#[test]
fn test_no_blocking_io_in_engine() {
    let violations = scan(ENGINE_SRC, is_blocking, |file, code| {
        file == Path::new("config/mod.rs") && code.contains("std::fs::read_to_string")
    });
    assert_clean(
        "The engine must not block; renderers do their own I/O",
        &violations,
    );
}

#[test]
fn test_no_std_mutex_in_engine() {
    let violations = scan(
        ENGINE_SRC,
        |code| code.contains("std::sync::Mutex") || code.contains("std::sync::RwLock"),
        |_, _| false,
    );
    assert_clean("Shared state uses parking_lot locks", &violations);
}
