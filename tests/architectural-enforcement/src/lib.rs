//! Architectural Enforcement Integration Tests
//!
//! Source-scanning tests that keep the engine's concurrency model honest:
//! - Timers only in the pacing module
//! - No blocking sleeps anywhere
//! - No blocking I/O in the engine, apart from configuration loading
//!
//! This library holds the scanning helpers shared by the tests.

use std::fs;
use std::path::{Path, PathBuf};

/// One offending line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File, relative to the workspace root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending code
    pub code: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.file.display(), self.line, self.code.trim())
    }
}

/// Workspace root, two levels above this package
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Production lines of a source file, numbered from 1
///
/// Line comments are stripped. Scanning stops at the first `#[cfg(test)]`;
/// test modules sit at the end of every file in this workspace.
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }
        if trimmed.starts_with("//") {
            continue;
        }
        let code = line.split("//").next().unwrap_or(line);
        lines.push((idx + 1, code.to_string()));
    }
    lines
}

/// Scan every file under `dir` for lines matching `forbidden`
///
/// `allowed` may exempt a (file, line) pair; the file path passed to it is
/// relative to `dir`.
pub fn scan(
    dir: &str,
    forbidden: impl Fn(&str) -> bool,
    allowed: impl Fn(&Path, &str) -> bool,
) -> Vec<Violation> {
    let base = workspace_root().join(dir);
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let relative = path.strip_prefix(&base).unwrap_or(&path).to_path_buf();
        for (line, code) in production_lines(&content) {
            if forbidden(&code) && !allowed(&relative, &code) {
                violations.push(Violation {
                    file: Path::new(dir).join(&relative),
                    line,
                    code,
                });
            }
        }
    }
    violations
}

/// Panic with every violation listed
pub fn assert_clean(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n{rule}\n");
    for violation in violations {
        eprintln!("  {violation}");
    }
    panic!("\nFound {} violation(s) of: {rule}", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let source = "fn a() {}\n// note\nlet x = 1; // trailing\n#[cfg(test)]\nmod tests {}\n";
        let lines = production_lines(source);
        assert_eq!(
            lines,
            vec![(1, "fn a() {}".to_string()), (3, "let x = 1; ".to_string())]
        );
    }

    #[test]
    fn test_workspace_root_holds_engine() {
        assert!(workspace_root().join("visualizer/core/src/lib.rs").exists());
    }
}
