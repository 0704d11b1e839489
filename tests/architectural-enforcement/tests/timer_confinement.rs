//! Integration Test: Timer Confinement
//!
//! **Policy**: every suspension of a run goes through the pacing module, so
//! the run-epoch check around it cannot be skipped. Nothing in the engine
//! or the headless driver may sleep on a thread.

use std::path::Path;

use architectural_enforcement::{assert_clean, rust_files, scan};

const ENGINE_SRC: &str = "visualizer/core/src";
const PACING: &str = "playback/pacing.rs";

fn is_timer(code: &str) -> bool {
    ["::sleep(", "sleep_until(", "::interval(", "::timeout("]
        .iter()
        .any(|pattern| code.contains(pattern))
}

#[test]
fn test_engine_exists() {
    assert!(
        !rust_files(ENGINE_SRC).is_empty(),
        "no sources found under {ENGINE_SRC}"
    );
}

#[test]
fn test_timers_only_in_pacing() {
    let violations = scan(ENGINE_SRC, is_timer, |file, _| file == Path::new(PACING));
    assert_clean(
        "Timers belong in playback/pacing.rs; suspend through StepContext::pause",
        &violations,
    );
}

#[test]
fn test_pacing_has_a_timer() {
    let violations = scan(ENGINE_SRC, is_timer, |file, _| file != Path::new(PACING));
    assert!(
        !violations.is_empty(),
        "pacing.rs no longer waits; update this test with the new timer location"
    );
}

#[test]
fn test_no_thread_sleep() {
    for dir in [ENGINE_SRC, "visualizer/headless/src"] {
        let violations = scan(dir, |code| code.contains("thread::sleep"), |_, _| false);
        assert_clean("Blocking sleeps stall the runtime", &violations);
    }
}
