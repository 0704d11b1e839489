//! Engine Errors
//!
//! Configuration errors reported synchronously by the engine. A rejected
//! intent never starts a run and never changes the engine's phase.
//!
//! Concurrent-start rejection and stale continuations are not errors: the
//! former is reported as an ignored intent, the latter is suppressed inside
//! the playback layer and never surfaces.

use thiserror::Error;

use crate::generators::{Mode, SortAlgorithm};

/// Errors returned by engine intents
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The algorithm identifier is not part of any family's enumeration
    #[error("unknown algorithm identifier: {0:?}")]
    UnknownAlgorithm(String),

    /// The identifier is reserved but no generator is registered for it
    #[error("no step generator is available for {0}")]
    GeneratorUnavailable(SortAlgorithm),

    /// An input value is outside the range accepted for the active mode
    #[error("input {value} is out of range for {mode} (expected {min}..={max})")]
    InputOutOfRange {
        /// Visualization mode the input was meant for
        mode: Mode,
        /// Rejected value
        value: i64,
        /// Smallest accepted value
        min: i64,
        /// Largest accepted value
        max: i64,
    },

    /// The active mode takes no numeric input
    #[error("{0} does not take a numeric input")]
    InputNotApplicable(Mode),

    /// A graph endpoint names a node that does not exist
    #[error("unknown graph node: {0:?}")]
    UnknownNode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::UnknownAlgorithm("bogo".to_string());
        assert_eq!(err.to_string(), "unknown algorithm identifier: \"bogo\"");

        let err = EngineError::InputOutOfRange {
            mode: Mode::Recursion,
            value: 12,
            min: 1,
            max: 7,
        };
        assert_eq!(
            err.to_string(),
            "input 12 is out of range for recursion (expected 1..=7)"
        );

        let err = EngineError::GeneratorUnavailable(SortAlgorithm::Merge);
        assert_eq!(err.to_string(), "no step generator is available for merge");
    }
}
