//! Renderer Intents
//!
//! Intents sent from a renderer to the engine. These are the only ways a
//! renderer can influence playback.
//!
//! # Design Philosophy
//!
//! Renderers report what the user asked for; they don't decide whether it
//! is allowed. The engine answers every intent with an [`Outcome`]: either
//! it took effect, or it was ignored for a stated reason. Intents are never
//! queued for later.

use serde::{Deserialize, Serialize};

/// Intents from a renderer to the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    // ============================================
    // Timeline
    // ============================================
    /// Start a run of the selected algorithm
    Play,

    /// Stop the run (same as reset; runs cannot be resumed)
    Pause,

    /// Stop any run and restore resting visual state
    Reset,

    /// Apply the next precomputed event
    StepForward,

    /// Move the cursor back one event
    StepBack,

    // ============================================
    // Configuration
    // ============================================
    /// Change playback speed (1..=100, clamped)
    SetSpeed {
        /// Requested speed
        speed: i64,
    },

    /// Select an algorithm by identifier
    SetAlgorithm {
        /// Algorithm identifier, e.g. `dijkstra`
        id: String,
    },

    /// Set the active mode's numeric input
    SetInput {
        /// Requested value
        value: i64,
    },

    /// Move the graph search endpoints
    SetEndpoints {
        /// Source node id
        start: String,
        /// Destination node id
        end: String,
    },

    /// Draw a fresh array (sorting) or rebuild the demo entities
    Shuffle,

    /// Same as [`Intent::Shuffle`]
    Regenerate,
}

impl Intent {
    /// Short name used in logs and [`crate::EngineMessage::IntentIgnored`]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Reset => "reset",
            Self::StepForward => "step_forward",
            Self::StepBack => "step_back",
            Self::SetSpeed { .. } => "set_speed",
            Self::SetAlgorithm { .. } => "set_algorithm",
            Self::SetInput { .. } => "set_input",
            Self::SetEndpoints { .. } => "set_endpoints",
            Self::Shuffle => "shuffle",
            Self::Regenerate => "regenerate",
        }
    }
}

/// Result of an intent that was not a configuration error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The intent took effect
    Applied,
    /// The intent was dropped
    Ignored(IgnoreReason),
}

impl Outcome {
    /// Whether the intent took effect
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Why an intent was dropped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Play while a run is in progress
    AlreadyRunning,
    /// An idle-only intent arrived while a run is in progress
    Busy,
    /// Stepping was requested for a cooperative algorithm
    NotSteppable,
    /// Step forward at the end of the sequence
    CursorAtEnd,
    /// Step back at the start of the sequence
    CursorAtStart,
}

impl IgnoreReason {
    /// Human-readable description
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::AlreadyRunning => "a run is already in progress",
            Self::Busy => "only reset is accepted while running",
            Self::NotSteppable => "this algorithm cannot be stepped",
            Self::CursorAtEnd => "already at the last step",
            Self::CursorAtStart => "already at the first step",
        }
    }
}
