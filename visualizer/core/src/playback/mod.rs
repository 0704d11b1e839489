//! Playback Scheduler
//!
//! Drives generator output onto a timeline. Owns the run epoch, the event
//! cursor of precomputed runs, and pacing.
//!
//! # Design Philosophy
//!
//! A run is identified by a [`RunToken`] holding the epoch it was started
//! under. Reset bumps the epoch. Every continuation of a run (a timer
//! firing, a traversal resuming after a beat) compares its token against
//! the stage's epoch while holding the stage lock, and gives up if they
//! differ. A superseded run therefore cannot apply a mutation, no matter
//! how its timers interleave with the new run.
//!
//! ```text
//!   idle ──play──▶ running ──completion──▶ idle
//!    │  ▲             │
//!    │  └───reset─────┘
//!    └─step──▶ stepping ──reset / last step──▶ idle
//! ```

pub mod context;
pub mod cursor;
pub mod pacing;
pub mod stage;

pub use context::{Cancelled, Publisher, StepContext};
pub use cursor::EventCursor;
pub use pacing::{Beat, Pacing, LEAD_IN};
pub use stage::{Counters, ModeInputs, SharedStage, Stage};

use serde::{Deserialize, Serialize};

/// Scheduler state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing is playing
    #[default]
    Idle,
    /// A run is in progress
    Running,
    /// A precomputed sequence is being stepped by hand
    Stepping,
}

/// Identity of one run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunToken {
    epoch: u64,
}

impl RunToken {
    pub(crate) fn new(epoch: u64) -> Self {
        Self { epoch }
    }

    /// Epoch the run was started under
    #[must_use]
    pub fn epoch(self) -> u64 {
        self.epoch
    }
}

/// Playback speed, 1 (slowest) to 100 (fastest)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Speed(u8);

impl Speed {
    /// Slowest speed
    pub const MIN: Self = Self(1);
    /// Fastest speed
    pub const MAX: Self = Self(100);

    /// Clamp any value into 1..=100
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self(u8::try_from(value.clamp(1, 100)).unwrap_or(Self::MAX.0))
    }

    /// Numeric value
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self(50)
    }
}
