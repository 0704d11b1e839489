//! Per-family pacing.
//!
//! This is the only module in the engine that touches the timer.

use std::time::Duration;

use super::Speed;
use crate::generators::Mode;

/// Fixed pause between the reset that starts a cooperative run and its
/// first transition
pub const LEAD_IN: Duration = Duration::from_millis(100);

/// Length of a suspension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Beat {
    /// After a primary transition
    Full,
    /// After a secondary transition (half of a full beat)
    Half,
}

/// Maps speed to delay: `max(floor, base - speed * rate)` milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    base_ms: u64,
    rate_ms: u64,
    floor_ms: u64,
}

impl Pacing {
    /// Precomputed sort playback
    pub const SORTING: Self = Self::new(505, 5, 5);
    /// Graph searches
    pub const GRAPH: Self = Self::new(1000, 9, 100);
    /// Tree traversals
    pub const TREE: Self = Self::new(1000, 9, 100);
    /// Recursion visualizations
    pub const RECURSION: Self = Self::new(800, 7, 100);

    /// Custom pacing
    #[must_use]
    pub const fn new(base_ms: u64, rate_ms: u64, floor_ms: u64) -> Self {
        Self {
            base_ms,
            rate_ms,
            floor_ms,
        }
    }

    /// Pacing used by a mode
    #[must_use]
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Sorting => Self::SORTING,
            Mode::Graph => Self::GRAPH,
            Mode::Tree => Self::TREE,
            Mode::Recursion => Self::RECURSION,
        }
    }

    /// Delay of one full beat at `speed`
    #[must_use]
    pub fn delay(self, speed: Speed) -> Duration {
        let slowdown = u64::from(speed.get()) * self.rate_ms;
        let ms = self.base_ms.saturating_sub(slowdown).max(self.floor_ms);
        Duration::from_millis(ms)
    }

    /// Delay of `beat` at `speed`
    #[must_use]
    pub fn beat(self, speed: Speed, beat: Beat) -> Duration {
        match beat {
            Beat::Full => self.delay(speed),
            Beat::Half => self.delay(speed) / 2,
        }
    }
}

/// Suspend the current task for `duration`
pub(crate) async fn wait(duration: Duration) {
    tokio::time::sleep(duration).await;
}
