//! The stage: everything a run reads or writes, behind one lock.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{EventCursor, Pacing, Phase, RunToken, Speed};
use crate::entities::{ArraySpec, BarState, EntityModel, PointerRole};
use crate::generators::{Algorithm, SortEvent};

/// Stage shared between the engine and its run task
pub type SharedStage = Arc<Mutex<Stage>>;

/// Counters shown next to a sorting visualization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// `Compare` events applied
    pub comparisons: u64,
    /// `Swap` events applied
    pub swaps: u64,
}

/// Numeric inputs of the modes that take one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeInputs {
    /// Key looked up by the tree search
    pub search_key: i64,
    /// Argument of the root recursive call
    pub recursion: u32,
}

impl ModeInputs {
    /// Smallest tree search key
    pub const SEARCH_KEY_MIN: i64 = 0;
    /// Largest tree search key
    pub const SEARCH_KEY_MAX: i64 = 999;
}

impl Default for ModeInputs {
    fn default() -> Self {
        Self {
            search_key: 45,
            recursion: 5,
        }
    }
}

/// Engine-owned state
///
/// Only the engine and the run it spawned hold the lock, and neither holds
/// it across a suspension.
#[derive(Debug)]
pub struct Stage {
    /// Entities being animated
    pub model: EntityModel,
    /// Selected algorithm
    pub algorithm: Algorithm,
    /// Scheduler state
    pub phase: Phase,
    /// Playback speed
    pub speed: Speed,
    /// Shape of the sorting array
    pub array: ArraySpec,
    /// Per-mode numeric inputs
    pub inputs: ModeInputs,
    /// Cursor of the current precomputed sequence
    pub cursor: Option<EventCursor>,
    /// Most recently applied sort event
    pub last_event: Option<SortEvent>,
    /// Sorting counters
    pub counters: Counters,
    /// Entity mutations applied since the engine was built
    pub mutations: u64,
    epoch: u64,
}

impl Stage {
    /// New idle stage
    #[must_use]
    pub fn new(
        model: EntityModel,
        algorithm: Algorithm,
        speed: Speed,
        array: ArraySpec,
        inputs: ModeInputs,
    ) -> Self {
        Self {
            model,
            algorithm,
            phase: Phase::Idle,
            speed,
            array,
            inputs,
            cursor: None,
            last_event: None,
            counters: Counters::default(),
            mutations: 0,
            epoch: 0,
        }
    }

    /// Current run epoch
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether `token` belongs to the current run
    #[must_use]
    pub fn is_current(&self, token: RunToken) -> bool {
        token.epoch() == self.epoch
    }

    /// Pacing of the selected algorithm's mode
    #[must_use]
    pub fn pacing(&self) -> Pacing {
        Pacing::for_mode(self.algorithm.mode())
    }

    /// Invalidate the previous run and start a new one
    ///
    /// Restores resting visual state and clears counters and cursor; the
    /// caller installs a fresh cursor for precomputed runs.
    pub fn begin_run(&mut self) -> RunToken {
        self.reset();
        self.phase = Phase::Running;
        RunToken::new(self.epoch)
    }

    /// Invalidate any run and return to idle with resting visual state
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.phase = Phase::Idle;
        self.cursor = None;
        self.last_event = None;
        self.counters = Counters::default();
        self.model.reset_visual_state();
    }

    /// Apply the event at the cursor and move past it
    pub fn advance_cursor(&mut self) -> Option<SortEvent> {
        let event = self.cursor.as_mut()?.advance()?;
        self.apply_sort_event(event);
        Some(event)
    }

    /// Apply one sort event to the bars
    ///
    /// Every bar returns to `default` first, so only the event's own
    /// positions are highlighted afterwards.
    pub fn apply_sort_event(&mut self, event: SortEvent) {
        let bars = &mut self.model.bars;
        bars.clear_tags();
        match event {
            SortEvent::Compare { i, j } => {
                bars.tag(i, BarState::Comparing, Some(PointerRole::Primary));
                bars.tag(j, BarState::Comparing, Some(PointerRole::Secondary));
                self.counters.comparisons += 1;
            }
            SortEvent::Swap { i, j } => {
                bars.tag(i, BarState::Swapping, None);
                bars.tag(j, BarState::Swapping, None);
                bars.swap(i, j);
                self.counters.swaps += 1;
            }
            SortEvent::SortedMarked { index } => {
                bars.tag(index, BarState::Sorted, None);
            }
            SortEvent::PivotMarked { index } => {
                bars.tag(index, BarState::Pivot, Some(PointerRole::Pivot));
            }
        }
        self.last_event = Some(event);
        self.mutations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Bars;
    use crate::generators::SortAlgorithm;

    fn stage_with(values: &[u32]) -> Stage {
        let mut model = EntityModel::default();
        model.bars = Bars::from_values(values);
        Stage::new(
            model,
            Algorithm::Sort(SortAlgorithm::Bubble),
            Speed::default(),
            ArraySpec::default(),
            ModeInputs::default(),
        )
    }

    #[test]
    fn test_compare_tags_and_counts() {
        let mut stage = stage_with(&[3, 1, 2]);
        stage.apply_sort_event(SortEvent::Compare { i: 0, j: 1 });

        let bars = stage.model.bars.as_slice();
        assert_eq!(bars[0].state, BarState::Comparing);
        assert_eq!(bars[0].pointer, Some(PointerRole::Primary));
        assert_eq!(bars[1].pointer, Some(PointerRole::Secondary));
        assert_eq!(bars[2].state, BarState::Default);
        assert_eq!(stage.counters.comparisons, 1);
        assert_eq!(stage.mutations, 1);
    }

    #[test]
    fn test_swap_clears_previous_tags() {
        let mut stage = stage_with(&[3, 1, 2]);
        stage.apply_sort_event(SortEvent::SortedMarked { index: 2 });
        stage.apply_sort_event(SortEvent::Swap { i: 0, j: 1 });

        assert_eq!(stage.model.bars.values(), vec![1, 3, 2]);
        let bars = stage.model.bars.as_slice();
        assert_eq!(bars[0].state, BarState::Swapping);
        assert_eq!(bars[2].state, BarState::Default);
        assert_eq!(stage.counters.swaps, 1);
        assert_eq!(stage.last_event, Some(SortEvent::Swap { i: 0, j: 1 }));
    }

    #[test]
    fn test_pivot_tag() {
        let mut stage = stage_with(&[3, 1, 2]);
        stage.apply_sort_event(SortEvent::PivotMarked { index: 2 });
        let bar = stage.model.bars.as_slice()[2];
        assert_eq!(bar.state, BarState::Pivot);
        assert_eq!(bar.pointer.map(PointerRole::label), Some("PIVOT"));
    }

    #[test]
    fn test_begin_run_supersedes_previous_token() {
        let mut stage = stage_with(&[2, 1]);
        let first = stage.begin_run();
        assert!(stage.is_current(first));
        assert_eq!(stage.phase, Phase::Running);

        let second = stage.begin_run();
        assert!(!stage.is_current(first));
        assert!(stage.is_current(second));

        stage.reset();
        assert!(!stage.is_current(second));
        assert_eq!(stage.phase, Phase::Idle);
    }

    #[test]
    fn test_advance_cursor_walks_sequence() {
        let mut stage = stage_with(&[2, 1]);
        stage.cursor = Some(EventCursor::new(vec![
            SortEvent::Compare { i: 0, j: 1 },
            SortEvent::Swap { i: 0, j: 1 },
        ]));
        assert!(stage.advance_cursor().is_some());
        assert!(stage.advance_cursor().is_some());
        assert!(stage.advance_cursor().is_none());
        assert_eq!(stage.model.bars.values(), vec![1, 2]);
        assert_eq!(stage.mutations, 2);
    }
}
