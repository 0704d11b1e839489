//! Array bars for the sorting visualizations.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Visual state of one array bar
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarState {
    /// Resting state
    #[default]
    Default,
    /// Part of the pair being compared
    Comparing,
    /// Part of the pair being exchanged
    Swapping,
    /// Known to be in its final position
    Sorted,
    /// Current partition pivot
    Pivot,
}

/// Role pointer drawn above a bar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerRole {
    /// Left-hand operand of a comparison
    Primary,
    /// Right-hand operand of a comparison
    Secondary,
    /// Pivot element
    Pivot,
}

impl PointerRole {
    /// Label shown above the bar
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "I",
            Self::Secondary => "J",
            Self::Pivot => "PIVOT",
        }
    }
}

/// One array element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Positive value, drawn as the bar's height
    pub value: u32,
    /// Current visual state
    pub state: BarState,
    /// Optional role pointer
    pub pointer: Option<PointerRole>,
}

impl Bar {
    /// Create an untagged bar
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self {
            value,
            state: BarState::Default,
            pointer: None,
        }
    }
}

/// Shape of a randomly generated demo array
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArraySpec {
    /// Number of bars
    pub size: usize,
    /// Smallest value (inclusive)
    pub min_value: u32,
    /// Largest value (inclusive)
    pub max_value: u32,
}

impl ArraySpec {
    /// Smallest array the engine will build
    pub const MIN_SIZE: usize = 2;
    /// Largest array the engine will build
    pub const MAX_SIZE: usize = 100;
}

impl Default for ArraySpec {
    fn default() -> Self {
        Self {
            size: 40,
            min_value: 5,
            max_value: 104,
        }
    }
}

/// The array of bars for one sorting visualization
///
/// The bar count is fixed once built. Shuffling replaces the whole set with
/// a new one rather than editing values in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bars {
    bars: Vec<Bar>,
}

impl Bars {
    /// Build from explicit values
    #[must_use]
    pub fn from_values(values: &[u32]) -> Self {
        Self {
            bars: values.iter().copied().map(Bar::new).collect(),
        }
    }

    /// Build a random array following `spec`
    pub fn random<R: Rng + ?Sized>(rng: &mut R, spec: &ArraySpec) -> Self {
        let (lo, hi) = if spec.min_value <= spec.max_value {
            (spec.min_value.max(1), spec.max_value.max(1))
        } else {
            (spec.max_value.max(1), spec.min_value.max(1))
        };
        let values: Vec<u32> = (0..spec.size).map(|_| rng.gen_range(lo..=hi)).collect();
        Self::from_values(&values)
    }

    /// All bars in order
    #[must_use]
    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    /// Current values in order
    #[must_use]
    pub fn values(&self) -> Vec<u32> {
        self.bars.iter().map(|b| b.value).collect()
    }

    /// Number of bars
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether there are no bars
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Largest value in the set (0 when empty)
    #[must_use]
    pub fn max_value(&self) -> u32 {
        self.bars.iter().map(|b| b.value).max().unwrap_or(0)
    }

    /// Return every bar to `default` with no pointer
    pub fn clear_tags(&mut self) {
        for bar in &mut self.bars {
            bar.state = BarState::Default;
            bar.pointer = None;
        }
    }

    /// Tag one bar; out-of-range indices are ignored
    pub fn tag(&mut self, index: usize, state: BarState, pointer: Option<PointerRole>) {
        if let Some(bar) = self.bars.get_mut(index) {
            bar.state = state;
            bar.pointer = pointer;
        }
    }

    /// Exchange two bars (values and tags travel together)
    pub fn swap(&mut self, i: usize, j: usize) {
        if i < self.bars.len() && j < self.bars.len() {
            self.bars.swap(i, j);
        }
    }
}
