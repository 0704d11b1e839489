//! Precomputed sort events.
//!
//! Every generator works on a private copy of the input and returns the
//! events a person would narrate while sorting by hand. Same input, same
//! events.

use serde::{Deserialize, Serialize};

use super::SortAlgorithm;

/// One semantic transition of a comparison sort
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SortEvent {
    /// Positions `i` and `j` are compared
    Compare {
        /// Left operand
        i: usize,
        /// Right operand
        j: usize,
    },
    /// Positions `i` and `j` are exchanged
    Swap {
        /// First position
        i: usize,
        /// Second position
        j: usize,
    },
    /// The element at `index` is the partition pivot
    PivotMarked {
        /// Pivot position
        index: usize,
    },
    /// The element at `index` is in its final position
    SortedMarked {
        /// Settled position
        index: usize,
    },
}

/// A pure event generator
pub type SortGenerator = fn(&[u32]) -> Vec<SortEvent>;

impl SortAlgorithm {
    /// Generator for this algorithm
    ///
    /// `Merge` is a reserved identifier and has no generator yet.
    #[must_use]
    pub fn generator(self) -> Option<SortGenerator> {
        match self {
            Self::Bubble => Some(bubble),
            Self::Selection => Some(selection),
            Self::Insertion => Some(insertion),
            Self::Quick => Some(quick),
            Self::Merge => None,
        }
    }
}

/// Exchange sort
///
/// Pass `p` compares every adjacent pair up to `n - 2 - p`, swapping
/// out-of-order pairs, then settles position `n - 1 - p`. Position 0 is
/// settled last. An empty input yields no events.
#[must_use]
pub fn bubble(values: &[u32]) -> Vec<SortEvent> {
    let mut a = values.to_vec();
    let n = a.len();
    let mut events = Vec::new();
    if n == 0 {
        return events;
    }

    for p in 0..n - 1 {
        for k in 0..n - 1 - p {
            events.push(SortEvent::Compare { i: k, j: k + 1 });
            if a[k] > a[k + 1] {
                events.push(SortEvent::Swap { i: k, j: k + 1 });
                a.swap(k, k + 1);
            }
        }
        events.push(SortEvent::SortedMarked { index: n - 1 - p });
    }
    events.push(SortEvent::SortedMarked { index: 0 });
    events
}

/// Selection sort: one scan per position, at most one swap per pass
#[must_use]
pub fn selection(values: &[u32]) -> Vec<SortEvent> {
    let mut a = values.to_vec();
    let n = a.len();
    let mut events = Vec::new();

    for i in 0..n {
        let mut min = i;
        for j in i + 1..n {
            events.push(SortEvent::Compare { i: min, j });
            if a[j] < a[min] {
                min = j;
            }
        }
        if min != i {
            events.push(SortEvent::Swap { i, j: min });
            a.swap(i, min);
        }
        events.push(SortEvent::SortedMarked { index: i });
    }
    events
}

/// Insertion sort: sink each element left while its left neighbor is
/// greater
#[must_use]
pub fn insertion(values: &[u32]) -> Vec<SortEvent> {
    let mut a = values.to_vec();
    let n = a.len();
    let mut events = Vec::new();

    for i in 1..n {
        let mut j = i;
        while j > 0 {
            events.push(SortEvent::Compare { i: j - 1, j });
            if a[j - 1] <= a[j] {
                break;
            }
            events.push(SortEvent::Swap { i: j - 1, j });
            a.swap(j - 1, j);
            j -= 1;
        }
    }
    events.extend((0..n).map(|index| SortEvent::SortedMarked { index }));
    events
}

/// Quicksort with Lomuto partitioning around the last element
#[must_use]
pub fn quick(values: &[u32]) -> Vec<SortEvent> {
    let mut a = values.to_vec();
    let mut events = Vec::new();
    // Half-open ranges still to partition
    let mut pending = vec![(0, a.len())];

    while let Some((lo, hi)) = pending.pop() {
        match hi.saturating_sub(lo) {
            0 => continue,
            1 => {
                events.push(SortEvent::SortedMarked { index: lo });
                continue;
            }
            _ => {}
        }

        let pivot = hi - 1;
        events.push(SortEvent::PivotMarked { index: pivot });
        let mut store = lo;
        for j in lo..pivot {
            events.push(SortEvent::Compare { i: j, j: pivot });
            if a[j] < a[pivot] {
                if store != j {
                    events.push(SortEvent::Swap { i: store, j });
                    a.swap(store, j);
                }
                store += 1;
            }
        }
        if store != pivot {
            events.push(SortEvent::Swap { i: store, j: pivot });
            a.swap(store, pivot);
        }
        events.push(SortEvent::SortedMarked { index: store });

        // Left range is popped first
        pending.push((store + 1, hi));
        pending.push((lo, store));
    }
    events
}

/// Apply the swaps of `events` to a copy of `values`
#[must_use]
pub fn replay(values: &[u32], events: &[SortEvent]) -> Vec<u32> {
    let mut a = values.to_vec();
    for event in events {
        if let SortEvent::Swap { i, j } = *event {
            if i < a.len() && j < a.len() {
                a.swap(i, j);
            }
        }
    }
    a
}
