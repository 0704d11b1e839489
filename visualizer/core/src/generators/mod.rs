//! Step Generators
//!
//! Algorithm identifiers and the algorithms that drive a visualization.
//!
//! # Design Philosophy
//!
//! Algorithms come in two families:
//!
//! - **Precomputed** ([`Family::Precomputed`]): comparison sorts. A pure
//!   function turns the input values into a finite [`SortEvent`] sequence up
//!   front, which is what makes the sequence steppable.
//! - **Cooperative** ([`Family::Cooperative`]): graph searches, tree
//!   traversals and recursion. These run as async procedures that mutate the
//!   shared entity model through a [`StepContext`] and suspend between
//!   transitions. Every suspension point is a cancellation checkpoint.
//!
//! [`StepContext`]: crate::playback::StepContext

pub mod graph;
pub mod recursion;
pub mod sorting;
pub mod tree;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub use sorting::{SortEvent, SortGenerator};

// ============================================
// Modes and families
// ============================================

/// Visualization mode, one per entity kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Array bars
    Sorting,
    /// Graph nodes and edges
    Graph,
    /// Binary search tree nodes
    Tree,
    /// Recursion call nodes
    Recursion,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sorting => "sorting",
            Self::Graph => "graph",
            Self::Tree => "tree",
            Self::Recursion => "recursion",
        })
    }
}

/// How an algorithm's events are produced
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Full event sequence computed before playback; steppable
    Precomputed,
    /// Live traversal that mutates entities as it runs
    Cooperative,
}

// ============================================
// Per-family identifiers
// ============================================

macro_rules! algorithm_ids {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $id:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every identifier of this family, in menu order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable string identifier
            #[must_use]
            pub fn id(self) -> &'static str {
                match self {
                    $(Self::$variant => $id,)+
                }
            }

            fn parse(id: &str) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }
    };
}

algorithm_ids! {
    /// Comparison sorts
    SortAlgorithm {
        /// Exchange sort
        Bubble => "bubble",
        /// Selection sort
        Selection => "selection",
        /// Insertion sort
        Insertion => "insertion",
        /// Merge sort (reserved, no generator)
        Merge => "merge",
        /// Quicksort with Lomuto partitioning
        Quick => "quick",
    }
}

algorithm_ids! {
    /// Graph searches
    GraphAlgorithm {
        /// Breadth-first search
        Bfs => "bfs",
        /// Depth-first search
        Dfs => "dfs",
        /// Dijkstra shortest path
        Dijkstra => "dijkstra",
    }
}

algorithm_ids! {
    /// Tree traversals
    TreeAlgorithm {
        /// Left, node, right
        Inorder => "inorder",
        /// Node, left, right
        Preorder => "preorder",
        /// Left, right, node
        Postorder => "postorder",
        /// Breadth-first by level
        Levelorder => "levelorder",
        /// Binary search for a key
        Search => "search",
    }
}

algorithm_ids! {
    /// Recursive call visualizations
    RecursionAlgorithm {
        /// Memoized Fibonacci
        Fibonacci => "fibonacci",
        /// Factorial
        Factorial => "factorial",
        /// Tower of Hanoi
        Hanoi => "hanoi",
    }
}

impl RecursionAlgorithm {
    /// Smallest accepted input
    pub const MIN_INPUT: u32 = 1;

    /// Largest accepted input; larger trees stop being readable
    #[must_use]
    pub fn max_input(self) -> u32 {
        match self {
            Self::Fibonacci => 7,
            Self::Factorial => 8,
            Self::Hanoi => 4,
        }
    }
}

// ============================================
// Algorithm
// ============================================

/// Any selectable algorithm
///
/// Serializes as its string identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    /// Sorting mode
    Sort(SortAlgorithm),
    /// Graph mode
    Graph(GraphAlgorithm),
    /// Tree mode
    Tree(TreeAlgorithm),
    /// Recursion mode
    Recursion(RecursionAlgorithm),
}

impl Algorithm {
    /// String identifier
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Sort(a) => a.id(),
            Self::Graph(a) => a.id(),
            Self::Tree(a) => a.id(),
            Self::Recursion(a) => a.id(),
        }
    }

    /// Visualization mode this algorithm animates
    #[must_use]
    pub fn mode(self) -> Mode {
        match self {
            Self::Sort(_) => Mode::Sorting,
            Self::Graph(_) => Mode::Graph,
            Self::Tree(_) => Mode::Tree,
            Self::Recursion(_) => Mode::Recursion,
        }
    }

    /// Family this algorithm belongs to
    #[must_use]
    pub fn family(self) -> Family {
        match self {
            Self::Sort(_) => Family::Precomputed,
            Self::Graph(_) | Self::Tree(_) | Self::Recursion(_) => Family::Cooperative,
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::Sort(SortAlgorithm::Bubble)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_ascii_lowercase();
        SortAlgorithm::parse(&id)
            .map(Self::Sort)
            .or_else(|| GraphAlgorithm::parse(&id).map(Self::Graph))
            .or_else(|| TreeAlgorithm::parse(&id).map(Self::Tree))
            .or_else(|| RecursionAlgorithm::parse(&id).map(Self::Recursion))
            .ok_or_else(|| EngineError::UnknownAlgorithm(s.to_string()))
    }
}

impl TryFrom<String> for Algorithm {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(value: Algorithm) -> Self {
        value.id().to_string()
    }
}

impl From<SortAlgorithm> for Algorithm {
    fn from(value: SortAlgorithm) -> Self {
        Self::Sort(value)
    }
}

impl From<GraphAlgorithm> for Algorithm {
    fn from(value: GraphAlgorithm) -> Self {
        Self::Graph(value)
    }
}

impl From<TreeAlgorithm> for Algorithm {
    fn from(value: TreeAlgorithm) -> Self {
        Self::Tree(value)
    }
}

impl From<RecursionAlgorithm> for Algorithm {
    fn from(value: RecursionAlgorithm) -> Self {
        Self::Recursion(value)
    }
}
