//! Entity Model
//!
//! Layout and visual-state tagging for everything the engine animates:
//! array bars, graph nodes and edges, binary search tree nodes, and
//! recursion call nodes.
//!
//! # Ownership
//!
//! The engine exclusively owns the [`EntityModel`]. Renderers only ever see
//! projected snapshots. Geometry is fixed when an entity is built; runs only
//! change visual state (and, for bars, exchange positions).

pub mod bars;
pub mod calls;
pub mod graph;
pub mod tree;

pub use bars::{ArraySpec, Bar, BarState, Bars, PointerRole};
pub use calls::{CallId, CallNode, CallState, CallTree};
pub use graph::{Adjacency, EdgeState, Graph, GraphEdge, GraphNode, Neighbor, NodeState};
pub use tree::{SearchTree, TreeLayout, TreeNode, TreeNodeId, TreeNodeState};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A 2-D position in renderer units
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Point {
    /// Create a point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Every entity set the engine animates, plus the derived order lists
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityModel {
    /// Sorting bars
    pub bars: Bars,
    /// Search graph
    pub graph: Graph,
    /// Traversal tree
    pub tree: SearchTree,
    /// Recursion calls of the current run
    pub calls: CallTree,
    /// Visited / called order, as display labels
    pub order: Vec<String>,
    /// Live call stack of the recursion run
    pub call_stack: Vec<String>,
}

impl EntityModel {
    /// Build the initial entity set: a random array following `array`, the
    /// demo graph and the demo tree
    pub fn build_default<R: Rng + ?Sized>(rng: &mut R, array: &ArraySpec) -> Self {
        Self {
            bars: Bars::random(rng, array),
            graph: Graph::demo(),
            tree: SearchTree::demo(),
            calls: CallTree::new(),
            order: Vec::new(),
            call_stack: Vec::new(),
        }
    }

    /// Return every entity to its resting visual state and clear the
    /// derived order lists
    ///
    /// Recursion call nodes belong to a single run and are discarded.
    pub fn reset_visual_state(&mut self) {
        self.bars.clear_tags();
        self.graph.reset_visual_state();
        self.tree.reset_visual_state();
        self.calls.clear();
        self.order.clear();
        self.call_stack.clear();
    }
}
