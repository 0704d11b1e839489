//! Snapshot Projector
//!
//! Folds the stage into a render-ready [`Snapshot`]: per-entity semantic
//! color keys, bar height ratios, pointer labels, counters and order lists.
//! Projection only reads the stage.
//!
//! Color keys are semantic, not literal colors. A renderer maps them to its
//! own palette.

use serde::{Deserialize, Serialize};

use crate::entities::{
    BarState, CallState, EdgeState, EntityModel, NodeState, Point, TreeNodeState,
};
use crate::generators::{Algorithm, Mode, SortEvent};
use crate::playback::{Counters, Phase, Stage};

/// Semantic color class of a drawn entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorKey {
    /// Resting fill
    Primary,
    /// Under comparison / being visited / on the call stack
    Compare,
    /// Being exchanged, or the search destination
    Swap,
    /// Settled
    Sorted,
    /// Pivot, search source, or matched key
    Active,
    /// Expanded graph node
    Visited,
    /// On a reconstructed route
    Path,
    /// Resting edge stroke
    Border,
}

// ============================================
// Scene views
// ============================================

/// One array bar
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarView {
    /// Value
    pub value: u32,
    /// `value / max value in the set`
    pub height_ratio: f32,
    /// Color key
    pub color: ColorKey,
    /// Pointer label (`I`, `J`, `PIVOT`)
    pub pointer: Option<String>,
}

/// One graph node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNodeView {
    /// Node id
    pub id: String,
    /// Position
    pub position: Point,
    /// Color key
    pub color: ColorKey,
}

/// One graph edge
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdgeView {
    /// One endpoint id
    pub from: String,
    /// Other endpoint id
    pub to: String,
    /// Weight label
    pub weight: u32,
    /// Color key
    pub color: ColorKey,
}

/// One tree node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeNodeView {
    /// Arena index
    pub id: usize,
    /// Key label
    pub key: i64,
    /// Position
    pub position: Point,
    /// Color key
    pub color: ColorKey,
    /// Left child index
    pub left: Option<usize>,
    /// Right child index
    pub right: Option<usize>,
}

/// One recursion call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallView {
    /// Call id, e.g. `node-3`
    pub id: String,
    /// Label, e.g. `fib(3)`
    pub label: String,
    /// Result once computed
    pub result: Option<u64>,
    /// Position
    pub position: Point,
    /// Color key
    pub color: ColorKey,
    /// Parent call id
    pub parent: Option<String>,
}

/// Entities of the active mode
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scene {
    /// Sorting
    Bars {
        /// Bars in order
        bars: Vec<BarView>,
    },
    /// Graph search
    Graph {
        /// Nodes in declaration order
        nodes: Vec<GraphNodeView>,
        /// Edges in declaration order
        edges: Vec<GraphEdgeView>,
    },
    /// Tree traversal
    Tree {
        /// Nodes in insertion order
        nodes: Vec<TreeNodeView>,
    },
    /// Recursion
    Calls {
        /// Calls in creation order
        nodes: Vec<CallView>,
    },
}

/// Position of a precomputed sequence's cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorView {
    /// Index of the next event
    pub position: usize,
    /// Number of events
    pub total: usize,
}

/// Render-ready copy of the engine state at one instant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Selected algorithm
    pub algorithm: Algorithm,
    /// Its mode
    pub mode: Mode,
    /// Scheduler state
    pub phase: Phase,
    /// Speed (1..=100)
    pub speed: u8,
    /// Entities of the active mode
    pub scene: Scene,
    /// Sorting counters
    pub counters: Counters,
    /// Visited / called order
    pub order: Vec<String>,
    /// Live recursion call stack
    pub call_stack: Vec<String>,
    /// Cursor of a precomputed sequence, if one exists
    pub cursor: Option<CursorView>,
    /// Most recently applied sort event
    pub last_event: Option<SortEvent>,
    /// Entity mutations applied so far
    pub mutations: u64,
}

impl Snapshot {
    /// Project the stage
    #[must_use]
    pub fn project(stage: &Stage) -> Self {
        let mode = stage.algorithm.mode();
        Self {
            algorithm: stage.algorithm,
            mode,
            phase: stage.phase,
            speed: stage.speed.get(),
            scene: project_scene(&stage.model, mode),
            counters: stage.counters,
            order: stage.model.order.clone(),
            call_stack: stage.model.call_stack.clone(),
            cursor: stage.cursor.as_ref().map(|c| CursorView {
                position: c.position(),
                total: c.len(),
            }),
            last_event: stage.last_event,
            mutations: stage.mutations,
        }
    }

    /// Bars, if this is a sorting snapshot
    #[must_use]
    pub fn bars(&self) -> Option<&[BarView]> {
        match &self.scene {
            Scene::Bars { bars } => Some(bars.as_slice()),
            _ => None,
        }
    }
}

fn project_scene(model: &EntityModel, mode: Mode) -> Scene {
    match mode {
        Mode::Sorting => {
            let max = model.bars.max_value();
            let bars = model
                .bars
                .as_slice()
                .iter()
                .map(|bar| BarView {
                    value: bar.value,
                    height_ratio: height_ratio(bar.value, max),
                    color: bar_color(bar.state),
                    pointer: bar.pointer.map(|p| p.label().to_string()),
                })
                .collect();
            Scene::Bars { bars }
        }
        Mode::Graph => Scene::Graph {
            nodes: model
                .graph
                .nodes()
                .iter()
                .map(|node| GraphNodeView {
                    id: node.id.clone(),
                    position: node.position,
                    color: node_color(node.state),
                })
                .collect(),
            edges: model
                .graph
                .edges()
                .iter()
                .map(|edge| GraphEdgeView {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    weight: edge.weight,
                    color: edge_color(edge.state),
                })
                .collect(),
        },
        Mode::Tree => Scene::Tree {
            nodes: model
                .tree
                .nodes()
                .iter()
                .enumerate()
                .map(|(id, node)| TreeNodeView {
                    id,
                    key: node.key,
                    position: node.position,
                    color: tree_color(node.state),
                    left: node.left.map(|c| c.0),
                    right: node.right.map(|c| c.0),
                })
                .collect(),
        },
        Mode::Recursion => Scene::Calls {
            nodes: model
                .calls
                .nodes()
                .iter()
                .map(|call| CallView {
                    id: call.id.to_string(),
                    label: call.label.clone(),
                    result: call.result,
                    position: call.position,
                    color: call_color(call.state),
                    parent: call.parent.map(|p| p.to_string()),
                })
                .collect(),
        },
    }
}

#[allow(clippy::cast_precision_loss)]
fn height_ratio(value: u32, max: u32) -> f32 {
    if max == 0 {
        0.0
    } else {
        value as f32 / max as f32
    }
}

fn bar_color(state: BarState) -> ColorKey {
    match state {
        BarState::Default => ColorKey::Primary,
        BarState::Comparing => ColorKey::Compare,
        BarState::Swapping => ColorKey::Swap,
        BarState::Sorted => ColorKey::Sorted,
        BarState::Pivot => ColorKey::Active,
    }
}

fn node_color(state: NodeState) -> ColorKey {
    match state {
        NodeState::Default => ColorKey::Primary,
        NodeState::Visiting => ColorKey::Compare,
        NodeState::Visited => ColorKey::Visited,
        NodeState::Path => ColorKey::Path,
        NodeState::Start => ColorKey::Active,
        NodeState::End => ColorKey::Swap,
    }
}

fn edge_color(state: EdgeState) -> ColorKey {
    match state {
        EdgeState::Default => ColorKey::Border,
        EdgeState::Exploring => ColorKey::Compare,
        EdgeState::Path => ColorKey::Path,
    }
}

fn tree_color(state: TreeNodeState) -> ColorKey {
    match state {
        TreeNodeState::Default => ColorKey::Primary,
        TreeNodeState::Visiting => ColorKey::Compare,
        TreeNodeState::Visited => ColorKey::Sorted,
        TreeNodeState::Found => ColorKey::Active,
        TreeNodeState::Path => ColorKey::Path,
    }
}

fn call_color(state: CallState) -> ColorKey {
    match state {
        CallState::Default => ColorKey::Primary,
        CallState::Computing => ColorKey::Compare,
        CallState::Computed => ColorKey::Sorted,
        CallState::Returning => ColorKey::Path,
    }
}
