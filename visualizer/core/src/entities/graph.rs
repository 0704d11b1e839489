//! Weighted undirected graph for the search visualizations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Point;
use crate::error::EngineError;

/// Visual state of a graph node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Resting state
    #[default]
    Default,
    /// Discovered, waiting to be expanded
    Visiting,
    /// Expanded
    Visited,
    /// On the reconstructed route
    Path,
    /// Resting state of the source node
    Start,
    /// Resting state of the destination node
    End,
}

/// Visual state of a graph edge
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeState {
    /// Resting state
    #[default]
    Default,
    /// Traversed during the search
    Exploring,
    /// On the reconstructed route
    Path,
}

/// A node with a fixed position
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier
    pub id: String,
    /// Fixed 2-D position
    pub position: Point,
    /// Current visual state
    pub state: NodeState,
}

/// An undirected weighted edge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// One endpoint
    pub from: String,
    /// The other endpoint
    pub to: String,
    /// Non-negative weight
    pub weight: u32,
    /// Current visual state
    pub state: EdgeState,
}

impl GraphEdge {
    /// Whether this edge joins `a` and `b` in either direction
    #[must_use]
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// A neighbor entry in an adjacency list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Neighbor {
    /// Neighbor node id
    pub node: String,
    /// Weight of the connecting edge
    pub weight: u32,
}

/// Adjacency lists read from the graph at the start of a search
///
/// Node order follows declaration order; each list follows edge
/// declaration order.
#[derive(Clone, Debug, Default)]
pub struct Adjacency {
    order: Vec<String>,
    lists: HashMap<String, Vec<Neighbor>>,
}

impl Adjacency {
    /// Node ids in declaration order
    #[must_use]
    pub fn node_ids(&self) -> &[String] {
        &self.order
    }

    /// Neighbors of `id` (empty for unknown ids)
    #[must_use]
    pub fn neighbors(&self, id: &str) -> &[Neighbor] {
        self.lists.get(id).map_or(&[], Vec::as_slice)
    }
}

/// The graph plus its two distinguished endpoints
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    start: String,
    end: String,
}

impl Graph {
    /// Build a graph from `(id, x, y)` nodes and `(a, b, weight)` edges
    ///
    /// Edges naming unknown nodes are dropped. Endpoints are checked the
    /// same way as [`Graph::set_endpoints`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownNode`] if an endpoint is not a node.
    pub fn new(
        nodes: &[(&str, f32, f32)],
        edges: &[(&str, &str, u32)],
        start: &str,
        end: &str,
    ) -> Result<Self, EngineError> {
        let nodes: Vec<GraphNode> = nodes
            .iter()
            .map(|&(id, x, y)| GraphNode {
                id: id.to_string(),
                position: Point::new(x, y),
                state: NodeState::Default,
            })
            .collect();
        let known = |id: &str| nodes.iter().any(|n| n.id == id);
        let edges: Vec<GraphEdge> = edges
            .iter()
            .filter(|(a, b, _)| known(a) && known(b))
            .map(|&(a, b, weight)| GraphEdge {
                from: a.to_string(),
                to: b.to_string(),
                weight,
                state: EdgeState::Default,
            })
            .collect();

        let mut graph = Self {
            nodes,
            edges,
            start: String::new(),
            end: String::new(),
        };
        graph.set_endpoints(start, end)?;
        Ok(graph)
    }

    /// The fixed eight-node demo graph, searching from `A` to `H`
    #[must_use]
    pub fn demo() -> Self {
        let mut graph = Self {
            nodes: DEMO_NODES
                .iter()
                .map(|&(id, x, y)| GraphNode {
                    id: id.to_string(),
                    position: Point::new(x, y),
                    state: NodeState::Default,
                })
                .collect(),
            edges: DEMO_EDGES
                .iter()
                .map(|&(a, b, weight)| GraphEdge {
                    from: a.to_string(),
                    to: b.to_string(),
                    weight,
                    state: EdgeState::Default,
                })
                .collect(),
            start: DEMO_START.to_string(),
            end: DEMO_END.to_string(),
        };
        graph.reset_visual_state();
        graph
    }

    /// All nodes in declaration order
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// All edges in declaration order
    #[must_use]
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Source node id
    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Destination node id
    #[must_use]
    pub fn end(&self) -> &str {
        &self.end
    }

    /// Whether a node with this id exists
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Look up a node
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up the edge joining two nodes
    #[must_use]
    pub fn edge(&self, a: &str, b: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.joins(a, b))
    }

    /// Move the distinguished endpoints and restore resting states
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownNode`] if either id is not a node; the
    /// graph is left unchanged.
    pub fn set_endpoints(&mut self, start: &str, end: &str) -> Result<(), EngineError> {
        for id in [start, end] {
            if !self.contains(id) {
                return Err(EngineError::UnknownNode(id.to_string()));
            }
        }
        self.start = start.to_string();
        self.end = end.to_string();
        self.reset_visual_state();
        Ok(())
    }

    /// Adjacency lists for a search (both directions per edge)
    #[must_use]
    pub fn adjacency(&self) -> Adjacency {
        let mut lists: HashMap<String, Vec<Neighbor>> = self
            .nodes
            .iter()
            .map(|n| (n.id.clone(), Vec::new()))
            .collect();
        for edge in &self.edges {
            if let Some(list) = lists.get_mut(&edge.from) {
                list.push(Neighbor {
                    node: edge.to.clone(),
                    weight: edge.weight,
                });
            }
            if let Some(list) = lists.get_mut(&edge.to) {
                list.push(Neighbor {
                    node: edge.from.clone(),
                    weight: edge.weight,
                });
            }
        }
        Adjacency {
            order: self.nodes.iter().map(|n| n.id.clone()).collect(),
            lists,
        }
    }

    /// Set a node's visual state; returns false for unknown ids
    pub fn set_node_state(&mut self, id: &str, state: NodeState) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.state = state;
                true
            }
            None => false,
        }
    }

    /// Set the visual state of every edge joining `a` and `b`
    pub fn set_edge_state(&mut self, a: &str, b: &str, state: EdgeState) -> bool {
        let mut touched = false;
        for edge in self.edges.iter_mut().filter(|e| e.joins(a, b)) {
            edge.state = state;
            touched = true;
        }
        touched
    }

    /// Restore resting states: `start`/`end` on the endpoints, `default`
    /// everywhere else
    pub fn reset_visual_state(&mut self) {
        for node in &mut self.nodes {
            node.state = if node.id == self.start {
                NodeState::Start
            } else if node.id == self.end {
                NodeState::End
            } else {
                NodeState::Default
            };
        }
        for edge in &mut self.edges {
            edge.state = EdgeState::Default;
        }
    }

    /// Total weight of a route given as consecutive node ids
    ///
    /// Returns `None` if two consecutive nodes are not adjacent.
    #[must_use]
    pub fn route_weight(&self, route: &[String]) -> Option<u32> {
        route
            .windows(2)
            .map(|pair| self.edge(&pair[0], &pair[1]).map(|e| e.weight))
            .sum()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::demo()
    }
}

const DEMO_START: &str = "A";
const DEMO_END: &str = "H";

const DEMO_NODES: [(&str, f32, f32); 8] = [
    ("A", 100.0, 80.0),
    ("B", 250.0, 50.0),
    ("C", 400.0, 80.0),
    ("D", 100.0, 200.0),
    ("E", 250.0, 170.0),
    ("F", 400.0, 200.0),
    ("G", 175.0, 300.0),
    ("H", 325.0, 300.0),
];

const DEMO_EDGES: [(&str, &str, u32); 11] = [
    ("A", "B", 4),
    ("A", "D", 2),
    ("B", "C", 3),
    ("B", "E", 1),
    ("C", "F", 5),
    ("D", "E", 3),
    ("D", "G", 6),
    ("E", "F", 2),
    ("E", "H", 4),
    ("F", "H", 1),
    ("G", "H", 2),
];
