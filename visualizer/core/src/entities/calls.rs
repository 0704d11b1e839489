//! Recursion call tree.
//!
//! Call nodes are append-only for the length of a run: an id, once issued,
//! is never removed or reparented. The whole tree is discarded when the next
//! run starts.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Point;

/// Visual state of a call node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    /// Created, not yet entered
    #[default]
    Default,
    /// On the call stack
    Computing,
    /// Returned with a result
    Computed,
    /// Handing its result back to the caller
    Returning,
}

/// Identifier of a call node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub usize);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// One recursive call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallNode {
    /// Identifier
    pub id: CallId,
    /// Display label, e.g. `fib(5)`
    pub label: String,
    /// Result once computed
    pub result: Option<u64>,
    /// Position assigned at creation
    pub position: Point,
    /// Current visual state
    pub state: CallState,
    /// Child calls in creation order
    pub children: Vec<CallId>,
    /// Calling node (back-reference only)
    pub parent: Option<CallId>,
}

/// Append-only call tree
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CallTree {
    nodes: Vec<CallNode>,
}

impl CallTree {
    /// Empty tree
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call node and link it under `parent`
    ///
    /// An unknown parent id is treated as no parent.
    pub fn add(&mut self, label: impl Into<String>, position: Point, parent: Option<CallId>) -> CallId {
        let id = CallId(self.nodes.len());
        let parent = parent.filter(|p| p.0 < self.nodes.len());
        self.nodes.push(CallNode {
            id,
            label: label.into(),
            result: None,
            position,
            state: CallState::Default,
            children: Vec::new(),
            parent,
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    /// Update a node's state, keeping its previous result unless a new one
    /// is given
    pub fn set_state(&mut self, id: CallId, state: CallState, result: Option<u64>) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                node.state = state;
                if result.is_some() {
                    node.result = result;
                }
                true
            }
            None => false,
        }
    }

    /// Look up a node
    #[must_use]
    pub fn get(&self, id: CallId) -> Option<&CallNode> {
        self.nodes.get(id.0)
    }

    /// All nodes in creation order
    #[must_use]
    pub fn nodes(&self) -> &[CallNode] {
        &self.nodes
    }

    /// The first root call, if any
    #[must_use]
    pub fn root(&self) -> Option<&CallNode> {
        self.nodes.iter().find(|n| n.parent.is_none())
    }

    /// Number of calls made
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no call has been made
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Discard every node
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_links_children() {
        let mut calls = CallTree::new();
        let root = calls.add("fib(2)", Point::new(400.0, 40.0), None);
        let left = calls.add("fib(1)", Point::new(340.0, 110.0), Some(root));
        let right = calls.add("fib(0)", Point::new(460.0, 110.0), Some(root));

        assert_eq!(calls.len(), 3);
        assert_eq!(calls.get(root).unwrap().children, vec![left, right]);
        assert_eq!(calls.get(right).unwrap().parent, Some(root));
        assert_eq!(calls.root().map(|n| n.id), Some(root));
        assert_eq!(right.to_string(), "node-2");
    }

    #[test]
    fn test_unknown_parent_becomes_root() {
        let mut calls = CallTree::new();
        let id = calls.add("1!", Point::default(), Some(CallId(9)));
        assert_eq!(calls.get(id).unwrap().parent, None);
    }

    #[test]
    fn test_set_state_keeps_result() {
        let mut calls = CallTree::new();
        let id = calls.add("3!", Point::default(), None);
        calls.set_state(id, CallState::Computed, Some(6));
        calls.set_state(id, CallState::Returning, None);

        let node = calls.get(id).unwrap();
        assert_eq!(node.state, CallState::Returning);
        assert_eq!(node.result, Some(6));
        assert!(!calls.set_state(CallId(4), CallState::Computed, None));
    }
}
