//! Binary search tree for the traversal visualizations.
//!
//! Nodes live in an arena addressed by [`TreeNodeId`]. Positions are fixed
//! when a key is inserted; traversals only change visual state.

use serde::{Deserialize, Serialize};

use super::Point;

/// Visual state of a tree node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNodeState {
    /// Resting state
    #[default]
    Default,
    /// Being visited
    Visiting,
    /// Visit finished
    Visited,
    /// Matched by a search
    Found,
    /// On a search route
    Path,
}

/// Stable index of a node in the arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeNodeId(pub usize);

/// One node of the tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Integer key
    pub key: i64,
    /// Position assigned at insertion
    pub position: Point,
    /// Current visual state
    pub state: TreeNodeState,
    /// Left child
    pub left: Option<TreeNodeId>,
    /// Right child
    pub right: Option<TreeNodeId>,
    /// Parent (none for the root)
    pub parent: Option<TreeNodeId>,
}

/// Layout applied on insertion
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeLayout {
    /// Position of the root
    pub origin: Point,
    /// Horizontal offset of the root's children
    pub spread: f32,
    /// Vertical distance between levels
    pub level_height: f32,
    /// Factor applied to the spread at each level
    pub shrink: f32,
}

impl Default for TreeLayout {
    fn default() -> Self {
        Self {
            origin: Point::new(400.0, 40.0),
            spread: 160.0,
            level_height: 60.0,
            shrink: 0.6,
        }
    }
}

/// Arena-backed binary search tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
    root: Option<TreeNodeId>,
    layout: TreeLayout,
}

impl SearchTree {
    /// Keys of the demo tree, in insertion order
    pub const DEMO_KEYS: [i64; 15] = [50, 30, 70, 20, 40, 60, 80, 10, 25, 35, 45, 55, 65, 75, 90];

    /// Empty tree with the given layout
    #[must_use]
    pub fn new(layout: TreeLayout) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            layout,
        }
    }

    /// The fifteen-key demo tree (a perfect tree of depth four)
    #[must_use]
    pub fn demo() -> Self {
        Self::from_keys(&Self::DEMO_KEYS)
    }

    /// Insert `keys` in order into an empty tree with the default layout
    #[must_use]
    pub fn from_keys(keys: &[i64]) -> Self {
        let mut tree = Self::new(TreeLayout::default());
        for &key in keys {
            tree.insert(key);
        }
        tree
    }

    /// Insert a key, positioning it relative to its parent
    ///
    /// Smaller keys go left; equal or larger keys go right. Each level
    /// moves down by `level_height` and sideways by the current spread,
    /// which shrinks by `shrink` per level.
    pub fn insert(&mut self, key: i64) -> TreeNodeId {
        let id = TreeNodeId(self.nodes.len());
        let Some(mut current) = self.root else {
            self.nodes.push(TreeNode {
                key,
                position: self.layout.origin,
                state: TreeNodeState::Default,
                left: None,
                right: None,
                parent: None,
            });
            self.root = Some(id);
            return id;
        };

        let mut spread = self.layout.spread;
        loop {
            let node = &self.nodes[current.0];
            let go_left = key < node.key;
            let next = if go_left { node.left } else { node.right };
            match next {
                Some(child) => {
                    current = child;
                    spread *= self.layout.shrink;
                }
                None => {
                    let dx = if go_left { -spread } else { spread };
                    let position = Point::new(
                        node.position.x + dx,
                        node.position.y + self.layout.level_height,
                    );
                    self.nodes.push(TreeNode {
                        key,
                        position,
                        state: TreeNodeState::Default,
                        left: None,
                        right: None,
                        parent: Some(current),
                    });
                    let parent = &mut self.nodes[current.0];
                    if go_left {
                        parent.left = Some(id);
                    } else {
                        parent.right = Some(id);
                    }
                    return id;
                }
            }
        }
    }

    /// Root node id
    #[must_use]
    pub fn root(&self) -> Option<TreeNodeId> {
        self.root
    }

    /// Look up a node
    #[must_use]
    pub fn get(&self, id: TreeNodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// All nodes in insertion order
    #[must_use]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Left and right children of a node
    #[must_use]
    pub fn children(&self, id: TreeNodeId) -> (Option<TreeNodeId>, Option<TreeNodeId>) {
        self.get(id).map_or((None, None), |n| (n.left, n.right))
    }

    /// Set a node's visual state; returns false for unknown ids
    pub fn set_state(&mut self, id: TreeNodeId, state: TreeNodeState) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                node.state = state;
                true
            }
            None => false,
        }
    }

    /// Return every node to `default`
    pub fn reset_visual_state(&mut self) {
        for node in &mut self.nodes {
            node.state = TreeNodeState::Default;
        }
    }

    /// Depth of a node (root is 0)
    #[must_use]
    pub fn depth(&self, id: TreeNodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.get(parent).and_then(|n| n.parent);
        }
        depth
    }
}

impl Default for SearchTree {
    fn default() -> Self {
        Self::demo()
    }
}
