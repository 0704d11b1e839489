//! Tree traversals and key search.
//!
//! Each visit marks the node `visiting`, waits a full beat, records the key
//! and marks it `visited`, then waits a half beat. The tree's shape is
//! copied at the start of the run; regenerating it is an idle-only intent.

use std::collections::VecDeque;

use futures::future::BoxFuture;

use super::TreeAlgorithm;
use crate::entities::{SearchTree, TreeNodeId, TreeNodeState};
use crate::playback::{Beat, Cancelled, StepContext};

/// Run `algorithm` on the stage's tree
///
/// `search_key` is only used by [`TreeAlgorithm::Search`].
///
/// # Errors
///
/// Returns [`Cancelled`] as soon as the run is superseded.
pub async fn run(
    ctx: &StepContext,
    algorithm: TreeAlgorithm,
    search_key: i64,
) -> Result<(), Cancelled> {
    let tree = ctx.read(|m| m.tree.clone())?;
    tracing::info!(%algorithm, nodes = tree.len(), "Tree traversal started");

    match algorithm {
        TreeAlgorithm::Inorder => depth_first(ctx, &tree, tree.root(), Visit::In).await,
        TreeAlgorithm::Preorder => depth_first(ctx, &tree, tree.root(), Visit::Pre).await,
        TreeAlgorithm::Postorder => depth_first(ctx, &tree, tree.root(), Visit::Post).await,
        TreeAlgorithm::Levelorder => level_order(ctx, &tree).await,
        TreeAlgorithm::Search => search(ctx, &tree, search_key).await,
    }
}

/// Where a depth-first traversal visits the node relative to its subtrees
#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pre,
    In,
    Post,
}

fn depth_first<'a>(
    ctx: &'a StepContext,
    tree: &'a SearchTree,
    node: Option<TreeNodeId>,
    visit: Visit,
) -> BoxFuture<'a, Result<(), Cancelled>> {
    Box::pin(async move {
        let Some(id) = node else {
            return Ok(());
        };
        ctx.checkpoint()?;
        let (left, right) = tree.children(id);

        if visit == Visit::Pre {
            visit_node(ctx, tree, id).await?;
        }
        depth_first(ctx, tree, left, visit).await?;
        if visit == Visit::In {
            visit_node(ctx, tree, id).await?;
        }
        depth_first(ctx, tree, right, visit).await?;
        if visit == Visit::Post {
            visit_node(ctx, tree, id).await?;
        }
        Ok(())
    })
}

async fn level_order(ctx: &StepContext, tree: &SearchTree) -> Result<(), Cancelled> {
    let mut queue: VecDeque<TreeNodeId> = tree.root().into_iter().collect();
    while let Some(id) = queue.pop_front() {
        visit_node(ctx, tree, id).await?;
        let (left, right) = tree.children(id);
        queue.extend(left);
        queue.extend(right);
    }
    Ok(())
}

async fn visit_node(ctx: &StepContext, tree: &SearchTree, id: TreeNodeId) -> Result<(), Cancelled> {
    let Some(key) = tree.get(id).map(|n| n.key) else {
        return Ok(());
    };
    ctx.apply(|m| m.tree.set_state(id, TreeNodeState::Visiting))?;
    ctx.pause(Beat::Full).await?;
    ctx.apply(|m| {
        m.order.push(key.to_string());
        m.tree.set_state(id, TreeNodeState::Visited);
    })?;
    ctx.pause(Beat::Half).await
}

/// Walk from the root toward `target`, painting the route
async fn search(ctx: &StepContext, tree: &SearchTree, target: i64) -> Result<(), Cancelled> {
    let mut current = tree.root();
    while let Some(id) = current {
        let Some(key) = tree.get(id).map(|n| n.key) else {
            break;
        };
        ctx.apply(|m| m.tree.set_state(id, TreeNodeState::Visiting))?;
        ctx.pause(Beat::Full).await?;
        ctx.apply(|m| {
            m.order.push(key.to_string());
            m.tree.set_state(id, TreeNodeState::Path);
        })?;

        if key == target {
            ctx.apply(|m| m.tree.set_state(id, TreeNodeState::Found))?;
            ctx.pause(Beat::Half).await?;
            return Ok(());
        }
        let (left, right) = tree.children(id);
        current = if target < key { left } else { right };
    }
    tracing::debug!(target, "Search key not in tree");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::Algorithm;
    use crate::playback::context::testing::harness;
    use crate::playback::SharedStage;
    use pretty_assertions::assert_eq;

    async fn traverse(algorithm: TreeAlgorithm, key: i64) -> SharedStage {
        let (stage, ctx, _rx) = harness(Algorithm::Tree(algorithm));
        run(&ctx, algorithm, key).await.unwrap();
        stage
    }

    fn keys(stage: &SharedStage) -> Vec<i64> {
        stage
            .lock()
            .model
            .order
            .iter()
            .map(|k| k.parse().unwrap())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_inorder_is_sorted() {
        let stage = traverse(TreeAlgorithm::Inorder, 0).await;
        let mut expected = SearchTree::DEMO_KEYS.to_vec();
        expected.sort_unstable();
        assert_eq!(keys(&stage), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preorder() {
        let stage = traverse(TreeAlgorithm::Preorder, 0).await;
        assert_eq!(
            keys(&stage),
            vec![50, 30, 20, 10, 25, 40, 35, 45, 70, 60, 55, 65, 80, 75, 90]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_postorder() {
        let stage = traverse(TreeAlgorithm::Postorder, 0).await;
        assert_eq!(
            keys(&stage),
            vec![10, 25, 20, 35, 45, 40, 30, 55, 65, 60, 75, 90, 80, 70, 50]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_levelorder_matches_insertion_order() {
        let stage = traverse(TreeAlgorithm::Levelorder, 0).await;
        assert_eq!(keys(&stage), SearchTree::DEMO_KEYS.to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_node_visited_once() {
        let stage = traverse(TreeAlgorithm::Postorder, 0).await;
        let stage = stage.lock();
        assert!(stage
            .model
            .tree
            .nodes()
            .iter()
            .all(|n| n.state == TreeNodeState::Visited));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_finds_key() {
        let stage = traverse(TreeAlgorithm::Search, 65).await;
        assert_eq!(keys(&stage), vec![50, 70, 60, 65]);

        let stage = stage.lock();
        let found: Vec<i64> = stage
            .model
            .tree
            .nodes()
            .iter()
            .filter(|n| n.state == TreeNodeState::Found)
            .map(|n| n.key)
            .collect();
        assert_eq!(found, vec![65]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_missing_key() {
        let stage = traverse(TreeAlgorithm::Search, 33).await;
        assert_eq!(keys(&stage), vec![50, 30, 40, 35]);
        assert!(stage
            .lock()
            .model
            .tree
            .nodes()
            .iter()
            .all(|n| n.state != TreeNodeState::Found));
    }
}
