//! Graph searches.
//!
//! All three searches read the adjacency lists once, at the start of the
//! run, and then mutate the graph's visual state through the run context.
//! On success the route is reconstructed from the parent map and painted
//! from the destination back to the source. An unreachable destination is
//! a normal ending with no route painted.

use std::collections::{HashMap, HashSet, VecDeque};

use futures::future::BoxFuture;

use super::GraphAlgorithm;
use crate::entities::{Adjacency, EdgeState, NodeState};
use crate::playback::{Beat, Cancelled, StepContext};

/// Parent pointers recorded while searching
type Parents = HashMap<String, String>;

/// Run `algorithm` on the stage's graph
///
/// # Errors
///
/// Returns [`Cancelled`] as soon as the run is superseded.
pub async fn run(ctx: &StepContext, algorithm: GraphAlgorithm) -> Result<(), Cancelled> {
    let (adjacency, start, end) = ctx.read(|m| {
        (
            m.graph.adjacency(),
            m.graph.start().to_string(),
            m.graph.end().to_string(),
        )
    })?;
    tracing::info!(%algorithm, %start, %end, "Graph search started");

    match algorithm {
        GraphAlgorithm::Bfs => bfs(ctx, &adjacency, &start, &end).await,
        GraphAlgorithm::Dfs => dfs(ctx, &adjacency, &start, &end).await,
        GraphAlgorithm::Dijkstra => dijkstra(ctx, &adjacency, &start, &end).await,
    }
}

async fn bfs(ctx: &StepContext, adj: &Adjacency, start: &str, end: &str) -> Result<(), Cancelled> {
    let mut visited: HashSet<String> = HashSet::from([start.to_string()]);
    let mut queue: VecDeque<String> = VecDeque::from([start.to_string()]);
    let mut parents = Parents::new();

    ctx.apply(|m| m.graph.set_node_state(start, NodeState::Visiting))?;

    while let Some(current) = queue.pop_front() {
        ctx.apply(|m| {
            m.order.push(current.clone());
            m.graph.set_node_state(&current, NodeState::Visited);
        })?;
        ctx.pause(Beat::Full).await?;

        if current == end {
            break;
        }

        for neighbor in adj.neighbors(&current) {
            if !visited.insert(neighbor.node.clone()) {
                continue;
            }
            parents.insert(neighbor.node.clone(), current.clone());
            queue.push_back(neighbor.node.clone());

            ctx.apply(|m| {
                m.graph
                    .set_edge_state(&current, &neighbor.node, EdgeState::Exploring);
                m.graph.set_node_state(&neighbor.node, NodeState::Visiting);
            })?;
            ctx.pause(Beat::Half).await?;
        }
    }

    if parents.contains_key(end) {
        paint_route(ctx, &parents, start, end).await?;
    }
    Ok(())
}

/// Depth-first search state shared by every recursion level
struct DepthFirst<'a> {
    adj: &'a Adjacency,
    end: &'a str,
    visited: HashSet<String>,
    parents: Parents,
    found: bool,
}

async fn dfs(ctx: &StepContext, adj: &Adjacency, start: &str, end: &str) -> Result<(), Cancelled> {
    let mut search = DepthFirst {
        adj,
        end,
        visited: HashSet::new(),
        parents: Parents::new(),
        found: false,
    };
    dfs_visit(ctx, &mut search, start.to_string()).await?;

    if search.found {
        paint_route(ctx, &search.parents, start, end).await?;
    }
    Ok(())
}

fn dfs_visit<'a>(
    ctx: &'a StepContext,
    search: &'a mut DepthFirst<'_>,
    node: String,
) -> BoxFuture<'a, Result<(), Cancelled>> {
    Box::pin(async move {
        if search.found {
            return Ok(());
        }
        search.visited.insert(node.clone());

        ctx.apply(|m| {
            m.order.push(node.clone());
            m.graph.set_node_state(&node, NodeState::Visiting);
        })?;
        ctx.pause(Beat::Full).await?;

        if node == search.end {
            search.found = true;
            return Ok(());
        }
        ctx.apply(|m| m.graph.set_node_state(&node, NodeState::Visited))?;

        let adj = search.adj;
        for neighbor in adj.neighbors(&node) {
            if search.found {
                break;
            }
            if search.visited.contains(&neighbor.node) {
                continue;
            }
            search.parents.insert(neighbor.node.clone(), node.clone());
            ctx.apply(|m| {
                m.graph
                    .set_edge_state(&node, &neighbor.node, EdgeState::Exploring);
            })?;
            dfs_visit(ctx, search, neighbor.node.clone()).await?;
        }
        Ok(())
    })
}

async fn dijkstra(
    ctx: &StepContext,
    adj: &Adjacency,
    start: &str,
    end: &str,
) -> Result<(), Cancelled> {
    let mut distances: HashMap<&str, u64> =
        adj.node_ids().iter().map(|id| (id.as_str(), u64::MAX)).collect();
    distances.insert(start, 0);
    let mut visited: HashSet<String> = HashSet::new();
    let mut parents = Parents::new();

    loop {
        // Linear scan in declaration order; ties keep the earlier node
        let mut nearest: Option<(&str, u64)> = None;
        for id in adj.node_ids() {
            let distance = distances.get(id.as_str()).copied().unwrap_or(u64::MAX);
            if visited.contains(id) {
                continue;
            }
            if distance < nearest.map_or(u64::MAX, |(_, d)| d) {
                nearest = Some((id.as_str(), distance));
            }
        }
        let Some((current, distance)) = nearest else {
            break;
        };
        if current == end {
            break;
        }

        visited.insert(current.to_string());
        ctx.apply(|m| {
            m.order.push(current.to_string());
            m.graph.set_node_state(current, NodeState::Visited);
        })?;
        ctx.pause(Beat::Full).await?;

        for neighbor in adj.neighbors(current) {
            if visited.contains(&neighbor.node) {
                continue;
            }
            let candidate = distance.saturating_add(u64::from(neighbor.weight));
            let known = distances
                .get(neighbor.node.as_str())
                .copied()
                .unwrap_or(u64::MAX);
            if candidate >= known {
                continue;
            }
            distances.insert(neighbor.node.as_str(), candidate);
            parents.insert(neighbor.node.clone(), current.to_string());

            ctx.apply(|m| {
                m.graph
                    .set_edge_state(current, &neighbor.node, EdgeState::Exploring);
                m.graph.set_node_state(&neighbor.node, NodeState::Visiting);
            })?;
            ctx.pause(Beat::Half).await?;
        }
    }

    if parents.contains_key(end) {
        ctx.apply(|m| m.order.push(end.to_string()))?;
        paint_route(ctx, &parents, start, end).await?;
    }
    Ok(())
}

/// Paint the route from `end` back to `start`, one hop per half beat
async fn paint_route(
    ctx: &StepContext,
    parents: &Parents,
    start: &str,
    end: &str,
) -> Result<(), Cancelled> {
    let mut current = end.to_string();
    while current != start {
        let Some(previous) = parents.get(&current).cloned() else {
            break;
        };
        ctx.apply(|m| {
            m.graph.set_edge_state(&previous, &current, EdgeState::Path);
            m.graph.set_node_state(&current, NodeState::Path);
        })?;
        current = previous;
        ctx.pause(Beat::Half).await?;
    }
    ctx.apply(|m| m.graph.set_node_state(start, NodeState::Path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Graph, GraphEdge};
    use crate::generators::Algorithm;
    use crate::playback::context::testing::harness;
    use crate::playback::SharedStage;
    use pretty_assertions::assert_eq;

    async fn search(algorithm: GraphAlgorithm, graph: Option<Graph>) -> SharedStage {
        let (stage, ctx, _rx) = harness(Algorithm::Graph(algorithm));
        if let Some(graph) = graph {
            stage.lock().model.graph = graph;
        }
        run(&ctx, algorithm).await.unwrap();
        stage
    }

    fn order(stage: &SharedStage) -> Vec<String> {
        stage.lock().model.order.clone()
    }

    fn path_edges(stage: &SharedStage) -> Vec<GraphEdge> {
        stage
            .lock()
            .model
            .graph
            .edges()
            .iter()
            .filter(|e| e.state == EdgeState::Path)
            .cloned()
            .collect()
    }

    fn path_nodes(stage: &SharedStage) -> Vec<String> {
        stage
            .lock()
            .model
            .graph
            .nodes()
            .iter()
            .filter(|n| n.state == NodeState::Path)
            .map(|n| n.id.clone())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_bfs_finds_fewest_hops() {
        let stage = search(GraphAlgorithm::Bfs, None).await;
        assert_eq!(order(&stage), vec!["A", "B", "D", "C", "E", "G", "F", "H"]);
        assert_eq!(path_nodes(&stage), vec!["A", "B", "E", "H"]);
        assert_eq!(path_edges(&stage).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dfs_follows_declaration_order() {
        let stage = search(GraphAlgorithm::Dfs, None).await;
        assert_eq!(order(&stage), vec!["A", "B", "C", "F", "E", "D", "G", "H"]);
        let route = path_nodes(&stage);
        assert!(route.contains(&"A".to_string()));
        assert!(route.contains(&"H".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dijkstra_route_is_minimal() {
        let stage = search(GraphAlgorithm::Dijkstra, None).await;
        assert_eq!(order(&stage), vec!["A", "D", "B", "E", "C", "F", "G", "H"]);
        assert_eq!(path_nodes(&stage), vec!["A", "D", "E", "F", "H"]);
        let weight: u32 = path_edges(&stage).iter().map(|e| e.weight).sum();
        assert_eq!(weight, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_destination_paints_nothing() {
        let graph = Graph::new(
            &[("A", 0.0, 0.0), ("B", 10.0, 0.0), ("Z", 20.0, 0.0)],
            &[("A", "B", 1)],
            "A",
            "Z",
        )
        .unwrap();
        for algorithm in GraphAlgorithm::ALL {
            let stage = search(*algorithm, Some(graph.clone())).await;
            assert!(path_nodes(&stage).is_empty(), "{algorithm}");
            assert!(path_edges(&stage).is_empty(), "{algorithm}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_respects_moved_endpoints() {
        let mut graph = Graph::demo();
        graph.set_endpoints("G", "C").unwrap();
        let stage = search(GraphAlgorithm::Dijkstra, Some(graph)).await;
        // G-H-F-C costs 2+1+5; G-H-F-E-B-C costs 9
        let weight: u32 = path_edges(&stage).iter().map(|e| e.weight).sum();
        assert_eq!(weight, 8);
        assert_eq!(path_nodes(&stage), vec!["C", "F", "G", "H"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_search_stops_mutating() {
        let (stage, ctx, _rx) = harness(Algorithm::Graph(GraphAlgorithm::Bfs));
        let task = tokio::spawn(async move { run(&ctx, GraphAlgorithm::Bfs).await });

        tokio::task::yield_now().await;
        let before = {
            let mut stage = stage.lock();
            stage.reset();
            stage.mutations
        };

        assert_eq!(task.await.unwrap(), Err(Cancelled));
        assert_eq!(stage.lock().mutations, before);
        assert!(order(&stage).is_empty());
    }
}
