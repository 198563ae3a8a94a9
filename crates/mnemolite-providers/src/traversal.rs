//! Graph Traversal (C10) implementation.
//!
//! Bounded BFS over the Store Gateway's `edges_for_node`/`nodes_by_id`
//! methods. A visited set guards against cycles in the underlying graph, so
//! traversal cost is bounded by `|visited| * average_fanout` rather than by
//! the graph's structure (§4.10).

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use mnemolite_domain::entities::{EdgeType, GraphEdge, GraphNode};
use mnemolite_domain::error::Result;
use mnemolite_domain::ports::{Direction, GraphTraversal, NeighborsResult, ShortestPathResult, StoreGateway};

/// Hard cap on nodes visited in a single traversal call, independent of the
/// requested depth, so a densely connected graph cannot make one call
/// unbounded in wall-clock time.
const MAX_VISITED: usize = 2000;

/// Store-backed bounded graph traversal.
pub struct StoreGraphTraversal {
    store: Arc<dyn StoreGateway>,
}

impl StoreGraphTraversal {
    /// Build a traversal provider over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn StoreGateway>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl GraphTraversal for StoreGraphTraversal {
    async fn neighbors(
        &self,
        node: &str,
        depth: usize,
        edge_types: &[EdgeType],
        direction: Direction,
    ) -> Result<NeighborsResult> {
        let mut visited: HashSet<String> = HashSet::from([node.to_string()]);
        let mut frontier: VecDeque<(String, usize)> = VecDeque::from([(node.to_string(), 0)]);
        let mut all_edges: Vec<GraphEdge> = Vec::new();
        let mut truncated = false;

        while let Some((current, current_depth)) = frontier.pop_front() {
            if current_depth >= depth {
                continue;
            }
            if visited.len() >= MAX_VISITED {
                truncated = true;
                break;
            }

            let edges = self.store.edges_for_node(&current, edge_types, direction).await?;
            for edge in edges {
                let next = match direction {
                    Direction::Out => edge.target_node_id.clone(),
                    Direction::In => edge.source_node_id.clone(),
                    Direction::Both => {
                        if edge.source_node_id == current {
                            edge.target_node_id.clone()
                        } else {
                            edge.source_node_id.clone()
                        }
                    }
                };
                all_edges.push(edge);
                if visited.insert(next.clone()) {
                    if visited.len() >= MAX_VISITED {
                        truncated = true;
                        break;
                    }
                    frontier.push_back((next, current_depth + 1));
                }
            }
        }
        if !frontier.is_empty() {
            truncated = true;
        }

        // `visited` seeds with the origin to guard against cycles back to it,
        // but the origin itself is not one of its own neighbors (scenario 5).
        let ids: Vec<String> = visited.into_iter().filter(|id| id != node).collect();
        let nodes = self.store.nodes_by_id(&ids).await?;
        all_edges.sort_by(|a, b| a.id.cmp(&b.id));
        all_edges.dedup_by(|a, b| a.id == b.id);

        Ok(NeighborsResult {
            nodes,
            edges: all_edges,
            truncated,
        })
    }

    async fn shortest_path(&self, a: &str, b: &str, edge_types: &[EdgeType]) -> Result<ShortestPathResult> {
        if a == b {
            let nodes = self.store.nodes_by_id(&[a.to_string()]).await?;
            return Ok(ShortestPathResult {
                nodes,
                edges: Vec::new(),
                truncated: false,
            });
        }

        let mut visited: HashSet<String> = HashSet::from([a.to_string()]);
        let mut frontier: VecDeque<String> = VecDeque::from([a.to_string()]);
        let mut came_from: std::collections::HashMap<String, (String, GraphEdge)> = std::collections::HashMap::new();
        let mut found = false;

        'bfs: while let Some(current) = frontier.pop_front() {
            if visited.len() >= MAX_VISITED {
                break;
            }
            let edges = self.store.edges_for_node(&current, edge_types, Direction::Both).await?;
            for edge in edges {
                let next = if edge.source_node_id == current {
                    edge.target_node_id.clone()
                } else {
                    edge.source_node_id.clone()
                };
                if visited.insert(next.clone()) {
                    came_from.insert(next.clone(), (current.clone(), edge));
                    if next == b {
                        found = true;
                        break 'bfs;
                    }
                    frontier.push_back(next);
                }
            }
        }

        if !found {
            return Ok(ShortestPathResult {
                nodes: Vec::new(),
                edges: Vec::new(),
                truncated: true,
            });
        }

        let mut path_edges = Vec::new();
        let mut path_ids = vec![b.to_string()];
        let mut cursor = b.to_string();
        while cursor != a {
            let (prev, edge) = came_from.get(&cursor).expect("reachable node has a predecessor");
            path_edges.push(edge.clone());
            path_ids.push(prev.clone());
            cursor = prev.clone();
        }
        path_edges.reverse();
        path_ids.reverse();

        let nodes = self.store.nodes_by_id(&path_ids).await?;
        let mut ordered_nodes = Vec::with_capacity(path_ids.len());
        for id in &path_ids {
            if let Some(n) = nodes.iter().find(|n| &n.id == id) {
                ordered_nodes.push(n.clone());
            }
        }

        Ok(ShortestPathResult {
            nodes: ordered_nodes,
            edges: path_edges,
            truncated: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_visited_bounds_traversal() {
        assert!(MAX_VISITED > 0);
    }
}
