//! Graph Traversal port (C10)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{EdgeType, GraphEdge, GraphNode};
use crate::error::Result;

/// Direction to traverse edges in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Follow outbound edges only.
    Out,
    /// Follow inbound edges only.
    In,
    /// Follow both.
    Both,
}

/// Result of a `neighbors` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborsResult {
    /// Nodes reached within the depth bound.
    pub nodes: Vec<GraphNode>,
    /// Edges traversed to reach them.
    pub edges: Vec<GraphEdge>,
    /// `true` when the depth bound or a visited-count cap was hit before
    /// the frontier was exhausted.
    pub truncated: bool,
}

/// Result of a `shortest_path` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortestPathResult {
    /// Nodes along the path, in order, including endpoints.
    pub nodes: Vec<GraphNode>,
    /// Edges along the path, in order.
    pub edges: Vec<GraphEdge>,
    /// `true` when no path was found within the depth bound.
    pub truncated: bool,
}

/// Bounded recursive queries over the symbol graph (§4.10).
///
/// Implementations guard against cycles with a visited set rather than
/// relying on the graph itself being acyclic; traversal terminates in time
/// proportional to `|visited| * average_fanout`.
#[async_trait]
pub trait GraphTraversal: Send + Sync {
    /// Bounded BFS/DFS from `node` out to `depth` hops, restricted to
    /// `edge_types`, following `direction`.
    async fn neighbors(
        &self,
        node: &str,
        depth: usize,
        edge_types: &[EdgeType],
        direction: Direction,
    ) -> Result<NeighborsResult>;

    /// Shortest path between `a` and `b` restricted to `edge_types`.
    async fn shortest_path(&self, a: &str, b: &str, edge_types: &[EdgeType]) -> Result<ShortestPathResult>;
}
