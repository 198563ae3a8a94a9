//! Graph Builder port (C7)

use crate::entities::{CodeChunk, GraphEdge, GraphNode};
use crate::ports::ExtractedMetadata;

/// A node/edge delta for a single file, ready to stage through the Store
/// Gateway in one transaction (file-atomic, §4.7).
#[derive(Debug, Clone, Default)]
pub struct GraphDelta {
    /// Nodes to upsert: one per chunk, plus zero or one module node for
    /// barrels/configs.
    pub nodes: Vec<GraphNode>,
    /// Edges to upsert, deduplicated by `(source, target, type)` within
    /// this delta (the Store Gateway coalesces across deltas).
    pub edges: Vec<GraphEdge>,
}

/// Produces a `GraphDelta` from a file's chunks and their extracted
/// metadata.
pub trait GraphBuilder: Send + Sync {
    /// Build the delta for one file. `chunks` and `metadata` are aligned by
    /// index.
    fn build_delta(
        &self,
        repository: &str,
        chunks: &[CodeChunk],
        metadata: &[ExtractedMetadata],
    ) -> GraphDelta;
}
