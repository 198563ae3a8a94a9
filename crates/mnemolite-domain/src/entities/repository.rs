//! Repository entity
//!
//! A `Repository` is a logical, implicit grouping: it is never written as a
//! standalone row, but materializes as the set of chunks, nodes, and edges
//! that share its name. `purge(repository)` removes all associated records
//! atomically via the Store Gateway.

use serde::{Deserialize, Serialize};

/// Logical repository identity and indexing summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name, unique within the store.
    pub name: String,
    /// Filesystem root used for the most recent `index_repository` call.
    pub root: String,
    /// Total chunk count as of the most recent indexing run.
    pub chunk_count: u64,
    /// Total node count as of the most recent indexing run.
    pub node_count: u64,
    /// Total edge count as of the most recent indexing run.
    pub edge_count: u64,
}
