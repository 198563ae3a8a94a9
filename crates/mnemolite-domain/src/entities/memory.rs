//! Memory entity
//!
//! A `Memory` is a derived view over one or more [`crate::entities::Event`]
//! records, projected for the higher-level "conversation/knowledge" surface.
//! There is no hidden inheritance between `Event` and `Memory`: the
//! projection is an explicit function (see the application layer's
//! `event_to_memory`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A derived conversation/knowledge artifact.
///
/// Invariant: a memory always resolves to at least one backing event;
/// deleting the last backing event soft-deletes the memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// Identifier, 1-to-1 with the backing event identifier for simple cases.
    pub id: Uuid,
    /// Short title, derived or caller-supplied.
    pub title: String,
    /// Short preview of the content.
    pub preview: String,
    /// Memory type (e.g. `"conversation"`, `"note"`, `"decision"`).
    pub memory_type: String,
    /// Normalized tag set.
    pub tags: Vec<String>,
    /// Author identifier, when known.
    pub author: Option<String>,
    /// Project slug this memory is bound to, when resolved.
    pub project: Option<String>,
    /// Creation timestamp, inherited from the backing event.
    pub created_at: DateTime<Utc>,
    /// Whether the memory is tombstoned.
    pub deleted: bool,
    /// Relevance score, populated only when returned from search.
    pub score: Option<f64>,
}

impl Memory {
    /// Whether this memory is excluded from default listings.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

/// Filters accepted by `list_recent` and `search_memories`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryFilter {
    /// Restrict to a memory type.
    pub memory_type: Option<String>,
    /// Restrict to memories carrying all of these tags.
    pub tags: Vec<String>,
    /// Restrict to a project slug.
    pub project: Option<String>,
    /// Restrict to events created at or after this timestamp.
    pub since: Option<DateTime<Utc>>,
    /// Restrict to events created at or before this timestamp.
    pub until: Option<DateTime<Utc>>,
    /// Include tombstoned memories (default: excluded).
    #[serde(default)]
    pub include_deleted: bool,
}

/// A memory with its fused hybrid-search provenance, returned by
/// `search_memories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySearchResult {
    /// The matched memory.
    pub memory: Memory,
    /// Fused score from Reciprocal Rank Fusion.
    pub fused_score: f64,
    /// Lexical rank, when the lexical channel contributed.
    pub lexical_rank: Option<usize>,
    /// Vector rank, when the vector channel contributed.
    pub vector_rank: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_memory_is_not_deleted() {
        let memory = Memory {
            id: Uuid::new_v4(),
            title: "t".into(),
            preview: "p".into(),
            memory_type: "note".into(),
            tags: vec![],
            author: None,
            project: None,
            created_at: Utc::now(),
            deleted: false,
            score: None,
        };
        assert!(memory.is_active());
    }
}
