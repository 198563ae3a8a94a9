//! Hybrid Search port (C9)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{CodeChunk, MemorySearchResult};
use crate::error::Result;

/// Filters accepted by hybrid search, pushed down to the Store Gateway where
/// possible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Restrict to a repository.
    pub repository: Option<String>,
    /// Restrict to a language tag.
    pub language: Option<String>,
    /// Restrict to a chunk type (see `ChunkType::as_str`).
    pub chunk_type: Option<String>,
    /// Restrict to chunks last touched within this time range.
    pub since: Option<DateTime<Utc>>,
    /// Restrict to this time range's upper bound.
    pub until: Option<DateTime<Utc>>,
    /// Restrict to a memory type (events/memory search only).
    pub memory_type: Option<String>,
    /// Restrict to events/memories carrying all of these tags.
    pub tags: Vec<String>,
    /// Restrict to a project slug.
    pub project: Option<String>,
}

/// Status of one retrieval channel within a response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelStatus {
    /// The channel ran and contributed candidates.
    Ok,
    /// The channel's breaker was open; it was skipped.
    Degraded,
    /// The channel ran out of time before the deadline.
    Partial,
    /// The channel failed outright.
    Failed,
}

/// A fused search result with provenance, independent of the underlying
/// entity kind (code chunk or memory).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedResult {
    /// The matched code chunk.
    pub chunk: CodeChunk,
    /// Fused RRF score.
    pub fused_score: f64,
    /// Lexical rank, when the lexical channel contributed this candidate.
    pub lexical_rank: Option<usize>,
    /// Vector rank, when the vector channel contributed this candidate.
    pub vector_rank: Option<usize>,
}

/// Full response envelope for a hybrid search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Top-K fused results.
    pub results: Vec<FusedResult>,
    /// `true` when the vector channel was skipped (breaker open).
    pub degraded: bool,
    /// `true` when the deadline was reached before both channels finished.
    pub partial: bool,
    /// Per-channel status, for response shaping and diagnostics.
    pub lexical_status: ChannelStatus,
    /// Per-channel status for the vector side.
    pub vector_status: ChannelStatus,
}

/// Full response envelope for a memory hybrid search call, mirroring
/// [`SearchResponse`] over [`MemorySearchResult`] instead of [`CodeChunk`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySearchResponse {
    /// Top-K fused memory results.
    pub results: Vec<MemorySearchResult>,
    /// `true` when the vector channel was skipped (breaker open).
    pub degraded: bool,
    /// `true` when the deadline was reached before both channels finished.
    pub partial: bool,
    /// Per-channel status, for response shaping and diagnostics.
    pub lexical_status: ChannelStatus,
    /// Per-channel status for the vector side.
    pub vector_status: ChannelStatus,
}

/// Unified query planner fusing lexical and vector candidate generation via
/// Reciprocal Rank Fusion (§4.9).
#[async_trait]
pub trait HybridSearchProvider: Send + Sync {
    /// Run a hybrid search for source code chunks.
    ///
    /// Honors the caller's deadline: if the deadline is reached after one
    /// channel completes, returns that channel's ranking with
    /// `partial=true`. If the vector channel's breaker is open, returns
    /// lexical-only ranking with `degraded=true`. If both channels fail,
    /// returns `Error::RetrievalUnavailable`.
    async fn search_code(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
        deadline: std::time::Instant,
    ) -> Result<SearchResponse>;

    /// Run a hybrid search over memory-eligible events, fusing the same way
    /// as `search_code` (§4.4's `search_memories`, §4.9's fusion algorithm).
    async fn search_memories(
        &self,
        query: &str,
        filter: &crate::entities::MemoryFilter,
        limit: usize,
        deadline: std::time::Instant,
    ) -> Result<MemorySearchResponse>;
}
