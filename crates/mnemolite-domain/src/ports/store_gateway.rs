//! Store Gateway port (C1)
//!
//! The sole path to durable storage. Implementations own a pooled
//! connection, frame every write in a transaction, and enforce the
//! embedding-dimension and partition-key invariants described in §4.1.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    CodeChunk, EdgeType, Event, GraphEdge, GraphNode, IndexingError, Memory, MemoryFilter,
};
use crate::error::Result;

/// Opaque cursor for `list_recent`-style pagination. Implementations encode
/// whatever internal ordering key they need (identifier + timestamp).
pub type Cursor = String;

/// Typed, pooled access to the relational store.
///
/// Every method here acquires a connection with a bounded timeout and,
/// for write methods, runs inside a read-committed-or-stronger transaction.
/// Failure to acquire a connection surfaces as `Error::StoreUnavailable`;
/// a unique-key violation surfaces as `Error::IntegrityConflict`; a vector
/// whose length does not match the configured dimension surfaces as
/// `Error::BadRequest` (checked before the write is attempted).
#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// Run idempotent schema and partition setup. Called once at startup.
    async fn migrate(&self) -> Result<()>;

    /// Insert a new event. Partition-aware: implementations backed by a
    /// range-partitioned `events` table route on `event.ts`.
    async fn insert_event(&self, event: &Event) -> Result<()>;

    /// Fetch a single event by identifier, regardless of tombstone state.
    async fn get_event(&self, id: uuid::Uuid) -> Result<Option<Event>>;

    /// Apply a tombstone to an event's metadata in place.
    async fn tombstone_event(&self, id: uuid::Uuid) -> Result<()>;

    /// List events in descending timestamp order, optionally resuming from
    /// a prior cursor. Returns at most `limit` rows plus the cursor to
    /// continue from, when more rows may exist.
    async fn list_events(
        &self,
        filter: &MemoryFilter,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<(Vec<Event>, Option<Cursor>)>;

    /// Resolve an event by a client-supplied idempotency fingerprint,
    /// restricted to events created within `within` of `now`.
    async fn find_by_fingerprint(
        &self,
        fingerprint: &str,
        now: DateTime<Utc>,
        within: chrono::Duration,
    ) -> Result<Option<Event>>;

    /// Project a memory view for a given event, or `None` if the event is
    /// gone or is not memory-eligible.
    async fn get_memory(&self, id: uuid::Uuid) -> Result<Option<Memory>>;

    /// Upsert a resolved project slug mapping for an origin path.
    async fn upsert_project(&self, slug: &str, origin_path: Option<&str>) -> Result<()>;

    /// Upsert a batch of code chunks for a single file, atomically.
    /// Implementations delete chunks whose fingerprint is no longer present
    /// in `chunks` for the same `(repository, file_path)` pair.
    async fn upsert_chunks(&self, repository: &str, file_path: &str, chunks: &[CodeChunk]) -> Result<()>;

    /// Stage a node/edge delta for a single file inside one transaction
    /// (file-atomic, per §4.7).
    async fn upsert_graph_delta(&self, nodes: &[GraphNode], edges: &[GraphEdge]) -> Result<()>;

    /// Append an indexing failure record.
    async fn record_indexing_error(&self, error: &IndexingError) -> Result<()>;

    /// Remove every chunk, node, and edge owned by `repository`, atomically.
    async fn purge_repository(&self, repository: &str) -> Result<()>;

    /// Lexical candidate query, constrained by filters; returns rows with a
    /// lexical score, ordered best-first.
    async fn lexical_search(
        &self,
        query: &str,
        filters: &super::SearchFilters,
        top_k: usize,
    ) -> Result<Vec<(CodeChunk, f64)>>;

    /// Cosine-distance k-NN query over the code embedding column,
    /// constrained by filters; returns rows with a distance, ordered
    /// closest-first.
    async fn vector_search(
        &self,
        embedding: &[f32],
        filters: &super::SearchFilters,
        top_k: usize,
    ) -> Result<Vec<(CodeChunk, f64)>>;

    /// Fetch outbound or inbound edges for `node_id`, restricted to the
    /// given edge types.
    async fn edges_for_node(
        &self,
        node_id: &str,
        edge_types: &[EdgeType],
        direction: super::Direction,
    ) -> Result<Vec<GraphEdge>>;

    /// Fetch nodes by identifier, in any order.
    async fn nodes_by_id(&self, ids: &[String]) -> Result<Vec<GraphNode>>;

    /// Lexical candidate query over memory-eligible events, constrained by
    /// `filter`; returns rows with a lexical score, ordered best-first.
    async fn lexical_search_memories(
        &self,
        query: &str,
        filter: &crate::entities::MemoryFilter,
        top_k: usize,
    ) -> Result<Vec<(Event, f64)>>;

    /// Cosine-distance k-NN query over the `events.embedding` column,
    /// constrained by `filter`; returns rows with a distance, ordered
    /// closest-first.
    async fn vector_search_memories(
        &self,
        embedding: &[f32],
        filter: &crate::entities::MemoryFilter,
        top_k: usize,
    ) -> Result<Vec<(Event, f64)>>;

    /// Re-derive every edge's endpoints and confirm both still exist among
    /// current node identifiers, for the periodic reconciliation job named
    /// in §6. Returns the identifiers of edges whose endpoints are missing;
    /// implementations do not delete them automatically.
    async fn reconcile_graph_integrity(&self) -> Result<Vec<String>>;
}
