//! Core business entities with identity.
//!
//! Entities have identity and are persisted through the Store Gateway port.

/// Atomic, time-ordered event record.
pub mod event;
pub use event::{Event, EventMetadata};

/// Derived conversation/knowledge view over one or more events.
pub mod memory;
pub use memory::{Memory, MemoryFilter, MemorySearchResult};

/// Indexed fragment of source code.
pub mod code_chunk;
pub use code_chunk::{ChunkType, CodeChunk};

/// Symbol graph node and edge entities.
pub mod graph;
pub use graph::{EdgeType, GraphEdge, GraphNode, NodeType};

/// Per-file indexing failure record.
pub mod indexing_error;
pub use indexing_error::{IndexingError, IndexingErrorKind};

/// Logical repository grouping of chunks/nodes/edges.
pub mod repository;
pub use repository::Repository;

/// Logical project container referenced by memories.
pub mod project;
pub use project::Project;
