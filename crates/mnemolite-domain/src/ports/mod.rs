//! Domain port interfaces
//!
//! Ports define the contracts that the providers/infrastructure layers
//! implement. Each component in §4 of the design exposes exactly one port
//! here; composition happens at the explicit root in
//! `mnemolite_infrastructure::composition`, never through a registry.

mod breaker;
mod cache;
mod chunker;
mod embedding;
mod graph_builder;
mod graph_traversal;
mod hybrid_search;
mod metadata_extractor;
mod store_gateway;

pub use breaker::{BreakerPermit, BreakerState, CircuitBreaker};
pub use cache::{CacheKey, CacheProvider};
pub use chunker::ChunkingStrategy;
pub use embedding::{EmbeddingChannel, EmbeddingProvider};
pub use graph_builder::{GraphBuilder, GraphDelta};
pub use graph_traversal::{Direction, GraphTraversal, NeighborsResult, ShortestPathResult};
pub use hybrid_search::{
    ChannelStatus, FusedResult, HybridSearchProvider, MemorySearchResponse, SearchFilters, SearchResponse,
};
pub use metadata_extractor::{ExtractedMetadata, MetadataExtractor, SymbolReference};
pub use store_gateway::{Cursor, StoreGateway};
