//! Concrete port implementations for MnemoLite.
//!
//! Each module implements exactly one port from
//! [`mnemolite_domain::ports`]; composition into a running service happens
//! at the infrastructure crate's explicit composition root, never here.

/// Store Gateway (C1): Postgres + pgvector.
pub mod store;

/// Embedding Provider (C2): mock and HTTP channels.
pub mod embedding;

/// Circuit Breaker (C3) implementation.
pub mod breaker;

/// Cache (C3) implementation.
pub mod cache;

/// Code Chunker (C5) implementation.
pub mod chunking;

/// Graph Builder (C7) implementation.
pub mod graph_builder;

/// Hybrid Search (C9) implementation.
pub mod search;

/// Graph Traversal (C10) implementation.
pub mod traversal;

mod projection;

pub use breaker::ProcessCircuitBreaker;
pub use cache::MokaCacheProvider;
pub use chunking::TreeSitterChunkingStrategy;
pub use embedding::{ChannelEndpoint, HttpEmbeddingProvider, MockEmbeddingProvider};
pub use graph_builder::SymbolGraphBuilder;
pub use search::RrfHybridSearch;
pub use store::PostgresStoreGateway;
pub use traversal::StoreGraphTraversal;
