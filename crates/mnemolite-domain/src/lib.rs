//! # Domain Layer
//!
//! Core business entities, port traits, and error types for MnemoLite's
//! retrieval and indexing engine. Pure domain: no infrastructure, no
//! concrete providers, no I/O beyond what the port traits declare.
//!
//! | Component | Module |
//! |-----------|--------|
//! | Event/Memory Core (C4) data model | [`entities`] |
//! | Store Gateway (C1) | [`ports::StoreGateway`] |
//! | Embedding Provider (C2) | [`ports::EmbeddingProvider`] |
//! | Circuit Breaker + Cache (C3) | [`ports::CircuitBreaker`], [`ports::CacheProvider`] |
//! | Code Chunker (C5) | [`ports::ChunkingStrategy`] |
//! | Metadata Extractor (C6) | [`ports::MetadataExtractor`] |
//! | Graph Builder (C7) | [`ports::GraphBuilder`] |
//! | Hybrid Search (C9) | [`ports::HybridSearchProvider`] |
//! | Graph Traversal (C10) | [`ports::GraphTraversal`] |

/// Core business entities with identity.
pub mod entities;
/// Domain error types.
pub mod error;
/// External provider port interfaces.
pub mod ports;
/// Cross-cutting utilities.
pub mod utils;

pub use entities::*;
pub use error::{Error, Result};
