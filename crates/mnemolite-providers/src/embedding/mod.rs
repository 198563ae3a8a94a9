//! Embedding Provider (C2) implementations.

mod http;
mod mock;

pub use http::{ChannelEndpoint, HttpEmbeddingProvider};
pub use mock::MockEmbeddingProvider;
