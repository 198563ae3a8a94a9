//! Embedding Provider port (C2)

use async_trait::async_trait;

use crate::error::Result;

/// The two logical embedding channels. Each channel is backed by a single
/// process-wide model instance, owned by the composition root (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingChannel {
    /// Natural language: captions, memories, docstrings.
    Text,
    /// Source code bodies.
    Code,
}

/// Produces unit-normalized dense vectors of a configured dimension.
///
/// Inputs longer than the model's maximum token window are deterministically
/// truncated (implementation documents its prefix strategy). Callers MUST
/// tolerate `Err` by skipping the vector side of retrieval rather than
/// failing the whole request.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single input on the given channel.
    async fn embed(&self, channel: EmbeddingChannel, input: &str) -> Result<Vec<f32>>;

    /// Embed a batch of inputs on the given channel, preserving order.
    /// Implementations may coalesce this into fewer model invocations than
    /// `embed` called in a loop; callers use this for C8's embedding
    /// backpressure batching.
    async fn embed_batch(&self, channel: EmbeddingChannel, inputs: &[String]) -> Result<Vec<Vec<f32>>>;

    /// The configured embedding dimension, process-wide.
    fn dimension(&self) -> usize;

    /// Whether this provider is the deterministic mock (used by tests and
    /// `embedding_mode=mock`).
    fn is_mock(&self) -> bool {
        false
    }
}
