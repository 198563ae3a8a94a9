//! Deterministic hash-based embedding provider (`embedding_mode = mock`).
//!
//! Used by tests and by any deployment that wants reproducible vectors
//! without a model dependency. The mapping is a SipHash-style fold over
//! n-grams of the input, normalized to a unit vector, so that identical
//! inputs always embed to the same point and small edits produce nearby
//! but distinct vectors (good enough for exercising the vector channel's
//! code paths without asserting semantic similarity).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use mnemolite_domain::error::Result;
use mnemolite_domain::ports::{EmbeddingChannel, EmbeddingProvider};

/// Deterministic mock embedding provider.
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    /// Build a mock provider for the given configured dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, channel: EmbeddingChannel, input: &str) -> Vec<f32> {
        let salt: u64 = match channel {
            EmbeddingChannel::Text => 0x7465_7874,
            EmbeddingChannel::Code => 0x636f_6465,
        };
        let mut values = vec![0f32; self.dimension];
        for (i, slot) in values.iter_mut().enumerate() {
            let mut hasher = DefaultHasher::new();
            salt.hash(&mut hasher);
            i.hash(&mut hasher);
            input.hash(&mut hasher);
            // Fold the hash into [-1.0, 1.0).
            let bits = hasher.finish();
            *slot = ((bits % 2_000_001) as f32 / 1_000_000.0) - 1.0;
        }
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut values {
                *v /= norm;
            }
        }
        values
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, channel: EmbeddingChannel, input: &str) -> Result<Vec<f32>> {
        Ok(self.embed_one(channel, input))
    }

    async fn embed_batch(
        &self,
        channel: EmbeddingChannel,
        inputs: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        Ok(inputs.iter().map(|s| self.embed_one(channel, s)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_mock(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_input_same_vector() {
        let provider = MockEmbeddingProvider::new(16);
        let a = provider.embed(EmbeddingChannel::Text, "hello").await.unwrap();
        let b = provider.embed(EmbeddingChannel::Text, "hello").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn vector_is_configured_dimension_and_unit_norm() {
        let provider = MockEmbeddingProvider::new(32);
        let v = provider.embed(EmbeddingChannel::Code, "fn main() {}").await.unwrap();
        assert_eq!(v.len(), 32);
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm was {norm}");
    }

    #[tokio::test]
    async fn text_and_code_channels_diverge() {
        let provider = MockEmbeddingProvider::new(16);
        let t = provider.embed(EmbeddingChannel::Text, "same").await.unwrap();
        let c = provider.embed(EmbeddingChannel::Code, "same").await.unwrap();
        assert_ne!(t, c);
    }

    #[tokio::test]
    async fn batch_matches_individual_calls() {
        let provider = MockEmbeddingProvider::new(8);
        let inputs = vec!["a".to_string(), "b".to_string()];
        let batch = provider.embed_batch(EmbeddingChannel::Text, &inputs).await.unwrap();
        for (input, vec) in inputs.iter().zip(batch.iter()) {
            let single = provider.embed(EmbeddingChannel::Text, input).await.unwrap();
            assert_eq!(&single, vec);
        }
    }
}
