//! HTTP-backed embedding provider (`embedding_mode = real`).
//!
//! Speaks a minimal OpenAI-compatible embeddings contract
//! (`POST {base_url}/embeddings`, `{"model", "input"}` →
//! `{"data": [{"embedding": [...]}]}`), which is what every common
//! self-hosted embedding gateway (Ollama, vLLM, TEI) already exposes. Each
//! channel (text/code) is configured with its own base URL and model name,
//! treated as two independent models rather than one.

use async_trait::async_trait;
use mnemolite_domain::error::{Error, Result};
use mnemolite_domain::ports::{EmbeddingChannel, EmbeddingProvider};
use serde::{Deserialize, Serialize};

/// Per-channel HTTP embedding endpoint configuration.
#[derive(Debug, Clone)]
pub struct ChannelEndpoint {
    /// Base URL of the embedding gateway, without a trailing slash.
    pub base_url: String,
    /// Model name passed in the request body.
    pub model: String,
}

/// Maximum input length, in UTF-8 characters, before the documented prefix
/// truncation kicks in. Conservative relative to typical 512-token windows.
const MAX_INPUT_CHARS: usize = 8000;

/// HTTP-backed embedding provider for both channels.
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    text: ChannelEndpoint,
    code: ChannelEndpoint,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl HttpEmbeddingProvider {
    /// Build a provider with explicit per-channel endpoints and the
    /// process-wide configured dimension.
    #[must_use]
    pub fn new(text: ChannelEndpoint, code: ChannelEndpoint, dimension: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            text,
            code,
            dimension,
        }
    }

    fn endpoint(&self, channel: EmbeddingChannel) -> &ChannelEndpoint {
        match channel {
            EmbeddingChannel::Text => &self.text,
            EmbeddingChannel::Code => &self.code,
        }
    }

    /// Deterministic prefix truncation: longer-than-window inputs are cut
    /// to `MAX_INPUT_CHARS`, preserving the start of the text (the part
    /// most informative for both docstrings and code signatures).
    fn truncate(input: &str) -> String {
        if input.chars().count() <= MAX_INPUT_CHARS {
            input.to_string()
        } else {
            input.chars().take(MAX_INPUT_CHARS).collect()
        }
    }

    async fn call(&self, channel: EmbeddingChannel, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let endpoint = self.endpoint(channel);
        let truncated: Vec<String> = inputs.iter().map(|s| Self::truncate(s)).collect();
        let body = EmbeddingRequest {
            model: &endpoint.model,
            input: &truncated,
        };
        let response = self
            .client
            .post(format!("{}/embeddings", endpoint.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::embed_unavailable(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::embed_unavailable(format!(
                "embedding endpoint returned {}",
                response.status()
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::embed_unavailable(format!("malformed embedding response: {e}")))?;

        let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|d| d.embedding).collect();
        for v in &vectors {
            if v.len() != self.dimension {
                return Err(Error::embed_unavailable(format!(
                    "embedding dimension mismatch: expected {}, got {}",
                    self.dimension,
                    v.len()
                )));
            }
        }
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, channel: EmbeddingChannel, input: &str) -> Result<Vec<f32>> {
        let mut vectors = self.call(channel, std::slice::from_ref(&input.to_string())).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::embed_unavailable("embedding endpoint returned no vectors"))
    }

    async fn embed_batch(
        &self,
        channel: EmbeddingChannel,
        inputs: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        self.call(channel, inputs).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_input_untouched() {
        assert_eq!(HttpEmbeddingProvider::truncate("short"), "short");
    }

    #[test]
    fn truncate_cuts_long_input_to_the_prefix() {
        let long: String = "x".repeat(MAX_INPUT_CHARS + 500);
        let truncated = HttpEmbeddingProvider::truncate(&long);
        assert_eq!(truncated.chars().count(), MAX_INPUT_CHARS);
        assert!(long.starts_with(&truncated));
    }
}
