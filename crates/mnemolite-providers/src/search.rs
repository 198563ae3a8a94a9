//! Hybrid Search (C9) implementation.
//!
//! Fuses the Store Gateway's lexical and vector candidate channels with
//! Reciprocal Rank Fusion, gates the vector channel behind its circuit
//! breaker, and honors the caller's deadline by returning whichever channel
//! finished when time runs out (§4.9).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mnemolite_domain::entities::{CodeChunk, Event, MemoryFilter, MemorySearchResult};
use mnemolite_domain::error::{Error, Result};
use mnemolite_domain::ports::{
    ChannelStatus, CircuitBreaker, EmbeddingChannel, EmbeddingProvider, FusedResult, HybridSearchProvider,
    MemorySearchResponse, SearchFilters, SearchResponse, StoreGateway,
};

/// Default RRF rank-smoothing constant (§4.9).
pub const DEFAULT_RRF_K0: f64 = 60.0;

/// Store-backed hybrid search fusing lexical and vector channels via RRF.
pub struct RrfHybridSearch {
    store: Arc<dyn StoreGateway>,
    embeddings: Arc<dyn EmbeddingProvider>,
    vector_breaker: Arc<dyn CircuitBreaker>,
    lexical_top_k: usize,
    vector_top_k: usize,
    rrf_k0: f64,
}

impl RrfHybridSearch {
    /// Build a hybrid search provider over `store`, embedding the query
    /// text through `embeddings`'s code channel, admitting the vector
    /// channel only while `vector_breaker` is closed.
    #[must_use]
    pub fn new(
        store: Arc<dyn StoreGateway>,
        embeddings: Arc<dyn EmbeddingProvider>,
        vector_breaker: Arc<dyn CircuitBreaker>,
        lexical_top_k: usize,
        vector_top_k: usize,
        rrf_k0: f64,
    ) -> Self {
        Self {
            store,
            embeddings,
            vector_breaker,
            lexical_top_k,
            vector_top_k,
            rrf_k0,
        }
    }

    fn remaining(deadline: Instant) -> Duration {
        deadline.saturating_duration_since(Instant::now())
    }

    async fn run_lexical(&self, query: &str, filters: &SearchFilters) -> Result<Vec<(CodeChunk, f64)>> {
        self.store.lexical_search(query, filters, self.lexical_top_k).await
    }

    async fn run_vector(&self, query: &str, filters: &SearchFilters) -> Result<Vec<(CodeChunk, f64)>> {
        let embedding = self.embeddings.embed(EmbeddingChannel::Code, query).await?;
        self.store.vector_search(&embedding, filters, self.vector_top_k).await
    }

    fn fuse(
        &self,
        lexical: &[(CodeChunk, f64)],
        vector: &[(CodeChunk, f64)],
    ) -> Vec<FusedResult> {
        let mut lexical_ranks: HashMap<String, usize> = HashMap::new();
        let mut lexical_scores: HashMap<String, f64> = HashMap::new();
        let mut vector_ranks: HashMap<String, usize> = HashMap::new();
        let mut by_id: HashMap<String, CodeChunk> = HashMap::new();

        for (rank, (chunk, score)) in lexical.iter().enumerate() {
            lexical_ranks.insert(chunk.id.clone(), rank + 1);
            lexical_scores.insert(chunk.id.clone(), *score);
            by_id.entry(chunk.id.clone()).or_insert_with(|| chunk.clone());
        }
        for (rank, (chunk, _score)) in vector.iter().enumerate() {
            vector_ranks.insert(chunk.id.clone(), rank + 1);
            by_id.entry(chunk.id.clone()).or_insert_with(|| chunk.clone());
        }

        let mut results: Vec<FusedResult> = by_id
            .into_iter()
            .map(|(id, chunk)| {
                let lexical_rank = lexical_ranks.get(&id).copied();
                let vector_rank = vector_ranks.get(&id).copied();
                let fused_score = lexical_rank.map_or(0.0, |r| 1.0 / (self.rrf_k0 + r as f64))
                    + vector_rank.map_or(0.0, |r| 1.0 / (self.rrf_k0 + r as f64));
                FusedResult {
                    chunk,
                    fused_score,
                    lexical_rank,
                    vector_rank,
                }
            })
            .collect();

        // §4.9 step 3: "Tie-break on lexical score, then identifier ascending".
        results.sort_by(|a, b| {
            b.fused_score
                .partial_cmp(&a.fused_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let a_score = lexical_scores.get(&a.chunk.id).copied().unwrap_or(0.0);
                    let b_score = lexical_scores.get(&b.chunk.id).copied().unwrap_or(0.0);
                    b_score.partial_cmp(&a_score).unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        results
    }

    async fn run_lexical_memories(&self, query: &str, filter: &MemoryFilter) -> Result<Vec<(Event, f64)>> {
        self.store.lexical_search_memories(query, filter, self.lexical_top_k).await
    }

    async fn run_vector_memories(&self, query: &str, filter: &MemoryFilter) -> Result<Vec<(Event, f64)>> {
        let embedding = self.embeddings.embed(EmbeddingChannel::Text, query).await?;
        self.store.vector_search_memories(&embedding, filter, self.vector_top_k).await
    }

    fn fuse_memories(&self, lexical: &[(Event, f64)], vector: &[(Event, f64)]) -> Vec<MemorySearchResult> {
        let mut lexical_ranks: HashMap<uuid::Uuid, usize> = HashMap::new();
        let mut lexical_scores: HashMap<uuid::Uuid, f64> = HashMap::new();
        let mut vector_ranks: HashMap<uuid::Uuid, usize> = HashMap::new();
        let mut by_id: HashMap<uuid::Uuid, Event> = HashMap::new();

        for (rank, (event, score)) in lexical.iter().enumerate() {
            lexical_ranks.insert(event.id, rank + 1);
            lexical_scores.insert(event.id, *score);
            by_id.entry(event.id).or_insert_with(|| event.clone());
        }
        for (rank, (event, _score)) in vector.iter().enumerate() {
            vector_ranks.insert(event.id, rank + 1);
            by_id.entry(event.id).or_insert_with(|| event.clone());
        }

        let mut results: Vec<MemorySearchResult> = by_id
            .into_iter()
            .map(|(id, event)| {
                let lexical_rank = lexical_ranks.get(&id).copied();
                let vector_rank = vector_ranks.get(&id).copied();
                let fused_score = lexical_rank.map_or(0.0, |r| 1.0 / (self.rrf_k0 + r as f64))
                    + vector_rank.map_or(0.0, |r| 1.0 / (self.rrf_k0 + r as f64));
                MemorySearchResult {
                    memory: crate::projection::event_to_memory(&event),
                    fused_score,
                    lexical_rank,
                    vector_rank,
                }
            })
            .collect();

        // §4.9 step 3: "Tie-break on lexical score, then identifier ascending".
        results.sort_by(|a, b| {
            b.fused_score
                .partial_cmp(&a.fused_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let a_score = lexical_scores.get(&a.memory.id).copied().unwrap_or(0.0);
                    let b_score = lexical_scores.get(&b.memory.id).copied().unwrap_or(0.0);
                    b_score.partial_cmp(&a_score).unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.memory.id.cmp(&b.memory.id))
        });
        results
    }
}

#[async_trait]
impl HybridSearchProvider for RrfHybridSearch {
    async fn search_code(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
        deadline: Instant,
    ) -> Result<SearchResponse> {
        if Self::remaining(deadline).is_zero() {
            return Err(Error::DeadlineExceeded);
        }

        let vector_admitted = self.vector_breaker.try_acquire();

        let lexical_fut = self.run_lexical(query, filters);
        let vector_fut = async {
            match &vector_admitted {
                Ok(_) => Some(self.run_vector(query, filters).await),
                Err(_) => None,
            }
        };

        let remaining = Self::remaining(deadline);
        let (lexical_result, vector_result) = tokio::time::timeout(remaining, async { (lexical_fut.await, vector_fut.await) })
            .await
            .unwrap_or((Err(Error::DeadlineExceeded), None));

        let partial = Self::remaining(deadline).is_zero();

        let degraded = vector_admitted.is_err();
        if let Ok(permit) = vector_admitted {
            match &vector_result {
                Some(Ok(_)) => self.vector_breaker.record_success(),
                Some(Err(_)) => self.vector_breaker.record_failure(),
                None => {
                    if permit.is_probe {
                        self.vector_breaker.record_failure();
                    }
                }
            }
        }

        let (lexical, lexical_status) = match lexical_result {
            Ok(rows) => (rows, ChannelStatus::Ok),
            Err(Error::DeadlineExceeded) => (Vec::new(), ChannelStatus::Partial),
            Err(_) => (Vec::new(), ChannelStatus::Failed),
        };

        let (vector, vector_status) = match vector_result {
            Some(Ok(rows)) => (rows, ChannelStatus::Ok),
            Some(Err(_)) => (Vec::new(), ChannelStatus::Failed),
            None if degraded => (Vec::new(), ChannelStatus::Degraded),
            None => (Vec::new(), ChannelStatus::Partial),
        };

        if matches!(lexical_status, ChannelStatus::Failed) && matches!(vector_status, ChannelStatus::Failed | ChannelStatus::Degraded) {
            return Err(Error::retrieval_unavailable("both lexical and vector channels failed"));
        }

        let mut fused = self.fuse(&lexical, &vector);
        fused.truncate(limit);

        Ok(SearchResponse {
            results: fused,
            degraded,
            partial,
            lexical_status,
            vector_status,
        })
    }

    async fn search_memories(
        &self,
        query: &str,
        filter: &MemoryFilter,
        limit: usize,
        deadline: Instant,
    ) -> Result<MemorySearchResponse> {
        if Self::remaining(deadline).is_zero() {
            return Err(Error::DeadlineExceeded);
        }

        let vector_admitted = self.vector_breaker.try_acquire();

        let lexical_fut = self.run_lexical_memories(query, filter);
        let vector_fut = async {
            match &vector_admitted {
                Ok(_) => Some(self.run_vector_memories(query, filter).await),
                Err(_) => None,
            }
        };

        let remaining = Self::remaining(deadline);
        let (lexical_result, vector_result) = tokio::time::timeout(remaining, async { (lexical_fut.await, vector_fut.await) })
            .await
            .unwrap_or((Err(Error::DeadlineExceeded), None));

        let partial = Self::remaining(deadline).is_zero();

        let degraded = vector_admitted.is_err();
        if let Ok(permit) = vector_admitted {
            match &vector_result {
                Some(Ok(_)) => self.vector_breaker.record_success(),
                Some(Err(_)) => self.vector_breaker.record_failure(),
                None => {
                    if permit.is_probe {
                        self.vector_breaker.record_failure();
                    }
                }
            }
        }

        let (lexical, lexical_status) = match lexical_result {
            Ok(rows) => (rows, ChannelStatus::Ok),
            Err(Error::DeadlineExceeded) => (Vec::new(), ChannelStatus::Partial),
            Err(_) => (Vec::new(), ChannelStatus::Failed),
        };

        let (vector, vector_status) = match vector_result {
            Some(Ok(rows)) => (rows, ChannelStatus::Ok),
            Some(Err(_)) => (Vec::new(), ChannelStatus::Failed),
            None if degraded => (Vec::new(), ChannelStatus::Degraded),
            None => (Vec::new(), ChannelStatus::Partial),
        };

        if matches!(lexical_status, ChannelStatus::Failed) && matches!(vector_status, ChannelStatus::Failed | ChannelStatus::Degraded) {
            return Err(Error::retrieval_unavailable("both lexical and vector channels failed"));
        }

        let mut fused = self.fuse_memories(&lexical, &vector);
        fused.truncate(limit);

        Ok(MemorySearchResponse {
            results: fused,
            degraded,
            partial,
            lexical_status,
            vector_status,
        })
    }
}
