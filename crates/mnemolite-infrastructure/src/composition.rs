//! The explicit composition root (§9 redesign flag)
//!
//! Wires every concrete provider to the port it implements and builds the
//! application layer's use cases over them. No service locator, no
//! registry lookup by string key at call time (the one exception — the
//! Metadata Extractor registry — is keyed once, here, at startup, never
//! re-resolved per request). Everything downstream of [`AppContext::build`]
//! talks only to `Arc<dyn Port>` trait objects.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mnemolite_application::{CachedHybridSearch, CachedTraversal, IndexingOrchestrator, MemoryCore};
use mnemolite_ast_utils::TreeSitterMetadataExtractor;
use mnemolite_domain::error::Result;
use mnemolite_domain::ports::{CircuitBreaker, MetadataExtractor, StoreGateway};
use mnemolite_language_support::LanguageId;
use mnemolite_providers::{
    ChannelEndpoint, HttpEmbeddingProvider, MockEmbeddingProvider, MokaCacheProvider, PostgresStoreGateway,
    ProcessCircuitBreaker, RrfHybridSearch, StoreGraphTraversal, SymbolGraphBuilder, TreeSitterChunkingStrategy,
};

use crate::config::{EmbeddingMode, Settings};

/// Named dependencies guarded by a [`CircuitBreaker`] (§4.3).
const DEPENDENCY_EMBEDDING: &str = "embedding";
const DEPENDENCY_STORE: &str = "store";
const DEPENDENCY_VECTOR: &str = "vector";

/// Every assembled service the server crate needs, built once at startup.
pub struct AppContext {
    /// Resolved configuration, kept for readiness reporting.
    pub settings: Arc<Settings>,
    /// Store Gateway, shared by every use case that touches persistence.
    pub store: Arc<dyn StoreGateway>,
    /// Event/Memory Core (C4).
    pub memory_core: Arc<MemoryCore>,
    /// Indexing Orchestrator (C8).
    pub indexing: Arc<IndexingOrchestrator>,
    /// Hybrid Search orchestration (C9).
    pub search: Arc<CachedHybridSearch>,
    /// Graph Traversal orchestration (C10).
    pub traversal: Arc<CachedTraversal>,
    /// One breaker per named dependency, exposed for readiness reporting.
    pub breakers: HashMap<&'static str, Arc<dyn CircuitBreaker>>,
}

impl AppContext {
    /// Assemble every provider and use case named in [`Settings`].
    ///
    /// # Errors
    /// Returns an error if the Store Gateway cannot connect, or if its
    /// schema migration fails.
    pub async fn build(settings: Settings) -> Result<Self> {
        let settings = Arc::new(settings);

        let store: Arc<dyn StoreGateway> = Arc::new(
            PostgresStoreGateway::connect(
                &settings.database_url,
                settings.db_max_connections,
                Duration::from_millis(settings.db_acquire_timeout_ms),
                settings.embedding_dim,
                settings.partitioning_enabled,
            )
            .await?,
        );
        store.migrate().await?;

        let embedding_breaker: Arc<dyn CircuitBreaker> = Arc::new(ProcessCircuitBreaker::new(
            DEPENDENCY_EMBEDDING,
            settings.breaker_failure_threshold,
            Duration::from_millis(settings.breaker_cooloff_ms),
        ));
        let store_breaker: Arc<dyn CircuitBreaker> = Arc::new(ProcessCircuitBreaker::new(
            DEPENDENCY_STORE,
            settings.breaker_failure_threshold,
            Duration::from_millis(settings.breaker_cooloff_ms),
        ));
        let vector_breaker: Arc<dyn CircuitBreaker> = Arc::new(ProcessCircuitBreaker::new(
            DEPENDENCY_VECTOR,
            settings.breaker_failure_threshold,
            Duration::from_millis(settings.breaker_cooloff_ms),
        ));
        let mut breakers: HashMap<&'static str, Arc<dyn CircuitBreaker>> = HashMap::new();
        breakers.insert(DEPENDENCY_EMBEDDING, Arc::clone(&embedding_breaker));
        breakers.insert(DEPENDENCY_STORE, Arc::clone(&store_breaker));
        breakers.insert(DEPENDENCY_VECTOR, Arc::clone(&vector_breaker));

        let embeddings = build_embedding_provider(&settings)?;

        let cache = Arc::new(MokaCacheProvider::new(
            settings.cache_max_entries,
            Duration::from_millis(settings.cache_ttl_ms),
        ));

        let chunker = Arc::new(TreeSitterChunkingStrategy::new());
        let extractors = build_extractor_registry();
        let graph_builder = Arc::new(SymbolGraphBuilder::new());

        let indexing = Arc::new(IndexingOrchestrator::new(
            chunker,
            extractors,
            graph_builder,
            Arc::clone(&embeddings),
            Arc::clone(&store),
            settings.indexing_concurrency,
            settings.embed_batch_size,
        ));

        let hybrid_search = Arc::new(RrfHybridSearch::new(
            Arc::clone(&store),
            Arc::clone(&embeddings),
            Arc::clone(&vector_breaker),
            settings.lexical_top_k,
            settings.vector_top_k,
            settings.rrf_k0,
        ));
        let search = Arc::new(CachedHybridSearch::new(hybrid_search, Arc::clone(&cache) as Arc<dyn mnemolite_domain::ports::CacheProvider>));

        let graph_traversal = Arc::new(StoreGraphTraversal::new(Arc::clone(&store)));
        let traversal = Arc::new(CachedTraversal::new(
            graph_traversal,
            Arc::clone(&cache) as Arc<dyn mnemolite_domain::ports::CacheProvider>,
        ));

        let memory_core = Arc::new(MemoryCore::new(
            Arc::clone(&store),
            chrono::Duration::milliseconds(settings.idempotency_window_ms),
        ));

        if settings.event_count_partition_threshold > 0 && !settings.partitioning_enabled {
            tracing::info!(
                threshold = settings.event_count_partition_threshold,
                "events table is not partitioned; consider partitioning_enabled once the threshold is approached"
            );
        }

        Ok(Self {
            settings,
            store,
            memory_core,
            indexing,
            search,
            traversal,
            breakers,
        })
    }
}

fn build_embedding_provider(settings: &Settings) -> Result<Arc<dyn mnemolite_domain::ports::EmbeddingProvider>> {
    match settings.embedding_mode {
        EmbeddingMode::Mock => Ok(Arc::new(MockEmbeddingProvider::new(settings.embedding_dim))),
        EmbeddingMode::Real => {
            let text = ChannelEndpoint {
                base_url: settings
                    .embedding_text_base_url
                    .clone()
                    .ok_or_else(|| mnemolite_domain::error::Error::bad_request("embedding_text_base_url is required"))?,
                model: settings
                    .embedding_text_model
                    .clone()
                    .ok_or_else(|| mnemolite_domain::error::Error::bad_request("embedding_text_model is required"))?,
            };
            let code = ChannelEndpoint {
                base_url: settings
                    .embedding_code_base_url
                    .clone()
                    .ok_or_else(|| mnemolite_domain::error::Error::bad_request("embedding_code_base_url is required"))?,
                model: settings
                    .embedding_code_model
                    .clone()
                    .ok_or_else(|| mnemolite_domain::error::Error::bad_request("embedding_code_model is required"))?,
            };
            Ok(Arc::new(HttpEmbeddingProvider::new(text, code, settings.embedding_dim)))
        }
    }
}

/// Build the language-keyed Metadata Extractor registry (§4.6): one
/// `TreeSitterMetadataExtractor` per supported language, keyed by
/// `LanguageId::name`, exactly as the Indexing Orchestrator expects.
fn build_extractor_registry() -> HashMap<String, Arc<dyn MetadataExtractor>> {
    LanguageId::all()
        .iter()
        .map(|&language| {
            let extractor: Arc<dyn MetadataExtractor> = Arc::new(TreeSitterMetadataExtractor::new(language));
            (language.name().to_string(), extractor)
        })
        .collect()
}
