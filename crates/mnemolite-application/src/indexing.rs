//! Indexing Orchestrator (C8)
//!
//! Drives the seven-stage pipeline over a repository's files:
//! `enumerate -> classify -> chunk (C5) -> extract (C6) -> embed (C2) ->
//! persist chunks (C1) -> build+persist graph (C7) -> record outcome`.
//!
//! Each file is an independent, file-atomic unit of work; a worker pool of
//! configured degree processes files concurrently with no cross-file
//! ordering guarantee (§5). A failure on one file is captured as an
//! [`mnemolite_domain::entities::IndexingError`] and never aborts the run.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use ignore::WalkBuilder;
use mnemolite_domain::entities::{CodeChunk, IndexingError, IndexingErrorKind};
use mnemolite_domain::error::{Error, Result};
use mnemolite_domain::ports::{
    ChunkingStrategy, EmbeddingChannel, EmbeddingProvider, ExtractedMetadata, GraphBuilder, MetadataExtractor,
    StoreGateway,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Per-file classification outcomes that are not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The file was empty.
    Empty,
    /// The chunker classified the file as not chunkable (test file, or an
    /// unrecognized, non-config extension).
    Filtered,
    /// Cancellation was observed before the file's pipeline completed.
    Cancelled,
}

impl SkipReason {
    /// Canonical lower-case name for the indexing summary.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Empty => "empty",
            SkipReason::Filtered => "filtered",
            SkipReason::Cancelled => "cancelled",
        }
    }
}

/// The terminal outcome of one file's pipeline run.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was fully chunked, embedded, and persisted.
    Done {
        /// Number of chunks persisted for this file.
        chunks: usize,
        /// Number of graph nodes persisted for this file.
        nodes: usize,
        /// Number of graph edges persisted for this file.
        edges: usize,
    },
    /// The file was skipped without error.
    Skipped(SkipReason),
    /// The file's pipeline failed at some stage; the error has already
    /// been recorded via [`StoreGateway::record_indexing_error`].
    Failed(IndexingErrorKind),
}

/// Aggregate outcome of one `index_repository` call (§4.8).
#[derive(Debug, Default, Clone)]
pub struct IndexingSummary {
    /// Files that completed the full pipeline.
    pub indexed_files: usize,
    /// Chunks persisted across all completed files.
    pub chunks: usize,
    /// Graph nodes persisted across all completed files.
    pub nodes: usize,
    /// Graph edges persisted across all completed files.
    pub edges: usize,
    /// Skipped-file counts, keyed by [`SkipReason::as_str`].
    pub skipped_by_reason: HashMap<&'static str, usize>,
    /// Failed-file counts, keyed by [`IndexingErrorKind::as_str`].
    pub errors_by_kind: HashMap<&'static str, usize>,
}

impl IndexingSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Done { chunks, nodes, edges } => {
                self.indexed_files += 1;
                self.chunks += chunks;
                self.nodes += nodes;
                self.edges += edges;
            }
            FileOutcome::Skipped(reason) => {
                *self.skipped_by_reason.entry(reason.as_str()).or_insert(0) += 1;
            }
            FileOutcome::Failed(kind) => {
                *self.errors_by_kind.entry(kind.as_str()).or_insert(0) += 1;
            }
        }
    }
}

/// Drives the seven-stage indexing pipeline across a repository's files.
pub struct IndexingOrchestrator {
    chunker: Arc<dyn ChunkingStrategy>,
    extractors: HashMap<String, Arc<dyn MetadataExtractor>>,
    graph_builder: Arc<dyn GraphBuilder>,
    embeddings: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn StoreGateway>,
    concurrency: usize,
    embed_batch_size: usize,
}

impl IndexingOrchestrator {
    /// Build an orchestrator. `extractors` is the language-dispatch
    /// registry (§4.6): languages without a registered extractor fall back
    /// to `ExtractedMetadata::default()`, carrying only the universal
    /// chunk fields forward.
    #[must_use]
    pub fn new(
        chunker: Arc<dyn ChunkingStrategy>,
        extractors: HashMap<String, Arc<dyn MetadataExtractor>>,
        graph_builder: Arc<dyn GraphBuilder>,
        embeddings: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn StoreGateway>,
        concurrency: usize,
        embed_batch_size: usize,
    ) -> Self {
        Self {
            chunker,
            extractors,
            graph_builder,
            embeddings,
            store,
            concurrency: concurrency.max(1),
            embed_batch_size: embed_batch_size.max(1),
        }
    }

    /// Index every file under `root` into `repository`, honoring
    /// `cancel` at each stage boundary. Per-file failures are captured,
    /// not raised; the only error this returns is a failure to even
    /// enumerate the repository's files.
    pub async fn index_repository(
        &self,
        repository: &str,
        root: &Path,
        cancel: CancellationToken,
    ) -> Result<IndexingSummary> {
        let files = self.enumerate_files(root)?;
        info!(repository, file_count = files.len(), "starting repository index");

        let outcomes: Vec<FileOutcome> = stream::iter(files)
            .map(|abs_path| {
                let cancel = cancel.clone();
                async move {
                    let rel_path = abs_path
                        .strip_prefix(root)
                        .unwrap_or(&abs_path)
                        .to_string_lossy()
                        .replace('\\', "/");
                    self.process_file(repository, &abs_path, &rel_path, &cancel).await
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = IndexingSummary::default();
        for outcome in &outcomes {
            summary.record(outcome);
        }
        info!(
            repository,
            indexed_files = summary.indexed_files,
            chunks = summary.chunks,
            errors = summary.errors_by_kind.values().sum::<usize>(),
            "repository index complete"
        );
        Ok(summary)
    }

    fn enumerate_files(&self, root: &Path) -> Result<Vec<std::path::PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkBuilder::new(root).hidden(false).build() {
            let entry = entry.map_err(|e| Error::io(format!("walking {}: {e}", root.display())))?;
            if entry.file_type().is_some_and(|ft| ft.is_file()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    async fn process_file(
        &self,
        repository: &str,
        abs_path: &Path,
        rel_path: &str,
        cancel: &CancellationToken,
    ) -> FileOutcome {
        if cancel.is_cancelled() {
            return FileOutcome::Skipped(SkipReason::Cancelled);
        }

        let content = match tokio::fs::read(abs_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.record_error(repository, rel_path, IndexingErrorKind::Encoding, e.to_string())
                    .await;
                return FileOutcome::Failed(IndexingErrorKind::Encoding);
            }
        };
        if content.is_empty() {
            return FileOutcome::Skipped(SkipReason::Empty);
        }

        let chunks = match self.chunker.chunk_file(repository, rel_path, &content).await {
            Ok(chunks) => chunks,
            Err(e) => {
                let kind = match &e {
                    Error::EncodingError { .. } => IndexingErrorKind::Encoding,
                    Error::ParseError { .. } => IndexingErrorKind::Parse,
                    _ => IndexingErrorKind::Chunking,
                };
                self.record_error(repository, rel_path, kind, e.to_string()).await;
                return FileOutcome::Failed(kind);
            }
        };
        if chunks.is_empty() {
            return FileOutcome::Skipped(SkipReason::Filtered);
        }
        if cancel.is_cancelled() {
            return FileOutcome::Skipped(SkipReason::Cancelled);
        }

        let metadata: Vec<ExtractedMetadata> = chunks
            .iter()
            .map(|chunk| {
                self.extractors
                    .get(&chunk.language)
                    .map(|extractor| extractor.extract(chunk))
                    .unwrap_or_default()
            })
            .collect();

        if cancel.is_cancelled() {
            return FileOutcome::Skipped(SkipReason::Cancelled);
        }

        let embedded_chunks = match self.embed_chunks(chunks).await {
            Ok(chunks) => chunks,
            Err(e) => {
                self.record_error(repository, rel_path, IndexingErrorKind::Embedding, e.to_string())
                    .await;
                return FileOutcome::Failed(IndexingErrorKind::Embedding);
            }
        };

        if cancel.is_cancelled() {
            return FileOutcome::Skipped(SkipReason::Cancelled);
        }

        if let Err(e) = self.store.upsert_chunks(repository, rel_path, &embedded_chunks).await {
            self.record_error(repository, rel_path, IndexingErrorKind::Persistence, e.to_string())
                .await;
            return FileOutcome::Failed(IndexingErrorKind::Persistence);
        }

        let delta = self.graph_builder.build_delta(repository, &embedded_chunks, &metadata);
        let node_count = delta.nodes.len();
        let edge_count = delta.edges.len();
        if let Err(e) = self.store.upsert_graph_delta(&delta.nodes, &delta.edges).await {
            self.record_error(repository, rel_path, IndexingErrorKind::Persistence, e.to_string())
                .await;
            return FileOutcome::Failed(IndexingErrorKind::Persistence);
        }

        FileOutcome::Done {
            chunks: embedded_chunks.len(),
            nodes: node_count,
            edges: edge_count,
        }
    }

    /// Embed every chunk's text and code channels, batching requests up to
    /// `embed_batch_size` items per call (§4.8's backpressure rule). A
    /// single file's chunk count bounds each batch; a file producing more
    /// chunks than `embed_batch_size` is embedded over several calls.
    async fn embed_chunks(&self, mut chunks: Vec<CodeChunk>) -> Result<Vec<CodeChunk>> {
        let code_inputs: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let text_inputs: Vec<String> = chunks.iter().map(chunk_text_proxy).collect();

        let code_embeddings = self.embed_batched(EmbeddingChannel::Code, &code_inputs).await?;
        let text_embeddings = self.embed_batched(EmbeddingChannel::Text, &text_inputs).await?;

        for ((chunk, code_vec), text_vec) in chunks.iter_mut().zip(code_embeddings).zip(text_embeddings) {
            chunk.embedding_code = Some(code_vec);
            chunk.embedding_text = Some(text_vec);
        }
        Ok(chunks)
    }

    async fn embed_batched(&self, channel: EmbeddingChannel, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(self.embed_batch_size) {
            let embedded = self.embeddings.embed_batch(channel, batch).await?;
            out.extend(embedded);
        }
        Ok(out)
    }

    async fn record_error(&self, repository: &str, file_path: &str, kind: IndexingErrorKind, message: String) {
        warn!(repository, file_path, kind = %kind, message, "indexing error");
        let error = IndexingError {
            repository: repository.to_string(),
            file_path: file_path.to_string(),
            kind,
            message,
            context: None,
            occurred_at: Utc::now(),
            chunk_type: None,
            language: None,
        };
        if let Err(e) = self.store.record_indexing_error(&error).await {
            warn!(repository, file_path, error = %e, "failed to record indexing error");
        }
    }

    /// Remove every chunk, node, and edge owned by `repository`, atomically
    /// (§4.5's explicit repository purge; delegated straight to the Store
    /// Gateway, which owns the atomic delete).
    pub async fn purge_repository(&self, repository: &str) -> Result<()> {
        self.store.purge_repository(repository).await
    }
}

/// A natural-language proxy text for the text embedding channel: the
/// chunk's name path read as a phrase. Real docstring extraction belongs to
/// the Metadata Extractor (C6); this orchestrator only guarantees every
/// chunk gets *some* text-channel embedding so hybrid search's lexical/
/// vector fusion always has a candidate on both channels.
fn chunk_text_proxy(chunk: &CodeChunk) -> String {
    if chunk.name_path.is_empty() {
        chunk.file_path.clone()
    } else {
        chunk.name_path.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mnemolite_domain::entities::{ChunkType, SourceSpan};
    use mnemolite_domain::ports::GraphDelta;
    use std::sync::Mutex;

    struct FixedChunker {
        chunks: Vec<CodeChunk>,
    }

    #[async_trait]
    impl ChunkingStrategy for FixedChunker {
        async fn chunk_file(&self, _repository: &str, _file_path: &str, _content: &[u8]) -> Result<Vec<CodeChunk>> {
            Ok(self.chunks.clone())
        }
    }

    struct NoopGraphBuilder;
    impl GraphBuilder for NoopGraphBuilder {
        fn build_delta(&self, _repository: &str, chunks: &[CodeChunk], _metadata: &[ExtractedMetadata]) -> GraphDelta {
            GraphDelta {
                nodes: chunks
                    .iter()
                    .map(|c| mnemolite_domain::entities::GraphNode {
                        id: c.id.clone(),
                        node_type: mnemolite_domain::entities::NodeType::Symbol,
                        label: c.id.clone(),
                        properties: serde_json::json!({}),
                    })
                    .collect(),
                edges: Vec::new(),
            }
        }
    }

    struct MockEmbeddings;
    #[async_trait]
    impl EmbeddingProvider for MockEmbeddings {
        async fn embed(&self, _channel: EmbeddingChannel, _input: &str) -> Result<Vec<f32>> {
            Ok(vec![0.0; 4])
        }
        async fn embed_batch(&self, _channel: EmbeddingChannel, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(inputs.iter().map(|_| vec![0.0; 4]).collect())
        }
        fn dimension(&self) -> usize {
            4
        }
        fn is_mock(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        upserted_chunks: Mutex<usize>,
        errors: Mutex<usize>,
    }

    #[async_trait]
    impl StoreGateway for RecordingStore {
        async fn migrate(&self) -> Result<()> {
            Ok(())
        }
        async fn insert_event(&self, _event: &mnemolite_domain::entities::Event) -> Result<()> {
            Ok(())
        }
        async fn get_event(&self, _id: uuid::Uuid) -> Result<Option<mnemolite_domain::entities::Event>> {
            Ok(None)
        }
        async fn tombstone_event(&self, _id: uuid::Uuid) -> Result<()> {
            Ok(())
        }
        async fn list_events(
            &self,
            _filter: &mnemolite_domain::entities::MemoryFilter,
            _limit: usize,
            _cursor: Option<&mnemolite_domain::ports::Cursor>,
        ) -> Result<(Vec<mnemolite_domain::entities::Event>, Option<mnemolite_domain::ports::Cursor>)> {
            Ok((Vec::new(), None))
        }
        async fn find_by_fingerprint(
            &self,
            _fingerprint: &str,
            _now: chrono::DateTime<Utc>,
            _within: chrono::Duration,
        ) -> Result<Option<mnemolite_domain::entities::Event>> {
            Ok(None)
        }
        async fn get_memory(&self, _id: uuid::Uuid) -> Result<Option<mnemolite_domain::entities::Memory>> {
            Ok(None)
        }
        async fn upsert_project(&self, _slug: &str, _origin_path: Option<&str>) -> Result<()> {
            Ok(())
        }
        async fn upsert_chunks(&self, _repository: &str, _file_path: &str, chunks: &[CodeChunk]) -> Result<()> {
            *self.upserted_chunks.lock().unwrap_or_else(std::sync::PoisonError::into_inner) += chunks.len();
            Ok(())
        }
        async fn upsert_graph_delta(
            &self,
            _nodes: &[mnemolite_domain::entities::GraphNode],
            _edges: &[mnemolite_domain::entities::GraphEdge],
        ) -> Result<()> {
            Ok(())
        }
        async fn record_indexing_error(&self, _error: &IndexingError) -> Result<()> {
            *self.errors.lock().unwrap_or_else(std::sync::PoisonError::into_inner) += 1;
            Ok(())
        }
        async fn purge_repository(&self, _repository: &str) -> Result<()> {
            Ok(())
        }
        async fn lexical_search(
            &self,
            _query: &str,
            _filters: &mnemolite_domain::ports::SearchFilters,
            _top_k: usize,
        ) -> Result<Vec<(CodeChunk, f64)>> {
            Ok(Vec::new())
        }
        async fn vector_search(
            &self,
            _embedding: &[f32],
            _filters: &mnemolite_domain::ports::SearchFilters,
            _top_k: usize,
        ) -> Result<Vec<(CodeChunk, f64)>> {
            Ok(Vec::new())
        }
        async fn edges_for_node(
            &self,
            _node_id: &str,
            _edge_types: &[mnemolite_domain::entities::EdgeType],
            _direction: mnemolite_domain::ports::Direction,
        ) -> Result<Vec<mnemolite_domain::entities::GraphEdge>> {
            Ok(Vec::new())
        }
        async fn nodes_by_id(&self, _ids: &[String]) -> Result<Vec<mnemolite_domain::entities::GraphNode>> {
            Ok(Vec::new())
        }
        async fn lexical_search_memories(
            &self,
            _query: &str,
            _filter: &mnemolite_domain::entities::MemoryFilter,
            _top_k: usize,
        ) -> Result<Vec<(mnemolite_domain::entities::Event, f64)>> {
            Ok(Vec::new())
        }
        async fn vector_search_memories(
            &self,
            _embedding: &[f32],
            _filter: &mnemolite_domain::entities::MemoryFilter,
            _top_k: usize,
        ) -> Result<Vec<(mnemolite_domain::entities::Event, f64)>> {
            Ok(Vec::new())
        }
        async fn reconcile_graph_integrity(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn chunk(id: &str) -> CodeChunk {
        CodeChunk {
            id: id.to_string(),
            repository: "repo".into(),
            file_path: "src/lib.rs".into(),
            language: "rust".into(),
            chunk_type: ChunkType::Function,
            content: "fn f() {}".into(),
            content_hash: "hash".into(),
            embedding_text: None,
            embedding_code: None,
            name_path: vec!["f".into()],
            span: SourceSpan { line_start: 1, line_end: 1 },
            metadata: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn indexes_a_temp_repository_and_embeds_every_chunk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib.rs"), b"fn f() {}").unwrap();

        let store = Arc::new(RecordingStore::default());
        let orchestrator = IndexingOrchestrator::new(
            Arc::new(FixedChunker { chunks: vec![chunk("c1")] }),
            HashMap::new(),
            Arc::new(NoopGraphBuilder),
            Arc::new(MockEmbeddings),
            store.clone(),
            2,
            16,
        );

        let summary = orchestrator
            .index_repository("repo", dir.path(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.indexed_files, 1);
        assert_eq!(summary.chunks, 1);
        assert_eq!(*store.upserted_chunks.lock().unwrap(), 1);
        assert_eq!(*store.errors.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_file_is_skipped_not_failed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty.rs"), b"").unwrap();

        let store = Arc::new(RecordingStore::default());
        let orchestrator = IndexingOrchestrator::new(
            Arc::new(FixedChunker { chunks: vec![chunk("c1")] }),
            HashMap::new(),
            Arc::new(NoopGraphBuilder),
            Arc::new(MockEmbeddings),
            store,
            2,
            16,
        );

        let summary = orchestrator
            .index_repository("repo", dir.path(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.indexed_files, 0);
        assert_eq!(summary.skipped_by_reason.get("empty"), Some(&1));
    }
}
