//! Postgres Store Gateway (C1).
//!
//! Sole path to durable storage, backed by `sqlx`'s Postgres driver and the
//! `pgvector` extension. Grounded on the enrichment corpus's
//! `postgres_store.rs` upsert-by-delta pattern (see `DESIGN.md`), adapted
//! to the `events`/`nodes`/`edges`/`code_chunks`/`indexing_errors` schema
//! (§6).

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mnemolite_domain::entities::{
    ChunkType, CodeChunk, EdgeType, Event, EventMetadata, GraphEdge, GraphNode, IndexingError,
    IndexingErrorKind, Memory, MemoryFilter, NodeType, SourceSpan,
};
use mnemolite_domain::error::{Error, Result};
use mnemolite_domain::ports::{Cursor, Direction, SearchFilters, StoreGateway};
use pgvector::Vector;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

/// Typed, pooled gateway to a Postgres + pgvector store.
pub struct PostgresStoreGateway {
    pool: Pool<Postgres>,
    dimension: usize,
    partitioning_enabled: bool,
}

impl PostgresStoreGateway {
    /// Connect with a bounded pool. `acquire_timeout` is the per-call
    /// acquisition timeout (§4.1(b)): callers never wait past it.
    ///
    /// # Errors
    /// Returns `Error::StoreUnavailable` if the pool cannot be established.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
        dimension: usize,
        partitioning_enabled: bool,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| Error::store_unavailable_with_source("failed to connect to store", e))?;
        Ok(Self {
            pool,
            dimension,
            partitioning_enabled,
        })
    }

    /// Build directly from an existing pool (tests, embedded deployments).
    #[must_use]
    pub fn from_pool(pool: Pool<Postgres>, dimension: usize, partitioning_enabled: bool) -> Self {
        Self {
            pool,
            dimension,
            partitioning_enabled,
        }
    }

    fn check_dimension(&self, embedding: &Option<Vec<f32>>) -> Result<()> {
        if let Some(v) = embedding {
            if v.len() != self.dimension {
                return Err(Error::bad_request(format!(
                    "embedding dimension mismatch: expected {}, got {}",
                    self.dimension,
                    v.len()
                )));
            }
        }
        Ok(())
    }

    fn map_query_error(e: sqlx::Error) -> Error {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::integrity_conflict(db.message().to_owned())
            }
            sqlx::Error::PoolTimedOut => Error::store_unavailable("connection pool timed out"),
            _ => Error::store_unavailable_with_source("store query failed", e),
        }
    }

    fn row_to_event(row: &PgRow) -> Result<Event> {
        let metadata_json: serde_json::Value = row.try_get("metadata").map_err(Self::map_query_error)?;
        let metadata: EventMetadata =
            serde_json::from_value(metadata_json).unwrap_or_default();
        let embedding: Option<Vector> = row.try_get("embedding").map_err(Self::map_query_error)?;
        Ok(Event {
            id: row.try_get("id").map_err(Self::map_query_error)?,
            ts: row.try_get("ts").map_err(Self::map_query_error)?,
            payload: row.try_get("content").map_err(Self::map_query_error)?,
            embedding: embedding.map(Vector::into),
            metadata,
        })
    }

    fn row_to_chunk(row: &PgRow) -> Result<CodeChunk> {
        let chunk_type_str: String = row.try_get("chunk_type").map_err(Self::map_query_error)?;
        let chunk_type = chunk_type_from_str(&chunk_type_str)
            .ok_or_else(|| Error::internal(format!("unknown chunk_type '{chunk_type_str}'")))?;
        let name_path_json: serde_json::Value =
            row.try_get("name_path").map_err(Self::map_query_error)?;
        let name_path: Vec<String> = serde_json::from_value(name_path_json).unwrap_or_default();
        let embedding_text: Option<Vector> =
            row.try_get("embedding_text").map_err(Self::map_query_error)?;
        let embedding_code: Option<Vector> =
            row.try_get("embedding_code").map_err(Self::map_query_error)?;
        Ok(CodeChunk {
            id: row.try_get("id").map_err(Self::map_query_error)?,
            repository: row.try_get("repository").map_err(Self::map_query_error)?,
            file_path: row.try_get("file_path").map_err(Self::map_query_error)?,
            language: row.try_get("language").map_err(Self::map_query_error)?,
            chunk_type,
            content: row.try_get("content").map_err(Self::map_query_error)?,
            content_hash: row.try_get("content_hash").map_err(Self::map_query_error)?,
            embedding_text: embedding_text.map(Vector::into),
            embedding_code: embedding_code.map(Vector::into),
            name_path,
            span: SourceSpan {
                line_start: row.try_get::<i64, _>("line_start").map_err(Self::map_query_error)? as usize,
                line_end: row.try_get::<i64, _>("line_end").map_err(Self::map_query_error)? as usize,
            },
            metadata: row.try_get("metadata").map_err(Self::map_query_error)?,
        })
    }

    fn row_to_node(row: &PgRow) -> Result<GraphNode> {
        let node_type_str: String = row.try_get("node_type").map_err(Self::map_query_error)?;
        let node_type = node_type_from_str(&node_type_str)
            .ok_or_else(|| Error::internal(format!("unknown node_type '{node_type_str}'")))?;
        Ok(GraphNode {
            id: row.try_get("node_id").map_err(Self::map_query_error)?,
            node_type,
            label: row.try_get("label").map_err(Self::map_query_error)?,
            properties: row.try_get("properties").map_err(Self::map_query_error)?,
        })
    }

    fn row_to_edge(row: &PgRow) -> Result<GraphEdge> {
        let edge_type_str: String = row.try_get("relation_type").map_err(Self::map_query_error)?;
        let edge_type = EdgeType::from_str_opt(&edge_type_str)
            .ok_or_else(|| Error::internal(format!("unknown relation_type '{edge_type_str}'")))?;
        Ok(GraphEdge {
            id: row.try_get("edge_id").map_err(Self::map_query_error)?,
            source_node_id: row.try_get("source_node_id").map_err(Self::map_query_error)?,
            target_node_id: row.try_get("target_node_id").map_err(Self::map_query_error)?,
            edge_type,
            properties: row.try_get("properties").map_err(Self::map_query_error)?,
        })
    }
}

fn chunk_type_from_str(s: &str) -> Option<ChunkType> {
    match s {
        "function" => Some(ChunkType::Function),
        "method" => Some(ChunkType::Method),
        "class" => Some(ChunkType::Class),
        "barrel" => Some(ChunkType::Barrel),
        "config_module" => Some(ChunkType::ConfigModule),
        "module" => Some(ChunkType::Module),
        _ => None,
    }
}

fn node_type_from_str(s: &str) -> Option<NodeType> {
    match s {
        "symbol" => Some(NodeType::Symbol),
        "module" => Some(NodeType::Module),
        "file" => Some(NodeType::File),
        "concept" => Some(NodeType::Concept),
        _ => None,
    }
}

#[async_trait::async_trait]
impl StoreGateway for PostgresStoreGateway {
    async fn migrate(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(Self::map_query_error)?;
        sqlx::query("CREATE EXTENSION IF NOT EXISTS pg_trgm")
            .execute(&self.pool)
            .await
            .map_err(Self::map_query_error)?;

        let events_ddl = format!(
            "CREATE TABLE IF NOT EXISTS events (
                id UUID PRIMARY KEY,
                ts TIMESTAMPTZ NOT NULL,
                content JSONB NOT NULL,
                embedding VECTOR({dim}),
                metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb
            ){partition}",
            dim = self.dimension,
            partition = if self.partitioning_enabled {
                " PARTITION BY RANGE (ts)"
            } else {
                ""
            }
        );
        sqlx::query(&events_ddl).execute(&self.pool).await.map_err(Self::map_query_error)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS events_ts_idx ON events (ts DESC)")
            .execute(&self.pool)
            .await
            .map_err(Self::map_query_error)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS events_metadata_gin_idx ON events USING GIN (metadata)")
            .execute(&self.pool)
            .await
            .map_err(Self::map_query_error)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS events_content_trgm_idx ON events USING GIN ((content::text) gin_trgm_ops)")
            .execute(&self.pool)
            .await
            .map_err(Self::map_query_error)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS nodes (
                node_id TEXT PRIMARY KEY,
                node_type TEXT NOT NULL,
                label TEXT NOT NULL,
                properties JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(Self::map_query_error)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS nodes_type_idx ON nodes (node_type)")
            .execute(&self.pool)
            .await
            .map_err(Self::map_query_error)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS edges (
                edge_id TEXT PRIMARY KEY,
                source_node_id TEXT NOT NULL,
                target_node_id TEXT NOT NULL,
                relation_type TEXT NOT NULL,
                properties JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                UNIQUE (source_node_id, target_node_id, relation_type)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(Self::map_query_error)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS edges_source_idx ON edges (source_node_id)")
            .execute(&self.pool)
            .await
            .map_err(Self::map_query_error)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS edges_target_idx ON edges (target_node_id)")
            .execute(&self.pool)
            .await
            .map_err(Self::map_query_error)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS edges_relation_idx ON edges (relation_type)")
            .execute(&self.pool)
            .await
            .map_err(Self::map_query_error)?;

        let chunks_ddl = format!(
            "CREATE TABLE IF NOT EXISTS code_chunks (
                id TEXT PRIMARY KEY,
                repository TEXT NOT NULL,
                file_path TEXT NOT NULL,
                language TEXT NOT NULL,
                chunk_type TEXT NOT NULL,
                content TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                embedding_text VECTOR({dim}),
                embedding_code VECTOR({dim}),
                name_path JSONB NOT NULL DEFAULT '[]'::jsonb,
                line_start BIGINT NOT NULL,
                line_end BIGINT NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb
            )",
            dim = self.dimension
        );
        sqlx::query(&chunks_ddl).execute(&self.pool).await.map_err(Self::map_query_error)?;
        sqlx::query("CREATE INDEX IF NOT EXISTS chunks_repo_file_idx ON code_chunks (repository, file_path)")
            .execute(&self.pool)
            .await
            .map_err(Self::map_query_error)?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS chunks_content_trgm_idx ON code_chunks USING GIN (content gin_trgm_ops)",
        )
        .execute(&self.pool)
        .await
        .map_err(Self::map_query_error)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS indexing_errors (
                error_id SERIAL PRIMARY KEY,
                repository TEXT NOT NULL,
                file_path TEXT NOT NULL,
                error_type TEXT NOT NULL CHECK (error_type IN ('parse','encoding','chunking','embedding','persistence')),
                error_message TEXT NOT NULL,
                error_traceback TEXT,
                chunk_type TEXT,
                language TEXT,
                occurred_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(Self::map_query_error)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS projects (
                slug TEXT PRIMARY KEY,
                origin_path TEXT
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(Self::map_query_error)?;

        Ok(())
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        self.check_dimension(&event.embedding)?;
        let embedding = event.embedding.clone().map(Vector::from);
        let metadata = serde_json::to_value(&event.metadata)?;
        sqlx::query(
            "INSERT INTO events (id, ts, content, embedding, metadata) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(event.id)
        .bind(event.ts)
        .bind(&event.payload)
        .bind(embedding)
        .bind(metadata)
        .execute(&self.pool)
        .await
        .map_err(Self::map_query_error)?;
        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query("SELECT id, ts, content, embedding, metadata FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::map_query_error)?;
        row.as_ref().map(Self::row_to_event).transpose()
    }

    async fn tombstone_event(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE events SET metadata = jsonb_set(metadata, '{deleted}', 'true'::jsonb, true) WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Self::map_query_error)?;
        Ok(())
    }

    async fn list_events(
        &self,
        filter: &MemoryFilter,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<(Vec<Event>, Option<Cursor>)> {
        let (cursor_ts, cursor_id) = match cursor {
            Some(c) => decode_cursor(c)?,
            None => (None, None),
        };

        let tags_filter: Option<Vec<String>> = if filter.tags.is_empty() {
            None
        } else {
            Some(filter.tags.clone())
        };

        let mut rows = sqlx::query(
            "SELECT id, ts, content, embedding, metadata FROM events
             WHERE (metadata->>'deleted' IS NULL OR metadata->>'deleted' = 'false' OR $1)
               AND ($2::timestamptz IS NULL OR ts < $2 OR (ts = $2 AND id < $3))
               AND ($4::timestamptz IS NULL OR ts >= $4)
               AND ($5::timestamptz IS NULL OR ts <= $5)
               AND ($6::text IS NULL OR metadata->>'project' = $6)
               AND ($7::text IS NULL OR metadata->>'memory_type' = $7)
               AND ($8::text[] IS NULL OR metadata->'tags' ?& $8)
             ORDER BY ts DESC, id DESC
             LIMIT $9",
        )
        .bind(filter.include_deleted)
        .bind(cursor_ts)
        .bind(cursor_id)
        .bind(filter.since)
        .bind(filter.until)
        .bind(&filter.project)
        .bind(&filter.memory_type)
        .bind(tags_filter)
        .bind(limit as i64 + 1)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_query_error)?;

        let has_more = rows.len() > limit;
        if has_more {
            rows.truncate(limit);
        }
        let events = rows.iter().map(Self::row_to_event).collect::<Result<Vec<_>>>()?;
        let next_cursor = if has_more {
            events.last().map(|e| encode_cursor(e.ts, e.id))
        } else {
            None
        };
        Ok((events, next_cursor))
    }

    async fn find_by_fingerprint(
        &self,
        fingerprint: &str,
        now: DateTime<Utc>,
        within: chrono::Duration,
    ) -> Result<Option<Event>> {
        let earliest = now - within;
        let row = sqlx::query(
            "SELECT id, ts, content, embedding, metadata FROM events
             WHERE metadata->>'fingerprint' = $1 AND ts >= $2
             ORDER BY ts DESC LIMIT 1",
        )
        .bind(fingerprint)
        .bind(earliest)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::map_query_error)?;
        row.as_ref().map(Self::row_to_event).transpose()
    }

    async fn get_memory(&self, id: Uuid) -> Result<Option<Memory>> {
        let Some(event) = self.get_event(id).await? else {
            return Ok(None);
        };
        Ok(Some(event_to_memory(&event)))
    }

    async fn upsert_project(&self, slug: &str, origin_path: Option<&str>) -> Result<()> {
        sqlx::query(
            "INSERT INTO projects (slug, origin_path) VALUES ($1, $2)
             ON CONFLICT (slug) DO UPDATE SET origin_path = EXCLUDED.origin_path",
        )
        .bind(slug)
        .bind(origin_path)
        .execute(&self.pool)
        .await
        .map_err(Self::map_query_error)?;
        Ok(())
    }

    async fn upsert_chunks(&self, repository: &str, file_path: &str, chunks: &[CodeChunk]) -> Result<()> {
        for chunk in chunks {
            self.check_dimension(&chunk.embedding_text)?;
            self.check_dimension(&chunk.embedding_code)?;
        }
        let mut tx = self.pool.begin().await.map_err(Self::map_query_error)?;

        let keep_ids: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
        sqlx::query(
            "DELETE FROM code_chunks WHERE repository = $1 AND file_path = $2 AND NOT (id = ANY($3))",
        )
        .bind(repository)
        .bind(file_path)
        .bind(&keep_ids)
        .execute(&mut *tx)
        .await
        .map_err(Self::map_query_error)?;

        for chunk in chunks {
            let name_path = serde_json::to_value(&chunk.name_path)?;
            let embedding_text = chunk.embedding_text.clone().map(Vector::from);
            let embedding_code = chunk.embedding_code.clone().map(Vector::from);
            sqlx::query(
                "INSERT INTO code_chunks
                    (id, repository, file_path, language, chunk_type, content, content_hash,
                     embedding_text, embedding_code, name_path, line_start, line_end, metadata)
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
                 ON CONFLICT (id) DO UPDATE SET
                    content = EXCLUDED.content,
                    content_hash = EXCLUDED.content_hash,
                    embedding_text = EXCLUDED.embedding_text,
                    embedding_code = EXCLUDED.embedding_code,
                    name_path = EXCLUDED.name_path,
                    line_start = EXCLUDED.line_start,
                    line_end = EXCLUDED.line_end,
                    metadata = EXCLUDED.metadata",
            )
            .bind(&chunk.id)
            .bind(&chunk.repository)
            .bind(&chunk.file_path)
            .bind(&chunk.language)
            .bind(chunk.chunk_type.as_str())
            .bind(&chunk.content)
            .bind(&chunk.content_hash)
            .bind(embedding_text)
            .bind(embedding_code)
            .bind(name_path)
            .bind(chunk.span.line_start as i64)
            .bind(chunk.span.line_end as i64)
            .bind(&chunk.metadata)
            .execute(&mut *tx)
            .await
            .map_err(Self::map_query_error)?;
        }

        tx.commit().await.map_err(Self::map_query_error)?;
        Ok(())
    }

    async fn upsert_graph_delta(&self, nodes: &[GraphNode], edges: &[GraphEdge]) -> Result<()> {
        for edge in edges {
            if edge.is_invalid_self_loop() {
                return Err(Error::bad_request("contains edge cannot self-loop"));
            }
        }
        let mut tx = self.pool.begin().await.map_err(Self::map_query_error)?;

        for node in nodes {
            sqlx::query(
                "INSERT INTO nodes (node_id, node_type, label, properties) VALUES ($1,$2,$3,$4)
                 ON CONFLICT (node_id) DO UPDATE SET
                    node_type = EXCLUDED.node_type, label = EXCLUDED.label, properties = EXCLUDED.properties",
            )
            .bind(&node.id)
            .bind(node.node_type.as_str())
            .bind(&node.label)
            .bind(&node.properties)
            .execute(&mut *tx)
            .await
            .map_err(Self::map_query_error)?;
        }

        for edge in edges {
            sqlx::query(
                "INSERT INTO edges (edge_id, source_node_id, target_node_id, relation_type, properties)
                 VALUES ($1,$2,$3,$4,$5)
                 ON CONFLICT (source_node_id, target_node_id, relation_type) DO UPDATE SET
                    properties = jsonb_set(
                        edges.properties, '{weight}',
                        to_jsonb(GREATEST(
                            COALESCE((edges.properties->>'weight')::double precision, 0.0),
                            COALESCE((EXCLUDED.properties->>'weight')::double precision, 0.0)
                        )),
                        true
                    )",
            )
            .bind(&edge.id)
            .bind(&edge.source_node_id)
            .bind(&edge.target_node_id)
            .bind(edge.edge_type.as_str())
            .bind(&edge.properties)
            .execute(&mut *tx)
            .await
            .map_err(Self::map_query_error)?;
        }

        tx.commit().await.map_err(Self::map_query_error)?;
        Ok(())
    }

    async fn record_indexing_error(&self, error: &IndexingError) -> Result<()> {
        sqlx::query(
            "INSERT INTO indexing_errors
                (repository, file_path, error_type, error_message, error_traceback, chunk_type, language, occurred_at)
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
        )
        .bind(&error.repository)
        .bind(&error.file_path)
        .bind(error.kind.as_str())
        .bind(&error.message)
        .bind(&error.context)
        .bind(&error.chunk_type)
        .bind(&error.language)
        .bind(error.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(Self::map_query_error)?;
        Ok(())
    }

    async fn purge_repository(&self, repository: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Self::map_query_error)?;

        sqlx::query(
            "DELETE FROM edges WHERE source_node_id IN (SELECT id FROM code_chunks WHERE repository = $1)
                OR target_node_id IN (SELECT id FROM code_chunks WHERE repository = $1)",
        )
        .bind(repository)
        .execute(&mut *tx)
        .await
        .map_err(Self::map_query_error)?;
        sqlx::query(
            "DELETE FROM nodes WHERE node_id IN (SELECT id FROM code_chunks WHERE repository = $1)
                OR properties->>'repository' = $1",
        )
        .bind(repository)
        .execute(&mut *tx)
        .await
        .map_err(Self::map_query_error)?;
        sqlx::query("DELETE FROM code_chunks WHERE repository = $1")
            .bind(repository)
            .execute(&mut *tx)
            .await
            .map_err(Self::map_query_error)?;
        sqlx::query("DELETE FROM indexing_errors WHERE repository = $1")
            .bind(repository)
            .execute(&mut *tx)
            .await
            .map_err(Self::map_query_error)?;

        tx.commit().await.map_err(Self::map_query_error)?;
        Ok(())
    }

    async fn lexical_search(
        &self,
        query: &str,
        filters: &SearchFilters,
        top_k: usize,
    ) -> Result<Vec<(CodeChunk, f64)>> {
        let rows = sqlx::query(
            "SELECT id, repository, file_path, language, chunk_type, content, content_hash,
                    embedding_text, embedding_code, name_path, line_start, line_end, metadata,
                    similarity(content, $1) AS score
             FROM code_chunks
             WHERE ($2::text IS NULL OR repository = $2)
               AND ($3::text IS NULL OR language = $3)
               AND ($4::text IS NULL OR chunk_type = $4)
               AND similarity(content, $1) > 0.0
             ORDER BY score DESC
             LIMIT $5",
        )
        .bind(query)
        .bind(&filters.repository)
        .bind(&filters.language)
        .bind(&filters.chunk_type)
        .bind(top_k as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_query_error)?;

        rows.iter()
            .map(|row| {
                let chunk = Self::row_to_chunk(row)?;
                let score: f64 = row.try_get::<f32, _>("score").map_err(Self::map_query_error)? as f64;
                Ok((chunk, score))
            })
            .collect()
    }

    async fn vector_search(
        &self,
        embedding: &[f32],
        filters: &SearchFilters,
        top_k: usize,
    ) -> Result<Vec<(CodeChunk, f64)>> {
        let vector = Vector::from(embedding.to_vec());
        let rows = sqlx::query(
            "SELECT id, repository, file_path, language, chunk_type, content, content_hash,
                    embedding_text, embedding_code, name_path, line_start, line_end, metadata,
                    (embedding_code <=> $1) AS distance
             FROM code_chunks
             WHERE embedding_code IS NOT NULL
               AND ($2::text IS NULL OR repository = $2)
               AND ($3::text IS NULL OR language = $3)
               AND ($4::text IS NULL OR chunk_type = $4)
             ORDER BY embedding_code <=> $1
             LIMIT $5",
        )
        .bind(vector)
        .bind(&filters.repository)
        .bind(&filters.language)
        .bind(&filters.chunk_type)
        .bind(top_k as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_query_error)?;

        rows.iter()
            .map(|row| {
                let chunk = Self::row_to_chunk(row)?;
                let distance: f64 = row.try_get::<f64, _>("distance").map_err(Self::map_query_error)?;
                Ok((chunk, distance))
            })
            .collect()
    }

    async fn edges_for_node(
        &self,
        node_id: &str,
        edge_types: &[EdgeType],
        direction: Direction,
    ) -> Result<Vec<GraphEdge>> {
        let type_strs: Vec<String> = edge_types.iter().map(|t| t.as_str().to_owned()).collect();
        let type_filter_empty = type_strs.is_empty();

        let rows = match direction {
            Direction::Out => {
                sqlx::query(
                    "SELECT edge_id, source_node_id, target_node_id, relation_type, properties
                     FROM edges WHERE source_node_id = $1 AND ($2 OR relation_type = ANY($3))",
                )
                .bind(node_id)
                .bind(type_filter_empty)
                .bind(&type_strs)
                .fetch_all(&self.pool)
                .await
            }
            Direction::In => {
                sqlx::query(
                    "SELECT edge_id, source_node_id, target_node_id, relation_type, properties
                     FROM edges WHERE target_node_id = $1 AND ($2 OR relation_type = ANY($3))",
                )
                .bind(node_id)
                .bind(type_filter_empty)
                .bind(&type_strs)
                .fetch_all(&self.pool)
                .await
            }
            Direction::Both => {
                sqlx::query(
                    "SELECT edge_id, source_node_id, target_node_id, relation_type, properties
                     FROM edges WHERE (source_node_id = $1 OR target_node_id = $1)
                       AND ($2 OR relation_type = ANY($3))",
                )
                .bind(node_id)
                .bind(type_filter_empty)
                .bind(&type_strs)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Self::map_query_error)?;

        rows.iter().map(Self::row_to_edge).collect()
    }

    async fn nodes_by_id(&self, ids: &[String]) -> Result<Vec<GraphNode>> {
        let rows = sqlx::query("SELECT node_id, node_type, label, properties FROM nodes WHERE node_id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::map_query_error)?;
        rows.iter().map(Self::row_to_node).collect()
    }

    async fn lexical_search_memories(
        &self,
        query: &str,
        filter: &MemoryFilter,
        top_k: usize,
    ) -> Result<Vec<(Event, f64)>> {
        let tags_filter: Option<Vec<String>> = if filter.tags.is_empty() { None } else { Some(filter.tags.clone()) };
        let rows = sqlx::query(
            "SELECT id, ts, content, embedding, metadata, similarity(content::text, $1) AS score
             FROM events
             WHERE (metadata->>'deleted' IS NULL OR metadata->>'deleted' = 'false' OR $2)
               AND ($3::text IS NULL OR metadata->>'memory_type' = $3)
               AND ($4::text IS NULL OR metadata->>'project' = $4)
               AND ($5::timestamptz IS NULL OR ts >= $5)
               AND ($6::timestamptz IS NULL OR ts <= $6)
               AND ($7::text[] IS NULL OR metadata->'tags' ?& $7)
               AND similarity(content::text, $1) > 0.0
             ORDER BY score DESC
             LIMIT $8",
        )
        .bind(query)
        .bind(filter.include_deleted)
        .bind(&filter.memory_type)
        .bind(&filter.project)
        .bind(filter.since)
        .bind(filter.until)
        .bind(tags_filter)
        .bind(top_k as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_query_error)?;

        rows.iter()
            .map(|row| {
                let event = Self::row_to_event(row)?;
                let score: f64 = row.try_get::<f32, _>("score").map_err(Self::map_query_error)? as f64;
                Ok((event, score))
            })
            .collect()
    }

    async fn vector_search_memories(
        &self,
        embedding: &[f32],
        filter: &MemoryFilter,
        top_k: usize,
    ) -> Result<Vec<(Event, f64)>> {
        let tags_filter: Option<Vec<String>> = if filter.tags.is_empty() { None } else { Some(filter.tags.clone()) };
        let vector = Vector::from(embedding.to_vec());
        let rows = sqlx::query(
            "SELECT id, ts, content, embedding, metadata, (embedding <=> $1) AS distance
             FROM events
             WHERE embedding IS NOT NULL
               AND (metadata->>'deleted' IS NULL OR metadata->>'deleted' = 'false' OR $2)
               AND ($3::text IS NULL OR metadata->>'memory_type' = $3)
               AND ($4::text IS NULL OR metadata->>'project' = $4)
               AND ($5::timestamptz IS NULL OR ts >= $5)
               AND ($6::timestamptz IS NULL OR ts <= $6)
               AND ($7::text[] IS NULL OR metadata->'tags' ?& $7)
             ORDER BY embedding <=> $1
             LIMIT $8",
        )
        .bind(vector)
        .bind(filter.include_deleted)
        .bind(&filter.memory_type)
        .bind(&filter.project)
        .bind(filter.since)
        .bind(filter.until)
        .bind(tags_filter)
        .bind(top_k as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_query_error)?;

        rows.iter()
            .map(|row| {
                let event = Self::row_to_event(row)?;
                let distance: f64 = row.try_get::<f64, _>("distance").map_err(Self::map_query_error)?;
                Ok((event, distance))
            })
            .collect()
    }

    async fn reconcile_graph_integrity(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT edge_id FROM edges
             WHERE source_node_id NOT IN (SELECT node_id FROM nodes)
                OR target_node_id NOT IN (SELECT node_id FROM nodes)",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_query_error)?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("edge_id").map_err(Self::map_query_error))
            .collect()
    }
}

use crate::projection::event_to_memory;

fn encode_cursor(ts: DateTime<Utc>, id: Uuid) -> Cursor {
    format!("{}|{}", ts.to_rfc3339(), id)
}

fn decode_cursor(cursor: &Cursor) -> Result<(Option<DateTime<Utc>>, Option<Uuid>)> {
    let (ts_str, id_str) = cursor
        .split_once('|')
        .ok_or_else(|| Error::bad_request("malformed cursor"))?;
    let ts = DateTime::parse_from_rfc3339(ts_str)
        .map_err(|_| Error::bad_request("malformed cursor timestamp"))?
        .with_timezone(&Utc);
    let id = Uuid::from_str(id_str).map_err(|_| Error::bad_request("malformed cursor id"))?;
    Ok((Some(ts), Some(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_type_round_trips() {
        for ct in [ChunkType::Function, ChunkType::Method, ChunkType::Class, ChunkType::Barrel, ChunkType::ConfigModule, ChunkType::Module] {
            assert_eq!(chunk_type_from_str(ct.as_str()), Some(ct));
        }
    }

    #[test]
    fn cursor_round_trips() {
        let ts = Utc::now();
        let id = Uuid::new_v4();
        let encoded = encode_cursor(ts, id);
        let (decoded_ts, decoded_id) = decode_cursor(&encoded).unwrap();
        assert_eq!(decoded_id, Some(id));
        assert!(decoded_ts.is_some());
    }
}
