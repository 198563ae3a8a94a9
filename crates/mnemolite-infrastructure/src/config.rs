//! Configuration loading (§6, §11.4)
//!
//! Layers, lowest to highest priority: built-in defaults, an optional TOML
//! file, then `MNEMOLITE_*`-prefixed environment variables. Grounded on the
//! teacher's figment usage convention (`MCP__`-prefixed, double-underscore
//! nested env vars overriding a file-backed base) — adapted to this crate's
//! own `MNEMOLITE_` prefix since no Loco/web-framework config is shared here.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Embedding channel mode (§6's `embedding_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    /// Deterministic, content-hash-seeded vectors; no network calls.
    Mock,
    /// HTTP-backed provider speaking the OpenAI-compatible embeddings contract.
    Real,
}

/// The full named configuration surface from §6, plus the supplemented
/// knobs resolved in DESIGN.md's Open Questions section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Postgres connection string for the Store Gateway.
    pub database_url: String,
    /// Optional stream-ingest broker URL; unset disables it.
    pub redis_url: Option<String>,
    /// Embedding channel mode.
    pub embedding_mode: EmbeddingMode,
    /// Base URL of the text-channel embedding gateway, when `embedding_mode = real`.
    pub embedding_text_base_url: Option<String>,
    /// Model name for the text channel, when `embedding_mode = real`.
    pub embedding_text_model: Option<String>,
    /// Base URL of the code-channel embedding gateway, when `embedding_mode = real`.
    pub embedding_code_base_url: Option<String>,
    /// Model name for the code channel, when `embedding_mode = real`.
    pub embedding_code_model: Option<String>,
    /// Process-wide embedding dimension; changing it requires re-indexing.
    pub embedding_dim: usize,
    /// Indexing Orchestrator worker pool size (§5).
    pub indexing_concurrency: usize,
    /// Chunks embedded per batched provider call (§4.8).
    pub embed_batch_size: usize,
    /// Consecutive failures before a breaker opens (§4.3).
    pub breaker_failure_threshold: u32,
    /// Cool-off window, in milliseconds, before an open breaker probes again.
    pub breaker_cooloff_ms: u64,
    /// Response cache entry lifetime, in milliseconds.
    pub cache_ttl_ms: u64,
    /// Maximum live response cache entries.
    pub cache_max_entries: usize,
    /// Reciprocal Rank Fusion smoothing constant (§4.9).
    pub rrf_k0: f64,
    /// Lexical channel candidate count before fusion.
    pub lexical_top_k: usize,
    /// Vector channel candidate count before fusion.
    pub vector_top_k: usize,
    /// Per-request retrieval deadline, in milliseconds.
    pub deadline_ms: u64,
    /// Whether the `events` table uses range partitioning by month.
    pub partitioning_enabled: bool,
    /// Event count above which the composition root logs a warning
    /// recommending `partitioning_enabled = true` (Open Question: no
    /// automatic migration, the operator decides — see DESIGN.md).
    pub event_count_partition_threshold: u64,
    /// Window within which a repeated insert fingerprint is treated as a
    /// duplicate no-op (§4.4; DESIGN.md Open Question resolution).
    pub idempotency_window_ms: i64,
    /// Maximum connections in the Store Gateway's pool.
    pub db_max_connections: u32,
    /// Per-call pool acquisition timeout, in milliseconds.
    pub db_acquire_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/mnemolite".to_string(),
            redis_url: None,
            embedding_mode: EmbeddingMode::Mock,
            embedding_text_base_url: None,
            embedding_text_model: None,
            embedding_code_base_url: None,
            embedding_code_model: None,
            embedding_dim: 384,
            indexing_concurrency: 8,
            embed_batch_size: 32,
            breaker_failure_threshold: 5,
            breaker_cooloff_ms: 30_000,
            cache_ttl_ms: 60_000,
            cache_max_entries: 10_000,
            rrf_k0: 60.0,
            lexical_top_k: 50,
            vector_top_k: 50,
            deadline_ms: 2_000,
            partitioning_enabled: false,
            event_count_partition_threshold: 5_000_000,
            idempotency_window_ms: 5 * 60 * 1000,
            db_max_connections: 10,
            db_acquire_timeout_ms: 3_000,
        }
    }
}

/// Configuration loading/validation failures. Kept distinct from
/// `mnemolite_domain::Error` since config resolution happens before any
/// domain operation runs (§11.3: `anyhow` is reserved for the server
/// crate's outermost CLI boundary, not this layer).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment failed to merge/deserialize a layer.
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
    /// A loaded value failed a domain-level sanity check.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// Description of the failed check.
        message: String,
    },
    /// `embedding_mode = real` but a required endpoint/model field is unset.
    #[error("embedding_mode = real requires {field} to be set")]
    MissingRealEmbeddingField {
        /// The missing field's name.
        field: &'static str,
    },
}

/// Load [`Settings`] by layering defaults, an optional TOML file, and
/// `MNEMOLITE_*`-prefixed environment variables (e.g.
/// `MNEMOLITE_EMBEDDING_DIM=768` overrides `embedding_dim`).
///
/// # Errors
/// Returns [`ConfigError::Load`] if a layer fails to parse, or
/// [`ConfigError::Invalid`]/[`ConfigError::MissingRealEmbeddingField`] if
/// the merged settings fail validation.
pub fn load(toml_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));
    if let Some(path) = toml_path {
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
    }
    figment = figment.merge(Env::prefixed("MNEMOLITE_"));

    let settings: Settings = figment.extract()?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.embedding_dim == 0 {
        return Err(ConfigError::Invalid {
            message: "embedding_dim must be greater than 0".to_string(),
        });
    }
    if settings.indexing_concurrency == 0 {
        return Err(ConfigError::Invalid {
            message: "indexing_concurrency must be greater than 0".to_string(),
        });
    }
    if settings.breaker_failure_threshold == 0 {
        return Err(ConfigError::Invalid {
            message: "breaker_failure_threshold must be greater than 0".to_string(),
        });
    }
    if settings.rrf_k0 <= 0.0 {
        return Err(ConfigError::Invalid {
            message: "rrf_k0 must be greater than 0".to_string(),
        });
    }
    if settings.embedding_mode == EmbeddingMode::Real {
        if settings.embedding_text_base_url.is_none() {
            return Err(ConfigError::MissingRealEmbeddingField { field: "embedding_text_base_url" });
        }
        if settings.embedding_text_model.is_none() {
            return Err(ConfigError::MissingRealEmbeddingField { field: "embedding_text_model" });
        }
        if settings.embedding_code_base_url.is_none() {
            return Err(ConfigError::MissingRealEmbeddingField { field: "embedding_code_base_url" });
        }
        if settings.embedding_code_model.is_none() {
            return Err(ConfigError::MissingRealEmbeddingField { field: "embedding_code_model" });
        }
    }
    Ok(())
}
