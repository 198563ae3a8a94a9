//! `IndexingError` entity
//!
//! Append-only per-file failure record produced by the Indexing Orchestrator
//! (C8). Never raised as a request failure; surfaced through the
//! repository-level indexing summary and `indexing_errors` for operators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed vocabulary of indexing failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexingErrorKind {
    /// The chunker could not parse the file's structure.
    Parse,
    /// The file could not be decoded as text.
    Encoding,
    /// Chunk extraction failed after a successful parse.
    Chunking,
    /// The embedding provider failed for this file's chunks.
    Embedding,
    /// A failure persisting chunks, nodes, or edges for this file.
    Persistence,
}

impl IndexingErrorKind {
    /// Canonical lower-case name, matching `indexing_errors.error_type`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexingErrorKind::Parse => "parse",
            IndexingErrorKind::Encoding => "encoding",
            IndexingErrorKind::Chunking => "chunking",
            IndexingErrorKind::Embedding => "embedding",
            IndexingErrorKind::Persistence => "persistence",
        }
    }
}

impl std::fmt::Display for IndexingErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single per-file indexing failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingError {
    /// Logical repository name.
    pub repository: String,
    /// Path of the file that failed.
    pub file_path: String,
    /// Failure kind.
    pub kind: IndexingErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Optional stack/context snippet for diagnosis.
    pub context: Option<String>,
    /// When the failure occurred.
    pub occurred_at: DateTime<Utc>,
    /// Chunk type being produced when the failure occurred, if known.
    pub chunk_type: Option<String>,
    /// Detected language, if known.
    pub language: Option<String>,
}

impl IndexingError {
    /// Construct a parse-kind error, the most common failure captured by
    /// the Code Chunker when a file's structure cannot be parsed.
    #[must_use]
    pub fn parse(repository: &str, file_path: &str, message: impl Into<String>) -> Self {
        Self {
            repository: repository.to_string(),
            file_path: file_path.to_string(),
            kind: IndexingErrorKind::Parse,
            message: message.into(),
            context: None,
            occurred_at: Utc::now(),
            chunk_type: None,
            language: None,
        }
    }
}
