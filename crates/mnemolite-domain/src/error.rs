//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the core. Kinds separate operator-actionable failures
/// (`StoreUnavailable`, `EmbedUnavailable`, `BreakerOpen`) from user-actionable
/// ones (`BadRequest`, `NotFound`); per-file indexing failures never surface
/// through this type (see `IndexingError`).
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-side: invalid identifier, unsupported filter, dimension mismatch.
    #[error("bad request: {message}")]
    BadRequest {
        /// Description of the malformed request
        message: String,
    },

    /// Target entity does not exist, or is tombstoned.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Uniqueness or application-level invariant violated.
    #[error("integrity conflict: {message}")]
    IntegrityConflict {
        /// Description of the violated invariant
        message: String,
    },

    /// Pool timeout, disconnect, or rolled-back transaction from a transient error.
    #[error("store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the store failure
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding channel failure; distinct from `StoreUnavailable` so callers
    /// can degrade to lexical-only retrieval instead of failing the request.
    #[error("embedding unavailable: {message}")]
    EmbedUnavailable {
        /// Description of the embedding failure
        message: String,
    },

    /// Rejected by a circuit breaker in the Open state.
    #[error("breaker open for dependency '{dependency}'")]
    BreakerOpen {
        /// Name of the dependency whose breaker is open
        dependency: String,
    },

    /// Per-request deadline was reached.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Both lexical and vector retrieval channels failed.
    #[error("retrieval unavailable: {message}")]
    RetrievalUnavailable {
        /// Description of the dual-channel failure
        message: String,
    },

    /// Per-file parse failure during indexing. Never raised to a request
    /// caller; captured into `IndexingError` by the orchestrator.
    #[error("parse error: {message}")]
    ParseError {
        /// Description of the parse failure
        message: String,
    },

    /// Per-file encoding failure during indexing.
    #[error("encoding error: {message}")]
    EncodingError {
        /// Description of the encoding failure
        message: String,
    },

    /// Unexpected internal error.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal failure
        message: String,
    },

    /// I/O operation error.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create a `BadRequest` error
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a `NotFound` error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an `IntegrityConflict` error
    pub fn integrity_conflict<S: Into<String>>(message: S) -> Self {
        Self::IntegrityConflict {
            message: message.into(),
        }
    }

    /// Create a `StoreUnavailable` error
    pub fn store_unavailable<S: Into<String>>(message: S) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create a `StoreUnavailable` error with an underlying cause
    pub fn store_unavailable_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an `EmbedUnavailable` error
    pub fn embed_unavailable<S: Into<String>>(message: S) -> Self {
        Self::EmbedUnavailable {
            message: message.into(),
        }
    }

    /// Create a `BreakerOpen` error
    pub fn breaker_open<S: Into<String>>(dependency: S) -> Self {
        Self::BreakerOpen {
            dependency: dependency.into(),
        }
    }

    /// Create a `RetrievalUnavailable` error
    pub fn retrieval_unavailable<S: Into<String>>(message: S) -> Self {
        Self::RetrievalUnavailable {
            message: message.into(),
        }
    }

    /// Create a `ParseError`
    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create an `EncodingError`
    pub fn encoding_error<S: Into<String>>(message: S) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Create an `Internal` error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an `Io` error from a plain message, for call sites that want
    /// to describe the failing operation rather than wrap a raw
    /// `std::io::Error`.
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            source: std::io::Error::other(message.into()),
        }
    }

    /// Whether this error kind is operator-actionable (infrastructure health)
    /// as opposed to user-actionable (bad input).
    #[must_use]
    pub fn is_operator_actionable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::EmbedUnavailable { .. } | Self::BreakerOpen { .. }
        )
    }
}
