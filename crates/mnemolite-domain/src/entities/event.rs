//! Event entity
//!
//! An `Event` is the atomic, immutable record the core persists. Memories are
//! derived views over one or more events (see [`crate::entities::memory`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Metadata carried alongside an event's payload.
///
/// Tags are normalized (lower-cased, deduplicated) by the Event/Memory Core
/// before persistence; this type only describes the shape, not the
/// normalization policy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventMetadata {
    /// Normalized tag set.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form source identifier (e.g. the ingress collaborator's name).
    pub source: Option<String>,
    /// Event type discriminator (e.g. `"observation"`, `"decision"`).
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Session the event belongs to, when applicable.
    pub session_id: Option<String>,
    /// Memory type hint used when deriving a `Memory` view (see §3).
    pub memory_type: Option<String>,
    /// Project slug this event is bound to, if resolved.
    pub project: Option<String>,
    /// Client-supplied idempotency fingerprint, when provided on insert.
    pub fingerprint: Option<String>,
    /// Set when the event has been soft-deleted (tombstoned).
    #[serde(default)]
    pub deleted: bool,
    /// Arbitrary extra fields that callers may attach.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl EventMetadata {
    /// Normalize tags: lower-case and deduplicate while preserving first-seen order.
    pub fn normalize_tags(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.tags = std::mem::take(&mut self.tags)
            .into_iter()
            .map(|t| t.to_lowercase())
            .filter(|t| seen.insert(t.clone()))
            .collect();
    }

    /// Mark this metadata as tombstoned.
    pub fn tombstone(&mut self) {
        self.deleted = true;
    }
}

/// An atomic, time-ordered event.
///
/// Invariant: every event has a timestamp and a payload; the embedding, when
/// present, always matches the process-wide configured dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Stable identifier.
    pub id: Uuid,
    /// Creation timestamp; events are ordered by this field.
    pub ts: DateTime<Utc>,
    /// Structured, unconstrained payload.
    pub payload: Value,
    /// Optional dense embedding; `None` when no semantic channel applies.
    pub embedding: Option<Vec<f32>>,
    /// Metadata object.
    pub metadata: EventMetadata,
}

impl Event {
    /// Construct a new event with a freshly generated identifier and the
    /// current timestamp supplied by the caller (entities never read the
    /// clock themselves).
    #[must_use]
    pub fn new(ts: DateTime<Utc>, payload: Value, metadata: EventMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            ts,
            payload,
            embedding: None,
            metadata,
        }
    }

    /// Whether the event is excluded from default queries.
    #[must_use]
    pub fn is_tombstoned(&self) -> bool {
        self.metadata.deleted
    }

    /// Opaque pagination cursor: identifier plus timestamp, sufficient to
    /// resume a `list_recent` scan deterministically.
    #[must_use]
    pub fn cursor(&self) -> EventCursor {
        EventCursor {
            id: self.id,
            ts: self.ts,
        }
    }
}

/// Opaque cursor for `list_recent` pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCursor {
    /// Identifier of the last-seen event.
    pub id: Uuid,
    /// Timestamp of the last-seen event.
    pub ts: DateTime<Utc>,
}
