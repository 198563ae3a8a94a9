//! Event/Memory Core (C4)
//!
//! Owns the operations named in §4.4: inserting events with idempotent
//! dedup, soft-deleting, cursor-paginated listing, project slug
//! resolution, and single-record lookup. Hybrid search over memories is
//! deliberately NOT implemented here — it's delegated to the Hybrid Search
//! orchestration (see [`crate::search`]), which owns the cache/singleflight
//! layer this use case would otherwise have to duplicate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use mnemolite_domain::entities::{Event, EventMetadata, Memory, MemoryFilter, Project};
use mnemolite_domain::error::Result;
use mnemolite_domain::ports::{Cursor, StoreGateway};
use serde_json::Value;
use uuid::Uuid;

/// Directory basenames that never identify a project on their own; walking
/// one level up resolves past them (§6).
const CONFIG_DIR_SENTINELS: &[&str] = &[".claude", ".config", ".git", ".vscode"];

/// Event/Memory Core: the sole entry point for event lifecycle operations.
pub struct MemoryCore {
    store: Arc<dyn StoreGateway>,
    /// Window within which a repeated client fingerprint is treated as the
    /// same insert (§4.4's dedup policy; default resolved in DESIGN.md).
    idempotency_window: chrono::Duration,
}

impl MemoryCore {
    /// Build a Memory Core over `store`, deduplicating inserts that share a
    /// fingerprint within `idempotency_window`.
    #[must_use]
    pub fn new(store: Arc<dyn StoreGateway>, idempotency_window: chrono::Duration) -> Self {
        Self {
            store,
            idempotency_window,
        }
    }

    /// Insert a new event. Tags are normalized before persistence; a
    /// repeated client fingerprint within the idempotency window is a
    /// no-op that returns the existing identifier rather than inserting
    /// again.
    pub async fn insert_event(
        &self,
        payload: Value,
        mut metadata: EventMetadata,
        embedding: Option<Vec<f32>>,
    ) -> Result<Uuid> {
        metadata.normalize_tags();

        if let Some(fingerprint) = metadata.fingerprint.clone() {
            let now = Utc::now();
            if let Some(existing) = self
                .store
                .find_by_fingerprint(&fingerprint, now, self.idempotency_window)
                .await?
            {
                return Ok(existing.id);
            }
        }

        let mut event = Event::new(Utc::now(), payload, metadata);
        event.embedding = embedding;
        self.store.insert_event(&event).await?;
        Ok(event.id)
    }

    /// Tombstone an event. The record remains but is excluded from default
    /// queries.
    pub async fn soft_delete(&self, id: Uuid) -> Result<()> {
        self.store.tombstone_event(id).await
    }

    /// Cursor-paginated listing by timestamp descending, projected to the
    /// memory view.
    pub async fn list_recent(
        &self,
        filter: &MemoryFilter,
        limit: usize,
        cursor: Option<&Cursor>,
    ) -> Result<(Vec<Memory>, Option<Cursor>)> {
        let (events, next_cursor) = self.store.list_events(filter, limit, cursor).await?;
        let memories = events.iter().map(event_to_memory).collect();
        Ok((memories, next_cursor))
    }

    /// Fetch a single memory view by its backing event identifier.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Memory>> {
        self.store.get_memory(id).await
    }

    /// Derive a project slug from an origin path (§6) and upsert the
    /// mapping.
    pub async fn resolve_project(&self, origin_path: &str) -> Result<Project> {
        let slug = derive_project_slug(Path::new(origin_path));
        self.store.upsert_project(&slug, Some(origin_path)).await?;
        Ok(Project {
            slug,
            origin_path: Some(origin_path.to_string()),
        })
    }
}

/// Project an `Event` to its `Memory` view: title/preview derived from the
/// payload's leading text, the rest carried straight across from metadata.
///
/// Deliberately independent of `mnemolite_providers::projection` (§9: this
/// layer depends only on domain entities, never on a concrete provider), so
/// this mirrors that logic rather than importing it.
fn event_to_memory(event: &Event) -> Memory {
    let payload_text = event
        .payload
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| event.payload.to_string());
    let title: String = payload_text.lines().next().unwrap_or_default().chars().take(80).collect();
    let preview: String = payload_text.chars().take(240).collect();
    Memory {
        id: event.id,
        title,
        preview,
        memory_type: event.metadata.memory_type.clone().unwrap_or_else(|| "note".to_string()),
        tags: event.metadata.tags.clone(),
        author: event.metadata.source.clone(),
        project: event.metadata.project.clone(),
        created_at: event.ts,
        deleted: event.metadata.deleted,
        score: None,
    }
}

/// Walk up from `origin_path` to find a version-controlled repository root
/// (a directory containing `.git`), per §6's "inside a source-control
/// repository" test.
fn find_repo_root(origin_path: &Path) -> Option<PathBuf> {
    let mut candidate = if origin_path.is_dir() {
        Some(origin_path)
    } else {
        origin_path.parent()
    };
    while let Some(dir) = candidate {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        candidate = dir.parent();
    }
    None
}

/// Derive the stable, lower-cased project slug per §6: the repository
/// root's basename when inside a source-control repository, otherwise the
/// origin path's own basename; walking up past sentinel configuration-
/// directory names (`.claude` and the like) either way.
fn derive_project_slug(origin_path: &Path) -> String {
    let base_dir = find_repo_root(origin_path).unwrap_or_else(|| origin_path.to_path_buf());

    let mut candidate = base_dir.as_path();
    loop {
        let basename = candidate
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("root")
            .to_lowercase();

        if CONFIG_DIR_SENTINELS.contains(&basename.as_str()) {
            match candidate.parent() {
                Some(parent) if parent != candidate => {
                    candidate = parent;
                    continue;
                }
                _ => return basename,
            }
        }
        return basename;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_project_slug_lowercases_basename() {
        let slug = derive_project_slug(Path::new("/home/dev/MyProject"));
        assert_eq!(slug, "myproject");
    }

    #[test]
    fn derive_project_slug_walks_up_past_config_sentinel() {
        let slug = derive_project_slug(Path::new("/home/dev/myproject/.claude"));
        assert_eq!(slug, "myproject");
    }

    #[test]
    fn event_to_memory_projects_title_from_first_line() {
        let event = Event::new(
            Utc::now(),
            Value::String("first line\nsecond line".to_string()),
            EventMetadata::default(),
        );
        let memory = event_to_memory(&event);
        assert_eq!(memory.title, "first line");
        assert_eq!(memory.memory_type, "note");
    }
}
