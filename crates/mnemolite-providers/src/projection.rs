//! Shared `Event -> Memory` projection (§9: "cross-layer conversions are
//! re-expressed as an explicit view/projection function").
//!
//! Used by both the Store Gateway (`get_memory`) and the Hybrid Search
//! provider (`search_memories`), so both paths agree on title/preview
//! derivation.

use mnemolite_domain::entities::{Event, Memory};

/// Project an `Event` to its `Memory` view: title/preview derived from the
/// payload's leading text, the rest carried straight across from metadata.
pub(crate) fn event_to_memory(event: &Event) -> Memory {
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
