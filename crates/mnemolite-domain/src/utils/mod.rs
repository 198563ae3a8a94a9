//! Cross-cutting utilities shared by domain entities.

/// ID generation, deterministic correlation (UUID v5), and content hashing.
pub mod id;

pub use id::{compute_content_hash, compute_file_hash, correlate_id, mask_id};
