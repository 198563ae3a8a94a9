//! `CodeChunk` entity
//!
//! An indexed fragment of source code produced by the Code Chunker (C5) and
//! enriched by the Metadata Extractor (C6).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// The kind of source fragment a chunk represents.
///
/// `ConfigModule` and `Barrel` are synthetic: the chunker emits exactly one
/// per non-chunkable file rather than parsing it structurally (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    /// A top-level function.
    Function,
    /// A method defined inside a class/impl/trait.
    Method,
    /// A class, struct, or equivalent type definition.
    Class,
    /// A single synthetic chunk standing in for a whole barrel (re-export) file.
    Barrel,
    /// A single synthetic chunk standing in for a recognized config file.
    ConfigModule,
    /// Any other top-level declaration not covered above.
    Module,
}

impl ChunkType {
    /// Canonical lower-case name, matching `metadata.chunk_type` in storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Function => "function",
            ChunkType::Method => "method",
            ChunkType::Class => "class",
            ChunkType::Barrel => "barrel",
            ChunkType::ConfigModule => "config_module",
            ChunkType::Module => "module",
        }
    }

    /// Whether this chunk type is one of the synthetic, non-structural kinds.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        matches!(self, ChunkType::Barrel | ChunkType::ConfigModule)
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source span of a chunk within its file, 1-indexed and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    /// First line of the chunk.
    pub line_start: usize,
    /// Last line of the chunk.
    pub line_end: usize,
}

/// Indexed fragment of source code.
///
/// Invariant: `identifier` is unique; it changes whenever `content_hash`
/// changes. Embeddings, when set, match the configured dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeChunk {
    /// Stable fingerprint of `(repository, file_path, language, chunk_type, name_path, content_hash)`.
    pub id: String,
    /// Logical repository name.
    pub repository: String,
    /// Path of the source file, relative to the repository root.
    pub file_path: String,
    /// Detected language tag (see `mnemolite_language_support::LanguageId::name`).
    pub language: String,
    /// Chunk kind.
    pub chunk_type: ChunkType,
    /// Exact source text of the chunk.
    pub content: String,
    /// SHA-256 hex digest of `content`.
    pub content_hash: String,
    /// Optional natural-language embedding (docstring/caption channel).
    pub embedding_text: Option<Vec<f32>>,
    /// Optional source-code embedding.
    pub embedding_code: Option<Vec<f32>>,
    /// Ordered ancestor names, e.g. `["Outer", "Inner", "method"]`.
    pub name_path: Vec<String>,
    /// Source span.
    pub span: SourceSpan,
    /// Language-specific attributes (e.g. `async`, decorators, generics).
    pub metadata: Value,
}

impl CodeChunk {
    /// Compute the stable fingerprint for a chunk given its identity fields.
    ///
    /// Re-running the chunker over unchanged source must reproduce the same
    /// identifier; `content_hash` is the only component derived from content.
    #[must_use]
    pub fn fingerprint(
        repository: &str,
        file_path: &str,
        language: &str,
        chunk_type: ChunkType,
        name_path: &[String],
        content_hash: &str,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(repository.as_bytes());
        hasher.update(b"\0");
        hasher.update(file_path.as_bytes());
        hasher.update(b"\0");
        hasher.update(language.as_bytes());
        hasher.update(b"\0");
        hasher.update(chunk_type.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(name_path.join("::").as_bytes());
        hasher.update(b"\0");
        hasher.update(content_hash.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Compute the content hash used both for the fingerprint and for
    /// change detection between indexing runs.
    #[must_use]
    pub fn hash_content(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_for_unchanged_inputs() {
        let hash = CodeChunk::hash_content("fn f() {}");
        let a = CodeChunk::fingerprint("repo", "a.rs", "rust", ChunkType::Function, &["f".into()], &hash);
        let b = CodeChunk::fingerprint("repo", "a.rs", "rust", ChunkType::Function, &["f".into()], &hash);
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_changes_with_content_hash() {
        let h1 = CodeChunk::hash_content("fn f() {}");
        let h2 = CodeChunk::hash_content("fn f() { 1 }");
        let a = CodeChunk::fingerprint("repo", "a.rs", "rust", ChunkType::Function, &["f".into()], &h1);
        let b = CodeChunk::fingerprint("repo", "a.rs", "rust", ChunkType::Function, &["f".into()], &h2);
        assert_ne!(a, b);
    }

    #[test]
    fn synthetic_chunk_types_are_marked() {
        assert!(ChunkType::Barrel.is_synthetic());
        assert!(ChunkType::ConfigModule.is_synthetic());
        assert!(!ChunkType::Function.is_synthetic());
    }
}
