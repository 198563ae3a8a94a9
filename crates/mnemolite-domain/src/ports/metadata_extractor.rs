//! Metadata Extractor port (C6)

use serde_json::Value;

/// A symbol reference discovered inside a chunk, usable as a Graph Builder
/// edge seed (call site, base class, import).
#[derive(Debug, Clone)]
pub struct SymbolReference {
    /// Referenced symbol's name path or qualified name, as written at the
    /// reference site (resolution to a concrete node happens in C7).
    pub target_name: String,
    /// Suggested edge type (`calls`, `imports`, `inherits`).
    pub edge_type: crate::entities::EdgeType,
    /// Whether this is a type-only reference (e.g. a TypeScript `import type`).
    pub is_type_only: bool,
}

/// Per-chunk metadata computed by a language-dispatched extractor.
#[derive(Debug, Clone, Default)]
pub struct ExtractedMetadata {
    /// Parameter list, return type hint, and visibility, as a structured value.
    pub signature: Option<Value>,
    /// One entry per re-exported symbol, only populated for barrel chunks.
    pub re_exports: Vec<SymbolReference>,
    /// Call sites, base classes, and imports discovered inside the chunk.
    pub references: Vec<SymbolReference>,
}

/// Language-dispatched metadata extraction.
///
/// Implementations are keyed by language tag in a registry owned by the
/// composition root; languages without a registered extractor fall back to
/// `ExtractedMetadata::default()` (universal fields only: name, span,
/// content, already present on the `CodeChunk` itself).
pub trait MetadataExtractor: Send + Sync {
    /// The language tag this extractor handles (see
    /// `mnemolite_language_support::LanguageId::name`).
    fn language(&self) -> &str;

    /// Compute metadata for a single chunk, scoped to that chunk's own
    /// source span (`chunk.content`) — never the whole file, so that a
    /// multi-chunk file does not attribute one chunk's call sites, imports,
    /// or re-exports to another (§4.6).
    fn extract(&self, chunk: &crate::entities::CodeChunk) -> ExtractedMetadata;
}
