//! Metadata Extractor (C6)
//!
//! Implements [`mnemolite_domain::ports::MetadataExtractor`] over a
//! tree-sitter parse of a chunk's own source span (`chunk.content`, never
//! the whole file), surfacing call targets, imports, re-exports, and
//! base-class references as [`SymbolReference`] edges the Graph Builder
//! (C7) turns into [`mnemolite_domain::GraphEdge`]s.

use mnemolite_domain::entities::EdgeType;
use mnemolite_domain::entities::code_chunk::CodeChunk;
use mnemolite_domain::ports::{ExtractedMetadata, MetadataExtractor, SymbolReference};
use mnemolite_language_support::LanguageId;
use tree_sitter::Node;

use crate::cursor::CursorUtils;
use crate::grammar;
use crate::walker::TreeWalker;

/// Reference lookup row: a node kind plus the edge type it denotes and
/// whether the reference resolves to a re-export rather than a usage.
type ReferenceRule = (&'static str, EdgeType, bool);

/// Tree-sitter-backed metadata extractor for one language.
pub struct TreeSitterMetadataExtractor {
    language: LanguageId,
}

impl TreeSitterMetadataExtractor {
    /// Build an extractor for the given language.
    #[must_use]
    pub fn new(language: LanguageId) -> Self {
        Self { language }
    }

    fn reference_rules(language: LanguageId) -> &'static [ReferenceRule] {
        match language {
            LanguageId::Rust => &[
                ("use_declaration", EdgeType::Imports, false),
                ("call_expression", EdgeType::Calls, false),
            ],
            LanguageId::Python => &[
                ("import_statement", EdgeType::Imports, false),
                ("import_from_statement", EdgeType::Imports, false),
                ("call", EdgeType::Calls, false),
            ],
            LanguageId::JavaScript | LanguageId::TypeScript => &[
                ("import_statement", EdgeType::Imports, false),
                ("export_statement", EdgeType::ReExports, true),
                ("call_expression", EdgeType::Calls, false),
            ],
            LanguageId::Java => &[
                ("import_declaration", EdgeType::Imports, false),
                ("method_invocation", EdgeType::Calls, false),
            ],
            LanguageId::Kotlin => &[
                ("import_header", EdgeType::Imports, false),
                ("call_expression", EdgeType::Calls, false),
            ],
            LanguageId::Cpp => &[
                ("preproc_include", EdgeType::Imports, false),
                ("call_expression", EdgeType::Calls, false),
            ],
        }
    }

    /// Field names tried, in order, to pull a human-readable target name
    /// out of a matched reference node.
    fn target_name(node: Node<'_>, source: &[u8]) -> Option<String> {
        for field in &["function", "name", "path", "argument"] {
            if let Some(n) = CursorUtils::child_by_field(node, field) {
                if let Ok(text) = n.utf8_text(source) {
                    return Some(text.trim().to_string());
                }
            }
        }
        node.utf8_text(source)
            .ok()
            .map(|text| text.trim().to_string())
    }

    /// True when a `use`/`export` node carries the public-facing marker
    /// that makes it a re-export rather than a private import: a leading
    /// `pub` visibility modifier in Rust, or a `from '...'` clause in
    /// JS/TS `export` statements.
    fn is_re_export(node: Node<'_>, language: LanguageId, source: &[u8]) -> bool {
        match language {
            LanguageId::Rust => node.kind() == "use_declaration"
                && node
                    .child(0)
                    .is_some_and(|c| c.kind() == "visibility_modifier"),
            LanguageId::JavaScript | LanguageId::TypeScript => {
                node.kind() == "export_statement"
                    && node.utf8_text(source).unwrap_or_default().contains("from")
            }
            _ => false,
        }
    }

    fn extract_references(&self, content: &str) -> Vec<SymbolReference> {
        let Ok(mut parser) = grammar::parser_for(self.language) else {
            return Vec::new();
        };
        let Some(tree) = parser.parse(content, None) else {
            return Vec::new();
        };
        let source = content.as_bytes();
        let root = tree.root_node();

        let mut refs = Vec::new();
        for &(kind, edge_type, treat_as_export_if_marked) in
            Self::reference_rules(self.language)
        {
            for node in TreeWalker::find_by_kind(root, kind) {
                let Some(target_name) = Self::target_name(node, source) else {
                    continue;
                };
                if target_name.is_empty() {
                    continue;
                }

                let resolved_edge_type = if treat_as_export_if_marked {
                    // export_statement is always a re-export, `from`
                    // clause or not (`export { x }` re-exports a symbol
                    // already in local scope).
                    EdgeType::ReExports
                } else if Self::is_re_export(node, self.language, source) {
                    EdgeType::ReExports
                } else {
                    edge_type
                };

                refs.push(SymbolReference {
                    target_name,
                    edge_type: resolved_edge_type,
                    is_type_only: false,
                });
            }
        }
        refs
    }
}

impl MetadataExtractor for TreeSitterMetadataExtractor {
    fn language(&self) -> &str {
        self.language.name()
    }

    fn extract(&self, chunk: &CodeChunk) -> ExtractedMetadata {
        let references = self.extract_references(&chunk.content);
        let (re_exports, references): (Vec<_>, Vec<_>) = references
            .into_iter()
            .partition(|r| r.edge_type == EdgeType::ReExports);

        ExtractedMetadata {
            signature: None,
            re_exports,
            references,
        }
    }
}
