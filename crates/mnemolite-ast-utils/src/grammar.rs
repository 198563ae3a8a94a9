//! Tree-sitter Grammar Selection
//!
//! Maps a [`LanguageId`] to the tree-sitter grammar and a ready-to-use
//! [`tree_sitter::Parser`] for it.

use mnemolite_language_support::LanguageId;
use tree_sitter::{Language, Parser};

use crate::error::{AstError, Result};

/// Return the tree-sitter grammar for a language identifier.
#[must_use]
pub fn language_for(id: LanguageId) -> Language {
    match id {
        LanguageId::Rust => tree_sitter_rust::LANGUAGE.into(),
        LanguageId::Python => tree_sitter_python::LANGUAGE.into(),
        LanguageId::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        LanguageId::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        LanguageId::Java => tree_sitter_java::LANGUAGE.into(),
        LanguageId::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        LanguageId::Kotlin => tree_sitter_kotlin_ng::LANGUAGE.into(),
    }
}

/// Build a parser configured for the given language.
///
/// # Errors
/// Returns [`AstError::UnsupportedLanguage`] if the grammar fails to load
/// (this only happens if the tree-sitter ABI the grammar was built with is
/// incompatible with the linked tree-sitter runtime).
pub fn parser_for(id: LanguageId) -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&language_for(id))
        .map_err(|_| AstError::UnsupportedLanguage {
            language: id.to_string(),
        })?;
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_parser_for_every_supported_language() {
        for &lang in LanguageId::all() {
            assert!(parser_for(lang).is_ok(), "failed to build parser for {lang}");
        }
    }
}
