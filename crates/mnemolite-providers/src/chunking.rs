//! Code Chunker (C5) implementation.
//!
//! Classifies a file (test / config / barrel / structural) and dispatches to
//! the language-support crate's tree-sitter-backed [`SemanticChunking`], then
//! converts its chunks into the domain's content-addressed [`CodeChunk`]
//! shape. Embeddings and `metadata` are left empty here; the indexing
//! orchestrator fills the former via the Embedding Provider and the latter
//! via the Metadata Extractor (C6) once a chunk exists.

use std::path::Path;

use async_trait::async_trait;
use mnemolite_domain::entities::{ChunkType as DomainChunkType, CodeChunk as DomainCodeChunk, SourceSpan};
use mnemolite_domain::error::{Error, Result};
use mnemolite_domain::ports::ChunkingStrategy as ChunkerPort;
use mnemolite_language_support::chunking::{ChunkType as LsChunkType, ChunkingStrategy as LsChunkingStrategy};
use mnemolite_language_support::{LanguageDetector, LanguageId, SemanticChunking};

/// Filenames recognized as configuration regardless of extension.
const KNOWN_CONFIG_FILES: &[&str] = &[
    "Cargo.toml",
    "package.json",
    "pyproject.toml",
    "tsconfig.json",
    "go.mod",
    "go.sum",
    "Makefile",
    "docker-compose.yml",
    "docker-compose.yaml",
    ".eslintrc.json",
    ".prettierrc",
];

/// Extensions recognized as configuration when the filename isn't a known one.
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "ini", "cfg"];

/// Minimum fraction of a file's non-comment statements that must be
/// re-exports for the whole file to be classified as a barrel module.
const BARREL_THRESHOLD: f64 = 0.8;

fn is_test_file(file_path: &str) -> bool {
    let path = Path::new(file_path);
    let in_test_dir = path.components().any(|c| {
        matches!(
            c.as_os_str().to_str(),
            Some("test") | Some("tests") | Some("__tests__") | Some("spec")
        )
    });
    if in_test_dir {
        return true;
    }
    let stem = path
        .file_stem()
        .and_then(|f| f.to_str())
        .unwrap_or_default()
        .to_lowercase();
    stem.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with(".test")
        || stem.ends_with(".spec")
        || stem.ends_with("_spec")
}

fn is_config_file(file_path: &str) -> bool {
    let path = Path::new(file_path);
    let file_name = path.file_name().and_then(|f| f.to_str()).unwrap_or_default();
    if KNOWN_CONFIG_FILES.contains(&file_name) {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CONFIG_EXTENSIONS.contains(&ext))
}

fn is_comment_line(line: &str, language: LanguageId) -> bool {
    match language {
        LanguageId::Python => line.starts_with('#'),
        _ => line.starts_with("//") || line.starts_with('*') || line.starts_with("/*"),
    }
}

fn is_reexport_line(line: &str, language: LanguageId) -> bool {
    match language {
        LanguageId::Rust => line.starts_with("pub use") || line == "pub use;",
        LanguageId::JavaScript | LanguageId::TypeScript => {
            (line.starts_with("export *") || line.starts_with("export {")) && line.contains("from")
                || line.starts_with("export * from")
        }
        LanguageId::Python => line.starts_with("from ") && line.contains("import"),
        _ => false,
    }
}

/// Whether `content`'s non-comment statements are at least
/// [`BARREL_THRESHOLD`] re-exports, making the whole file a single barrel
/// module rather than a structurally chunked one.
fn is_barrel_content(content: &str, language: LanguageId) -> bool {
    let lines: Vec<&str> = content.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.len() < 2 {
        return false;
    }
    let statements: Vec<&&str> = lines.iter().filter(|l| !is_comment_line(l, language)).collect();
    if statements.is_empty() {
        return false;
    }
    let reexports = statements.iter().filter(|l| is_reexport_line(l, language)).count();
    (reexports as f64 / statements.len() as f64) >= BARREL_THRESHOLD
}

fn ls_chunk_type_to_domain(ls: LsChunkType) -> DomainChunkType {
    match ls {
        LsChunkType::Function => DomainChunkType::Function,
        LsChunkType::Method => DomainChunkType::Method,
        LsChunkType::Class => DomainChunkType::Class,
        LsChunkType::Module | LsChunkType::Block => DomainChunkType::Module,
    }
}

fn synthetic_chunk(
    repository: &str,
    file_path: &str,
    language: &str,
    chunk_type: DomainChunkType,
    content: &str,
    line_count: usize,
) -> DomainCodeChunk {
    let content_hash = DomainCodeChunk::hash_content(content);
    let name_path = vec![file_path.to_string()];
    let id = DomainCodeChunk::fingerprint(repository, file_path, language, chunk_type, &name_path, &content_hash);
    DomainCodeChunk {
        id,
        repository: repository.to_string(),
        file_path: file_path.to_string(),
        language: language.to_string(),
        chunk_type,
        content: content.to_string(),
        content_hash,
        embedding_text: None,
        embedding_code: None,
        name_path,
        span: SourceSpan {
            line_start: 1,
            line_end: line_count.max(1),
        },
        metadata: serde_json::Value::Null,
    }
}

/// Tree-sitter-backed Code Chunker, classifying files before dispatching to
/// structural chunking.
pub struct TreeSitterChunkingStrategy {
    detector: LanguageDetector,
    semantic: SemanticChunking,
}

impl Default for TreeSitterChunkingStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeSitterChunkingStrategy {
    /// Build a chunker with the default detector and chunking configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            detector: LanguageDetector::new(),
            semantic: SemanticChunking::default(),
        }
    }
}

#[async_trait]
impl ChunkerPort for TreeSitterChunkingStrategy {
    async fn chunk_file(&self, repository: &str, file_path: &str, content: &[u8]) -> Result<Vec<DomainCodeChunk>> {
        let text = std::str::from_utf8(content)
            .map_err(|e| Error::encoding_error(format!("{file_path} is not valid UTF-8: {e}")))?;

        if text.is_empty() || is_test_file(file_path) {
            return Ok(Vec::new());
        }

        let path = Path::new(file_path);
        let language = self.detector.detect_opt(path, Some(text));

        if language.is_none() {
            if is_config_file(file_path) {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("config");
                return Ok(vec![synthetic_chunk(
                    repository,
                    file_path,
                    ext,
                    DomainChunkType::ConfigModule,
                    text,
                    text.lines().count(),
                )]);
            }
            return Ok(Vec::new());
        }
        let language = language.expect("checked above");

        if is_barrel_content(text, language) {
            return Ok(vec![synthetic_chunk(
                repository,
                file_path,
                language.name(),
                DomainChunkType::Barrel,
                text,
                text.lines().count(),
            )]);
        }

        let ls_chunks = self
            .semantic
            .chunk(text, language, path)
            .await
            .map_err(|e| Error::parse_error(format!("{file_path}: {e}")))?;

        let chunks = ls_chunks
            .into_iter()
            .map(|c| {
                let chunk_type = ls_chunk_type_to_domain(c.chunk_type);
                let content_hash = DomainCodeChunk::hash_content(&c.content);
                let mut name_path = c.name_path.clone();
                if let Some(name) = &c.name {
                    name_path.push(name.clone());
                }
                let id = DomainCodeChunk::fingerprint(
                    repository,
                    file_path,
                    language.name(),
                    chunk_type,
                    &name_path,
                    &content_hash,
                );
                DomainCodeChunk {
                    id,
                    repository: repository.to_string(),
                    file_path: file_path.to_string(),
                    language: language.name().to_string(),
                    chunk_type,
                    content: c.content,
                    content_hash,
                    embedding_text: None,
                    embedding_code: None,
                    name_path,
                    span: SourceSpan {
                        line_start: c.start_line,
                        line_end: c.end_line,
                    },
                    metadata: serde_json::Value::Null,
                }
            })
            .collect();

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_are_recognized_by_directory_and_suffix() {
        assert!(is_test_file("tests/foo.rs"));
        assert!(is_test_file("src/test_utils.py"));
        assert!(is_test_file("src/foo.test.ts"));
        assert!(!is_test_file("src/lib.rs"));
    }

    #[test]
    fn config_files_are_recognized_by_name_and_extension() {
        assert!(is_config_file("Cargo.toml"));
        assert!(is_config_file("config/app.yaml"));
        assert!(!is_config_file("src/main.rs"));
    }

    #[test]
    fn barrel_detection_requires_high_reexport_ratio() {
        let barrel = "pub use crate::a::A;\npub use crate::b::B;\npub use crate::c::C;\n";
        assert!(is_barrel_content(barrel, LanguageId::Rust));

        let mixed = "pub use crate::a::A;\nfn helper() { println!(\"x\"); }\n";
        assert!(!is_barrel_content(mixed, LanguageId::Rust));
    }

    #[tokio::test]
    async fn skips_test_files_without_error() {
        let chunker = TreeSitterChunkingStrategy::new();
        let chunks = chunker
            .chunk_file("repo", "tests/foo.rs", b"fn it_works() {}")
            .await
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn emits_single_config_module_chunk() {
        let chunker = TreeSitterChunkingStrategy::new();
        let chunks = chunker
            .chunk_file("repo", "Cargo.toml", b"[package]\nname = \"x\"\n")
            .await
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type, DomainChunkType::ConfigModule);
    }

    #[tokio::test]
    async fn emits_single_barrel_chunk_for_reexport_heavy_file() {
        let chunker = TreeSitterChunkingStrategy::new();
        let content = b"pub use crate::a::A;\npub use crate::b::B;\npub use crate::c::C;\n";
        let chunks = chunker.chunk_file("repo", "src/lib.rs", content).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type, DomainChunkType::Barrel);
    }

    #[tokio::test]
    async fn chunks_structural_rust_file_into_functions() {
        let chunker = TreeSitterChunkingStrategy::new();
        let content = b"fn foo() {\n    println!(\"foo\");\n}\n\nfn bar(x: i32) -> i32 {\n    x * 2\n}\n";
        let chunks = chunker.chunk_file("repo", "src/lib.rs", content).await.unwrap();
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert_eq!(chunk.repository, "repo");
            assert_eq!(chunk.language, "rust");
        }
    }
}
