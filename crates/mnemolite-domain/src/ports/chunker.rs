//! Code Chunker port (C5)

use async_trait::async_trait;

use crate::entities::CodeChunk;
use crate::error::Result;

/// Turns one file's source text into an ordered list of chunks, per the
/// algorithm in §4.5: classify (test/barrel/config/structural), then emit
/// chunks accordingly. Returns an empty vector (not an error) for files that
/// are skipped (test files, empty files).
#[async_trait]
pub trait ChunkingStrategy: Send + Sync {
    /// Chunk a single file's content.
    ///
    /// # Errors
    /// Returns `Error::ParseError` when the content cannot be parsed
    /// structurally, and `Error::EncodingError` when it cannot be decoded.
    async fn chunk_file(
        &self,
        repository: &str,
        file_path: &str,
        content: &[u8],
    ) -> Result<Vec<CodeChunk>>;
}
