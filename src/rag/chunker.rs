use text_splitter::{ChunkConfig, MarkdownSplitter};

use crate::types::{AppError, Result};

/// Default chunk capacity, in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;

/// Markdown-aware splitter used when ingesting documentation
///
/// Chunks break on heading, paragraph and sentence boundaries before falling
/// back to words, so a passage rarely starts mid-sentence.
pub struct TextChunker {
    splitter: MarkdownSplitter<text_splitter::Characters>,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::InvalidInput(format!("Invalid chunk settings: {}", e)))?;

        Ok(Self {
            splitter: MarkdownSplitter::new(config),
        })
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.splitter
            .chunks(text)
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(String::from)
            .collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            splitter: MarkdownSplitter::new(
                ChunkConfig::new(DEFAULT_CHUNK_SIZE)
                    .with_overlap(DEFAULT_CHUNK_OVERLAP)
                    .unwrap_or_else(|_| ChunkConfig::new(DEFAULT_CHUNK_SIZE)),
            ),
        }
    }
}
