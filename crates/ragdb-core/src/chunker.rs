//! Word-window chunking.
//!
//! Text is split on whitespace and cut into windows of `chunk_size` words that
//! advance by `chunk_size - overlap` words, so neighbouring chunks share
//! `overlap` words.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{DocumentChunk, SourceDocument};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Words per chunk.
    pub chunk_size: usize,
    /// Words shared between consecutive chunks. Must be below `chunk_size`.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 512, overlap: 50 }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        let config = Self { chunk_size, overlap };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidInput("chunk_size must be at least 1".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::InvalidInput(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Split `text` into overlapping word windows.
///
/// A window starts at every multiple of the stride below the word count, so
/// the tail of a long text may produce short trailing windows. Blank windows
/// are dropped; if nothing survives but the text is not blank, the whole text
/// comes back as a single chunk.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    let config = ChunkingConfig::new(chunk_size, overlap)?;
    Ok(split_words(text, &config))
}

fn split_words(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    for start in (0..words.len()).step_by(config.stride()) {
        let end = (start + config.chunk_size).min(words.len());
        let chunk = words[start..end].join(" ");
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
    }
    if chunks.is_empty() && !text.trim().is_empty() {
        chunks.push(text.to_string());
    }
    chunks
}

/// Turns source documents into provenance-carrying chunks.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk one document. Blank text is rejected before any splitting.
    pub fn chunk_document(&self, doc: &SourceDocument) -> Result<Vec<DocumentChunk>> {
        if doc.text.trim().is_empty() {
            return Err(Error::InvalidInput(format!("document '{}' has no text", doc.document_id)));
        }
        Ok(split_words(&doc.text, &self.config)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, content)| DocumentChunk {
                document_id: doc.document_id.clone(),
                filename: doc.filename.clone(),
                chunk_index,
                content,
            })
            .collect())
    }
}
