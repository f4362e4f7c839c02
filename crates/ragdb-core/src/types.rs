//! Domain types shared by the lexical, vector and metadata structures.

use serde::{Deserialize, Serialize};

/// Dense position of a chunk across every index structure, assigned from 0.
pub type GlobalIndex = usize;

/// Text handed to ingestion by an extraction layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub document_id: String,
    pub filename: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(document_id: impl Into<String>, filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self { document_id: document_id.into(), filename: filename.into(), text: text.into() }
    }
}

/// A chunk cut from a document, before it has been given a global index.
///
/// - `document_id`/`filename`: provenance of the parent document
/// - `chunk_index`: 0-based position within the parent document
/// - `content`: the text payload, never blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    pub document_id: String,
    pub filename: String,
    pub chunk_index: usize,
    pub content: String,
}

impl DocumentChunk {
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    pub fn char_length(&self) -> usize {
        self.content.chars().count()
    }

    /// Provenance record for this chunk once it lands at `global_index`.
    pub fn to_record(&self, global_index: GlobalIndex) -> ChunkRecord {
        ChunkRecord {
            global_index,
            document_id: self.document_id.clone(),
            filename: self.filename.clone(),
            chunk_index: self.chunk_index,
            word_count: self.word_count(),
            char_length: self.char_length(),
        }
    }
}

/// Provenance of an indexed chunk. Index-aligned with the lexical corpus and
/// the vector index through `global_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub global_index: GlobalIndex,
    pub document_id: String,
    pub filename: String,
    pub chunk_index: usize,
    pub word_count: usize,
    pub char_length: usize,
}
