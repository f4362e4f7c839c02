use tracing::debug;

use ragdb_core::error::{Error, Result};
use ragdb_core::types::DocumentChunk;
use ragdb_text::LexicalIndex;
use ragdb_vector::FlatL2Index;

use crate::metadata::MetadataStore;

/// Immutable view of the three aligned structures plus the lexical index
/// built over the corpus. Queries hold an `Arc` to one snapshot for their
/// whole run; ingestion publishes a new one.
pub struct IndexSnapshot {
    pub(crate) corpus: Vec<String>,
    pub(crate) lexical: LexicalIndex,
    pub(crate) vectors: FlatL2Index,
    pub(crate) metadata: MetadataStore,
}

impl IndexSnapshot {
    pub fn empty() -> Result<Self> {
        Self::from_parts(Vec::new(), FlatL2Index::new(), MetadataStore::new())
    }

    /// Assemble a snapshot from aligned parts, rebuilding the lexical index.
    pub fn from_parts(corpus: Vec<String>, vectors: FlatL2Index, metadata: MetadataStore) -> Result<Self> {
        if corpus.len() != metadata.len() || corpus.len() != vectors.count() {
            return Err(Error::Operation(format!(
                "misaligned snapshot: corpus={} metadata={} vectors={}",
                corpus.len(),
                metadata.len(),
                vectors.count()
            )));
        }
        let lexical = LexicalIndex::build(&corpus)?;
        Ok(Self { corpus, lexical, vectors, metadata })
    }

    /// A copy of this snapshot with `chunks` appended. `self` is untouched, so
    /// an error here leaves the published state as it was.
    pub fn extended(&self, chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::Operation(format!(
                "embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        let mut vectors = self.vectors.clone();
        vectors.add(embeddings)?;

        let mut corpus = self.corpus.clone();
        let mut metadata = self.metadata.clone();
        for chunk in chunks {
            let global_index = metadata.append(chunk);
            debug_assert_eq!(global_index, corpus.len());
            corpus.push(chunk.content.clone());
        }
        debug!(appended = chunks.len(), total = corpus.len(), "snapshot extended");
        Self::from_parts(corpus, vectors, metadata)
    }

    pub fn len(&self) -> usize { self.corpus.len() }

    /// True when any of the structures is empty.
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty() || self.metadata.is_empty() || self.vectors.is_empty() || self.lexical.is_empty()
    }

    pub fn corpus(&self) -> &[String] { &self.corpus }

    pub fn vectors(&self) -> &FlatL2Index { &self.vectors }

    pub fn metadata(&self) -> &MetadataStore { &self.metadata }
}
