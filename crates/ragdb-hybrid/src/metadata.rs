use std::collections::BTreeSet;

use ragdb_core::types::{ChunkRecord, DocumentChunk, GlobalIndex};

/// Append-only provenance records, position `i` holding global index `i`.
///
/// The store's length at append time is what assigns a chunk its global
/// index; the lexical corpus and the vector index follow the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataStore {
    records: Vec<ChunkRecord>,
}

impl MetadataStore {
    pub fn new() -> Self { Self::default() }

    /// Adopt records loaded from disk. Callers guarantee `records[i].global_index == i`.
    pub fn from_records(records: Vec<ChunkRecord>) -> Self { Self { records } }

    pub fn append(&mut self, chunk: &DocumentChunk) -> GlobalIndex {
        let global_index = self.records.len();
        self.records.push(chunk.to_record(global_index));
        global_index
    }

    pub fn get_by_global_index(&self, i: GlobalIndex) -> Option<&ChunkRecord> { self.records.get(i) }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn records(&self) -> &[ChunkRecord] { &self.records }

    pub fn truncate(&mut self, len: usize) { self.records.truncate(len); }

    pub fn distinct_documents(&self) -> usize {
        self.records.iter().map(|r| r.document_id.as_str()).collect::<BTreeSet<_>>().len()
    }
}
