//! ragdb-text
//!
//! BM25 lexical scoring over the chunk corpus, backed by an in-memory Tantivy
//! index that is rebuilt from the whole corpus on every ingestion.

pub mod tantivy_utils;
pub mod index;

pub use index::LexicalIndex;
