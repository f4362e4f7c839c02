//! ragdb-hybrid
//!
//! The retrieval engine: owns the lexical corpus, the vector index and the
//! chunk metadata, keeps them aligned by global index, persists them through
//! `ragdb-store`, and answers queries by fusing normalized BM25 and L2 scores.

pub mod answer;
pub mod engine;
pub mod fusion;
pub mod health;
pub mod metadata;
pub mod request;
pub mod snapshot;

pub use answer::AnswerContext;
pub use engine::HybridEngine;
pub use health::HealthReport;
pub use metadata::MetadataStore;
pub use request::{RankedChunk, SearchRequest, SearchResponse};
pub use snapshot::IndexSnapshot;
