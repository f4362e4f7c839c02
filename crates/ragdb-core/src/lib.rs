//! ragdb-core
//!
//! Shared building blocks for the ragdb workspace: chunk and provenance types,
//! the embedding provider seam, the error taxonomy, configuration and the
//! word-window chunker.

pub mod chunker;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
