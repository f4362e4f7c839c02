//! Durable index namespace.
//!
//! Each save writes the lexical corpus, the chunk metadata and the flat vector
//! index into a fresh `gen-<N>` directory, then publishes it by atomically
//! replacing the root `manifest.json`. Backing up or restoring the namespace
//! directory backs up or restores the index.

pub mod atomic;
pub mod manifest;
pub mod store;

pub use manifest::Manifest;
pub use store::{IndexStore, LoadedIndex, CORPUS_FILE, MANIFEST_FILE, METADATA_FILE, VECTORS_FILE};
