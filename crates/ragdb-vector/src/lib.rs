//! ragdb-vector
//!
//! Exact nearest-neighbour search over chunk embeddings. Vectors live in one
//! contiguous buffer and every query is a linear scan; see [`FlatL2Index`].
//! The [`codec`] module provides the index's native binary form.

pub mod codec;
pub mod flat;

pub use codec::CodecError;
pub use flat::{FlatL2Index, Neighbors};
