use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MANIFEST_VERSION: u32 = 1;

/// Describes one successful save. The manifest at the namespace root is the
/// publish point: its `generation` names the directory load reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    /// Incremented on every save of the namespace.
    pub generation: u64,
    pub chunks: usize,
    pub dim: Option<usize>,
    pub saved_at: DateTime<Utc>,
}

impl Manifest {
    pub fn new(generation: u64, chunks: usize, dim: Option<usize>) -> Self {
        Self { format_version: MANIFEST_VERSION, generation, chunks, dim, saved_at: Utc::now() }
    }
}
