use serde::Serialize;

/// Diagnostic view of an open engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub chunks: usize,
    pub metadata_records: usize,
    pub vectors: usize,
    pub dim: Option<usize>,
    pub documents: usize,
    pub generation: u64,
    pub embedder_id: String,
    /// Counts agree and nothing had to be repaired on load.
    pub consistent: bool,
    pub issues: Vec<String>,
}
