use serde::Serialize;

use ragdb_core::config::SearchSettings;
use ragdb_core::error::{Error, Result};
use ragdb_core::types::{ChunkRecord, GlobalIndex};

/// A query with its fusion weights and result count.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub lexical_weight: f32,
    pub semantic_weight: f32,
    pub top_k: usize,
}

impl SearchRequest {
    /// Query with the default weights (0.3 lexical, 0.7 semantic) and `top_k = 5`.
    pub fn new(query: impl Into<String>) -> Self {
        Self::from_settings(query, &SearchSettings::default())
    }

    pub fn from_settings(query: impl Into<String>, settings: &SearchSettings) -> Self {
        Self {
            query: query.into(),
            lexical_weight: settings.lexical_weight,
            semantic_weight: settings.semantic_weight,
            top_k: settings.top_k,
        }
    }

    pub fn with_weights(mut self, lexical_weight: f32, semantic_weight: f32) -> Self {
        self.lexical_weight = lexical_weight;
        self.semantic_weight = semantic_weight;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Rescale the weights to sum to 1. Weights that already sum to 1, or
    /// that sum to 0, are left as given.
    pub fn normalized(mut self) -> Self {
        let total = self.lexical_weight + self.semantic_weight;
        if total > 0.0 && (total - 1.0).abs() > f32::EPSILON {
            self.lexical_weight /= total;
            self.semantic_weight /= total;
        }
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (name, w) in [("lexical_weight", self.lexical_weight), ("semantic_weight", self.semantic_weight)] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidInput(format!("{} must be a non-negative number, got {}", name, w)));
            }
        }
        Ok(())
    }
}

/// One ranked hit. `lexical_score` and `semantic_score` are the normalized
/// inputs to `score`; `semantic_score` is absent when the chunk was not among
/// the nearest neighbours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChunk {
    pub global_index: GlobalIndex,
    pub text: String,
    pub score: f32,
    pub lexical_score: f32,
    pub semantic_score: Option<f32>,
    pub metadata: Option<ChunkRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "results", rename_all = "snake_case")]
pub enum SearchResponse {
    /// Nothing has been ingested yet.
    NotIndexed,
    Ranked(Vec<RankedChunk>),
}

impl SearchResponse {
    pub fn is_not_indexed(&self) -> bool { matches!(self, Self::NotIndexed) }

    /// Hits in rank order; empty when not indexed.
    pub fn hits(&self) -> &[RankedChunk] {
        match self {
            Self::NotIndexed => &[],
            Self::Ranked(hits) => hits,
        }
    }

    pub fn into_hits(self) -> Vec<RankedChunk> {
        match self {
            Self::NotIndexed => Vec::new(),
            Self::Ranked(hits) => hits,
        }
    }
}
