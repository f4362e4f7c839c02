//! Score normalization and linear fusion.
//!
//! Lexical scores are divided by their maximum; L2 distances become
//! `1 - d / max_d` over the returned neighbours. Both steps fall back to a
//! divisor of 1 when the maximum is not positive, so no score is ever divided
//! by zero and every normalized value lies in `[0, 1]`. Per-query max scaling
//! is sensitive to outliers: one very strong lexical match compresses every
//! other lexical score toward 0.

use ragdb_core::types::GlobalIndex;
use ragdb_vector::Neighbors;

/// Fused score of one candidate, with the normalized inputs that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedScore {
    pub global_index: GlobalIndex,
    pub score: f32,
    pub lexical: f32,
    pub semantic: Option<f32>,
}

/// Scale raw lexical scores into `[0, 1]` by the maximum. A query that matched
/// nothing yields all zeros.
pub fn normalize_lexical(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|s| (s / max).clamp(0.0, 1.0)).collect()
}

/// Turn neighbour distances into similarities, keyed by global index.
/// The farthest returned neighbour gets 0, an exact match gets 1.
pub fn distances_to_similarities(neighbors: &Neighbors) -> Vec<(GlobalIndex, f32)> {
    let max = neighbors.distances.iter().copied().fold(0.0f32, f32::max);
    let divisor = if max > 0.0 { max } else { 1.0 };
    neighbors.iter().map(|(i, d)| (i, (1.0 - d / divisor).clamp(0.0, 1.0))).collect()
}

/// Weighted sum of the normalized scores, best first.
///
/// Every corpus position is a candidate. A position missing from `semantic`
/// contributes only its lexical term. Weights are applied verbatim. Equal
/// scores are ordered by ascending global index.
pub fn fuse(
    lexical: &[f32],
    semantic: &[(GlobalIndex, f32)],
    lexical_weight: f32,
    semantic_weight: f32,
    top_k: usize,
) -> Vec<FusedScore> {
    let mut semantic_by_index: Vec<Option<f32>> = vec![None; lexical.len()];
    for &(i, sim) in semantic {
        if let Some(slot) = semantic_by_index.get_mut(i) {
            *slot = Some(sim);
        }
    }

    let mut fused: Vec<FusedScore> = lexical
        .iter()
        .zip(semantic_by_index)
        .enumerate()
        .map(|(global_index, (&lex, sem))| FusedScore {
            global_index,
            score: lexical_weight * lex + semantic_weight * sem.unwrap_or(0.0),
            lexical: lex,
            semantic: sem,
        })
        .collect();
    fused.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.global_index.cmp(&b.global_index)));
    fused.truncate(top_k);
    fused
}
