use ragdb_core::error::{Error, Result};
use tracing::debug;

/// Append-only flat index ranked by squared Euclidean distance.
///
/// The dimension is fixed by the first vector ever added; position `i` in the
/// index is the chunk with global index `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatL2Index {
    dim: Option<usize>,
    data: Vec<f32>,
}

/// Result of a k-nearest query, ascending by distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighbors {
    pub distances: Vec<f32>,
    pub indices: Vec<usize>,
}

impl Neighbors {
    pub fn len(&self) -> usize { self.indices.len() }

    pub fn is_empty(&self) -> bool { self.indices.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.indices.iter().copied().zip(self.distances.iter().copied())
    }
}

impl FlatL2Index {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn from_parts(dim: Option<usize>, data: Vec<f32>) -> Self { Self { dim, data } }

    pub(crate) fn raw(&self) -> &[f32] { &self.data }

    pub fn dim(&self) -> Option<usize> { self.dim }

    pub fn count(&self) -> usize {
        match self.dim {
            Some(d) if d > 0 => self.data.len() / d,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool { self.count() == 0 }

    pub fn vector(&self, i: usize) -> Option<&[f32]> {
        let d = self.dim?;
        self.data.get(i * d..(i + 1) * d)
    }

    /// Append `vectors`. Either all are added or, on a dimension mismatch,
    /// none are.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        let Some(first) = vectors.first() else { return Ok(()) };
        let expected = self.dim.unwrap_or(first.len());
        if expected == 0 {
            return Err(Error::InvalidInput("cannot index zero-length vectors".to_string()));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(Error::DimensionMismatch { expected, found: bad.len() });
        }
        self.dim = Some(expected);
        self.data.reserve(vectors.len() * expected);
        for v in vectors {
            self.data.extend_from_slice(v);
        }
        debug!(added = vectors.len(), total = self.count(), dim = expected, "vectors appended");
        Ok(())
    }

    /// Drop every vector at position `len` and beyond.
    pub fn truncate(&mut self, len: usize) {
        if let Some(d) = self.dim {
            self.data.truncate(len * d);
        }
    }

    /// The `k` closest vectors to `query`, `k` clamped to `count()`.
    /// Searching an empty index returns no neighbours.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Neighbors> {
        let count = self.count();
        let k = k.min(count);
        let Some(dim) = self.dim else { return Ok(Neighbors::default()) };
        if k == 0 {
            return Ok(Neighbors::default());
        }
        if query.len() != dim {
            return Err(Error::DimensionMismatch { expected: dim, found: query.len() });
        }

        let mut scored: Vec<(f32, usize)> = self
            .data
            .chunks_exact(dim)
            .enumerate()
            .map(|(i, v)| (squared_l2(query, v), i))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);

        let (distances, indices) = scored.into_iter().unzip();
        Ok(Neighbors { distances, indices })
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
