//! Exact flat inner-product index.
//!
//! Vectors live in one contiguous buffer; search is a full scan. With
//! unit-length vectors the inner product is cosine similarity, which is all
//! this corpus size needs. An approximate index would be a drop-in
//! optimization behind the same `add`/`search` surface, not a correctness
//! change.

use subdex_core::{Error, Result};

#[derive(Debug)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::Index("index dimension must be positive".to_string()));
        }
        Ok(Self { dim, data: Vec::new() })
    }

    pub(crate) fn from_raw(dim: usize, data: Vec<f32>) -> Result<Self> {
        if dim == 0 || data.len() % dim != 0 {
            return Err(Error::Index(format!(
                "corrupt index payload: {} floats for dimension {}",
                data.len(),
                dim
            )));
        }
        Ok(Self { dim, data })
    }

    pub(crate) fn raw(&self) -> &[f32] {
        &self.data
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of vectors added so far.
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append one vector; its position is the add order and is the join key
    /// into the artifact metadata.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dim {
            return Err(Error::Index(format!(
                "vector dimension mismatch: expected {}, got {}",
                self.dim,
                vector.len()
            )));
        }
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    /// Top-k scan by inner product. Scores descend; ties break by ascending
    /// position (insertion order), and that order is what callers see.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dim {
            return Err(Error::Index(format!(
                "query dimension mismatch: expected {}, got {}",
                self.dim,
                query.len()
            )));
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(pos, row)| (pos, dot(query, row)))
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scale a vector to unit length in place. Zero vectors stay zero.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_returns_sequential_positions() {
        let mut index = FlatIndex::new(2).unwrap();
        assert_eq!(index.add(&[1.0, 0.0]).unwrap(), 0);
        assert_eq!(index.add(&[0.0, 1.0]).unwrap(), 1);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn add_rejects_wrong_dimension() {
        let mut index = FlatIndex::new(3).unwrap();
        assert!(index.add(&[1.0, 0.0]).is_err());
    }

    #[test]
    fn search_orders_by_score_then_position() {
        let mut index = FlatIndex::new(2).unwrap();
        index.add(&[1.0, 0.0]).unwrap();
        index.add(&[0.0, 1.0]).unwrap();
        index.add(&[1.0, 0.0]).unwrap(); // identical to position 0

        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].0, 0, "tie broken by insertion order");
        assert_eq!(hits[1].0, 2);
        assert_eq!(hits[2].0, 1);
        assert!(hits[0].1 > hits[2].1);
    }

    #[test]
    fn search_k_zero_is_empty() {
        let mut index = FlatIndex::new(2).unwrap();
        index.add(&[1.0, 0.0]).unwrap();
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn normalize_makes_unit_length() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }
}
