use super::IndexError;
use super::Result;
use super::VectorIndex;
use serde::Deserialize;
use serde::Serialize;

/// Brute-force inner-product index over a contiguous buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatIpIndex {
    dimensions: usize,
    /// Row-major, `len() * dimensions` values.
    data: Vec<f32>,
}

impl FlatIpIndex {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(IndexError::ZeroDimensions);
        }
        Ok(Self {
            dimensions,
            data: Vec::new(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (index, _): (Self, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| IndexError::Serialization(e.to_string()))?;
        if index.dimensions == 0 || index.data.len() % index.dimensions != 0 {
            return Err(IndexError::Serialization(format!(
                "buffer of {} values does not hold {}-dimensional rows",
                index.data.len(),
                index.dimensions
            )));
        }
        Ok(index)
    }

    fn row(&self, position: usize) -> &[f32] {
        let start = position * self.dimensions;
        &self.data[start..start + self.dimensions]
    }
}

impl VectorIndex for FlatIpIndex {
    fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: bad.len(),
            });
        }
        self.data.reserve(vectors.len() * self.dimensions);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, usize)> = (0..self.len())
            .map(|position| {
                let score = self
                    .row(position)
                    .iter()
                    .zip(query)
                    .map(|(a, b)| a * b)
                    .sum::<f32>();
                (score, position)
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);
        Ok(scored)
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimensions
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| IndexError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index_with(vectors: &[Vec<f32>]) -> FlatIpIndex {
        let mut index = FlatIpIndex::new(vectors[0].len()).unwrap();
        index.add(vectors).unwrap();
        index
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(FlatIpIndex::new(0), Err(IndexError::ZeroDimensions)));
    }

    #[test]
    fn test_search_orders_by_score() {
        let index = index_with(&[vec![1.0, 0.0], vec![0.6, 0.8], vec![0.0, 1.0]]);
        let hits = index.search(&[0.0, 1.0], 2).unwrap();
        assert_eq!(hits, vec![(1.0, 2), (0.8, 1)]);
    }

    #[test]
    fn test_ties_break_by_position() {
        let index = index_with(&[vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0]]);
        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.iter().map(|h| h.1).collect::<Vec<_>>(), vec![1, 2, 0]);
    }

    #[test]
    fn test_nan_scores_keep_a_total_order() {
        let index = index_with(&[vec![1.0, 0.0], vec![f32::NAN, 0.0], vec![0.5, 0.0]]);
        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        let finite: Vec<usize> = hits.iter().filter(|h| !h.0.is_nan()).map(|h| h.1).collect();
        assert_eq!(finite, vec![0, 2]);
    }

    #[test]
    fn test_k_larger_than_index() {
        let index = index_with(&[vec![1.0, 0.0]]);
        assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 1);
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_protection() {
        let mut index = FlatIpIndex::new(3).unwrap();
        assert!(matches!(
            index.add(&[vec![1.0, 0.0]]),
            Err(IndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(index.is_empty());
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let index = index_with(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let restored = FlatIpIndex::from_bytes(&index.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, index);
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(FlatIpIndex::from_bytes(&[0xff, 0xff, 0xff]).is_err());
    }
}
