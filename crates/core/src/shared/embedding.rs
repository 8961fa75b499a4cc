use serde::{Deserialize, Serialize};

/// Fixed-length vector describing one detected face.
///
/// Immutable once produced; visually similar faces map to nearby vectors
/// under the configured [`EmbeddingDistance`](crate::detection::domain::embedding_distance::EmbeddingDistance).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceEmbedding(Vec<f32>);

impl FaceEmbedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_and_slice() {
        let e = FaceEmbedding::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(e.dimension(), 3);
        assert_eq!(e.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let e = FaceEmbedding::new(vec![0.5, -1.0]);
        assert_eq!(serde_json::to_string(&e).unwrap(), "[0.5,-1.0]");
    }
}
