use std::fmt;
use std::str::FromStr;

use crate::shared::embedding::FaceEmbedding;

/// Symmetric dissimilarity between two face embeddings.
///
/// The density radius and the outlier threshold are expressed in this
/// function's units, so both must be calibrated against the same metric.
pub trait EmbeddingDistance: Send + Sync {
    fn distance(&self, a: &FaceEmbedding, b: &FaceEmbedding) -> f64;
}

/// L2 distance, the metric the default radius and outlier threshold are
/// expressed in. Those defaults were calibrated on 128-d dlib encodings;
/// on unit-length ArcFace vectors a radius of 0.475 only joins faces with
/// cosine similarity above roughly 0.89.
#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanDistance;

impl EmbeddingDistance for EuclideanDistance {
    fn distance(&self, a: &FaceEmbedding, b: &FaceEmbedding) -> f64 {
        squared_euclidean(a.as_slice(), b.as_slice()).sqrt()
    }
}

/// `1 - cos(a, b)`; 1.0 when either vector has zero norm.
#[derive(Clone, Copy, Debug, Default)]
pub struct CosineDistance;

impl EmbeddingDistance for CosineDistance {
    fn distance(&self, a: &FaceEmbedding, b: &FaceEmbedding) -> f64 {
        let (a, b) = (a.as_slice(), b.as_slice());
        let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
        let norm_a = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
        let norm_b = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 1.0;
        }
        1.0 - dot / (norm_a * norm_b)
    }
}

pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum()
}

/// Metric selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Cosine,
}

impl DistanceMetric {
    pub fn build(self) -> Box<dyn EmbeddingDistance> {
        match self {
            DistanceMetric::Euclidean => Box::new(EuclideanDistance),
            DistanceMetric::Cosine => Box::new(CosineDistance),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "cosine" => Ok(DistanceMetric::Cosine),
            other => Err(format!(
                "Distance metric must be 'euclidean' or 'cosine', got '{other}'"
            )),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Euclidean => write!(f, "euclidean"),
            DistanceMetric::Cosine => write!(f, "cosine"),
        }
    }
}
