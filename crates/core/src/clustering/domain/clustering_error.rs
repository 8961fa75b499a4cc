use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ClusteringError {
    #[error("no clusters found among {face_count} faces")]
    NoClusters { face_count: usize },
    #[error("embedding from {path} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        path: PathBuf,
    },
    #[error("expected {expected} seed centroids, got {found}")]
    SeedCountMismatch { expected: usize, found: usize },
    #[error("cannot form {clusters} clusters from {points} embeddings")]
    TooManyClusters { clusters: usize, points: usize },
}
