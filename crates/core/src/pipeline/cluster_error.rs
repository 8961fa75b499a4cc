use std::path::PathBuf;

use thiserror::Error;

use crate::atlas::domain::atlas::AtlasError;
use crate::clustering::domain::clustering_error::ClusteringError;

/// Errors that end a clustering run. Per-file problems never surface here;
/// they are logged and collected in the run report instead.
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Clustering(#[from] ClusteringError),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
    #[error("failed to read input directory {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClusterError {
    /// True when the density pass found no identity in a non-empty corpus.
    pub fn is_no_clusters(&self) -> bool {
        matches!(
            self,
            ClusterError::Clustering(ClusteringError::NoClusters { .. })
        )
    }
}
