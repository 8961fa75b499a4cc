use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clustering::domain::clustering_error::ClusteringError;
use crate::clustering::domain::face_corpus::FaceCorpus;
use crate::shared::embedding::FaceEmbedding;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("failed to read atlas {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write atlas {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed atlas {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("atlas entry {index} has a {width}x{height} thumbnail with {len} bytes")]
    Thumbnail {
        index: usize,
        width: u32,
        height: u32,
        len: usize,
    },
    #[error(transparent)]
    Corpus(#[from] ClusteringError),
}

/// RGB thumbnail as stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtlasThumbnail {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtlasEntry {
    pub embedding: FaceEmbedding,
    pub thumbnail: AtlasThumbnail,
    pub source_path: PathBuf,
}

/// Persisted faces of an earlier run, used to skip re-extraction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Atlas {
    pub entries: Vec<AtlasEntry>,
}

impl Atlas {
    pub fn from_corpus(corpus: &FaceCorpus) -> Self {
        let entries = corpus
            .records()
            .iter()
            .map(|record| AtlasEntry {
                embedding: record.embedding.clone(),
                thumbnail: AtlasThumbnail {
                    width: record.thumbnail.width(),
                    height: record.thumbnail.height(),
                    rgb: record.thumbnail.data().to_vec(),
                },
                source_path: corpus
                    .source_path(record)
                    .map(|p| p.to_path_buf())
                    .unwrap_or_default(),
            })
            .collect();
        Self { entries }
    }

    /// Rebuilds a corpus, rescaling thumbnails to `thumbnail_size` if the
    /// atlas was written with a different size.
    pub fn into_corpus(self, thumbnail_size: u32) -> Result<FaceCorpus, AtlasError> {
        let mut triples = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.into_iter().enumerate() {
            let AtlasThumbnail { width, height, rgb } = entry.thumbnail;
            if width == 0 || height == 0 || rgb.len() != width as usize * height as usize * 3 {
                return Err(AtlasError::Thumbnail {
                    index,
                    width,
                    height,
                    len: rgb.len(),
                });
            }
            triples.push((
                entry.embedding,
                Frame::new(rgb, width, height, 3),
                entry.source_path,
            ));
        }
        Ok(FaceCorpus::from_entries(triples, thumbnail_size)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::domain::image_extractor::ExtractedImage;
    use crate::shared::bounding_box::BoundingBox;

    fn corpus() -> FaceCorpus {
        FaceCorpus::build(
            vec![
                ExtractedImage {
                    frame: Frame::new(vec![90; 40 * 40 * 3], 40, 40, 3),
                    embeddings: vec![
                        FaceEmbedding::new(vec![0.1, 0.2]),
                        FaceEmbedding::new(vec![0.3, 0.4]),
                    ],
                    boxes: vec![BoundingBox::new(0, 0, 20, 20), BoundingBox::new(20, 20, 40, 40)],
                    path: PathBuf::from("one.jpg"),
                },
                ExtractedImage {
                    frame: Frame::new(vec![30; 40 * 40 * 3], 40, 40, 3),
                    embeddings: vec![FaceEmbedding::new(vec![0.5, 0.6])],
                    boxes: vec![BoundingBox::new(5, 5, 30, 30)],
                    path: PathBuf::from("two.jpg"),
                },
            ],
            16,
        )
        .unwrap()
    }

    #[test]
    fn test_from_corpus_keeps_order_and_paths() {
        let atlas = Atlas::from_corpus(&corpus());
        assert_eq!(atlas.len(), 3);
        assert_eq!(atlas.entries[1].source_path, PathBuf::from("one.jpg"));
        assert_eq!(atlas.entries[2].source_path, PathBuf::from("two.jpg"));
        assert_eq!(atlas.entries[2].embedding.as_slice(), &[0.5, 0.6]);
        assert_eq!(atlas.entries[0].thumbnail.rgb.len(), 16 * 16 * 3);
    }

    #[test]
    fn test_into_corpus_restores_records() {
        let original = corpus();
        let restored = Atlas::from_corpus(&original).into_corpus(16).unwrap();
        assert_eq!(restored.records(), original.records());
        assert_eq!(restored.sources(), original.sources());
    }

    #[test]
    fn test_into_corpus_rejects_truncated_thumbnail() {
        let mut atlas = Atlas::from_corpus(&corpus());
        atlas.entries[0].thumbnail.rgb.truncate(10);
        assert!(matches!(
            atlas.into_corpus(16),
            Err(AtlasError::Thumbnail { index: 0, .. })
        ));
    }
}
