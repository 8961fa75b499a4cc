use std::path::{Path, PathBuf};

use crate::clustering::domain::clustering_error::ClusteringError;
use crate::extraction::domain::image_extractor::ExtractedImage;
use crate::imaging::domain::thumbnail::{resize_square, thumbnail_or_blank};
use crate::shared::embedding::FaceEmbedding;
use crate::shared::frame::Frame;

/// One detected face: its embedding, a fixed-size thumbnail, and a lookup
/// index into [`FaceCorpus::sources`].
#[derive(Clone, Debug, PartialEq)]
pub struct FaceRecord {
    pub embedding: FaceEmbedding,
    pub thumbnail: Frame,
    pub source_index: usize,
}

/// Every face of a run, in discovery order.
///
/// All label sequences produced downstream are positionally aligned with
/// `records`; nothing may reorder it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceCorpus {
    records: Vec<FaceRecord>,
    sources: Vec<PathBuf>,
    thumbnail_size: u32,
    dimension: Option<usize>,
}

impl FaceCorpus {
    /// Flattens per-image extraction results into face records.
    ///
    /// Each face box is cropped and resized to `thumbnail_size`; boxes with
    /// no visible pixels get a blank thumbnail instead of being dropped.
    pub fn build(
        images: Vec<ExtractedImage>,
        thumbnail_size: u32,
    ) -> Result<Self, ClusteringError> {
        let mut corpus = FaceCorpus {
            thumbnail_size,
            ..Default::default()
        };

        for image in images {
            if image.embeddings.len() != image.boxes.len() {
                log::warn!(
                    "{} has {} embeddings but {} face boxes, keeping the first {}",
                    image.path.display(),
                    image.embeddings.len(),
                    image.boxes.len(),
                    image.embeddings.len().min(image.boxes.len())
                );
            }
            let faces: Vec<(FaceEmbedding, Frame)> = image
                .embeddings
                .into_iter()
                .zip(&image.boxes)
                .map(|(embedding, bbox)| {
                    let thumb = thumbnail_or_blank(&image.frame, bbox, thumbnail_size);
                    (embedding, thumb)
                })
                .collect();
            if faces.is_empty() {
                continue;
            }
            corpus.push_source(image.path, faces)?;
        }

        Ok(corpus)
    }

    /// Reassembles a corpus from previously persisted
    /// `(embedding, thumbnail, path)` triples.
    ///
    /// Thumbnails that do not match `thumbnail_size` are rescaled, or
    /// blanked when they cannot be.
    pub fn from_entries<I>(entries: I, thumbnail_size: u32) -> Result<Self, ClusteringError>
    where
        I: IntoIterator<Item = (FaceEmbedding, Frame, PathBuf)>,
    {
        let mut corpus = FaceCorpus {
            thumbnail_size,
            ..Default::default()
        };
        for (embedding, thumbnail, path) in entries {
            let thumbnail = resize_square(&thumbnail, thumbnail_size)
                .unwrap_or_else(|| Frame::blank(thumbnail_size, thumbnail_size));
            let source_index = match corpus.sources.iter().position(|p| *p == path) {
                Some(idx) => idx,
                None => {
                    corpus.sources.push(path.clone());
                    corpus.sources.len() - 1
                }
            };
            corpus.check_dimension(&embedding, &path)?;
            corpus.records.push(FaceRecord {
                embedding,
                thumbnail,
                source_index,
            });
        }
        Ok(corpus)
    }

    fn push_source(
        &mut self,
        path: PathBuf,
        faces: Vec<(FaceEmbedding, Frame)>,
    ) -> Result<(), ClusteringError> {
        for (embedding, _) in &faces {
            self.check_dimension(embedding, &path)?;
        }
        let source_index = self.sources.len();
        self.sources.push(path);
        self.records
            .extend(faces.into_iter().map(|(embedding, thumbnail)| FaceRecord {
                embedding,
                thumbnail,
                source_index,
            }));
        Ok(())
    }

    fn check_dimension(
        &mut self,
        embedding: &FaceEmbedding,
        path: &Path,
    ) -> Result<(), ClusteringError> {
        let expected = *self.dimension.get_or_insert(embedding.dimension());
        if embedding.dimension() != expected {
            return Err(ClusteringError::DimensionMismatch {
                expected,
                found: embedding.dimension(),
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    pub fn records(&self) -> &[FaceRecord] {
        &self.records
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn thumbnail_size(&self) -> u32 {
        self.thumbnail_size
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source_path(&self, record: &FaceRecord) -> Option<&Path> {
        self.sources.get(record.source_index).map(PathBuf::as_path)
    }

    /// Embeddings in record order.
    pub fn embeddings(&self) -> Vec<&FaceEmbedding> {
        self.records.iter().map(|r| &r.embedding).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bounding_box::BoundingBox;

    fn image(path: &str, faces: &[(f32, BoundingBox)]) -> ExtractedImage {
        ExtractedImage {
            frame: Frame::new(vec![120; 100 * 80 * 3], 100, 80, 3),
            embeddings: faces
                .iter()
                .map(|(v, _)| FaceEmbedding::new(vec![*v, 0.0]))
                .collect(),
            boxes: faces.iter().map(|(_, b)| *b).collect(),
            path: PathBuf::from(path),
        }
    }

    fn inside() -> BoundingBox {
        BoundingBox::new(10, 10, 50, 60)
    }

    #[test]
    fn test_flattens_in_discovery_order() {
        let corpus = FaceCorpus::build(
            vec![
                image("a.jpg", &[(1.0, inside()), (2.0, inside())]),
                image("b.jpg", &[(3.0, inside())]),
            ],
            96,
        )
        .unwrap();

        assert_eq!(corpus.len(), 3);
        let firsts: Vec<f32> = corpus
            .records()
            .iter()
            .map(|r| r.embedding.as_slice()[0])
            .collect();
        assert_eq!(firsts, vec![1.0, 2.0, 3.0]);
        assert_eq!(corpus.records()[1].source_index, 0);
        assert_eq!(corpus.records()[2].source_index, 1);
        assert_eq!(
            corpus.source_path(&corpus.records()[2]),
            Some(Path::new("b.jpg"))
        );
    }

    #[test]
    fn test_every_thumbnail_has_fixed_size_even_when_invalid() {
        let corpus = FaceCorpus::build(
            vec![image(
                "a.jpg",
                &[
                    (1.0, inside()),
                    (2.0, BoundingBox::new(500, 500, 600, 600)),
                    (3.0, BoundingBox::new(-40, -40, 20, 20)),
                ],
            )],
            96,
        )
        .unwrap();

        assert_eq!(corpus.len(), 3);
        for record in corpus.records() {
            assert_eq!(record.thumbnail.width(), 96);
            assert_eq!(record.thumbnail.height(), 96);
        }
        assert!(corpus.records()[1].thumbnail.data().iter().all(|&b| b == 0));
        assert!(corpus.records()[0].thumbnail.data().iter().any(|&b| b != 0));
    }

    #[test]
    fn test_count_mismatch_keeps_shorter_list() {
        let mut img = image("a.jpg", &[(1.0, inside()), (2.0, inside())]);
        img.boxes.pop();
        let corpus = FaceCorpus::build(vec![img], 32).unwrap();
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn test_empty_input_gives_empty_corpus() {
        let corpus = FaceCorpus::build(vec![], 96).unwrap();
        assert!(corpus.is_empty());
        assert!(corpus.sources().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mut img = image("b.jpg", &[(1.0, inside())]);
        img.embeddings[0] = FaceEmbedding::new(vec![1.0, 2.0, 3.0]);
        let result = FaceCorpus::build(vec![image("a.jpg", &[(1.0, inside())]), img], 96);
        assert_eq!(
            result,
            Err(ClusteringError::DimensionMismatch {
                expected: 2,
                found: 3,
                path: PathBuf::from("b.jpg"),
            })
        );
    }

    #[test]
    fn test_from_entries_shares_source_indices() {
        let entries = vec![
            (FaceEmbedding::new(vec![1.0]), Frame::blank(96, 96), PathBuf::from("a.jpg")),
            (FaceEmbedding::new(vec![2.0]), Frame::blank(48, 48), PathBuf::from("b.jpg")),
            (FaceEmbedding::new(vec![3.0]), Frame::blank(96, 96), PathBuf::from("a.jpg")),
        ];
        let corpus = FaceCorpus::from_entries(entries, 96).unwrap();
        assert_eq!(corpus.sources().len(), 2);
        assert_eq!(corpus.records()[2].source_index, 0);
        assert_eq!(corpus.records()[1].thumbnail.width(), 96);
    }
}
