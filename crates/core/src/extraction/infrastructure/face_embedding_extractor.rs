use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_embedder::FaceEmbedder;
use crate::extraction::domain::image_extractor::{ExtractedImage, ImageExtractor};
use crate::imaging::domain::image_reader::ImageReader;

/// read → detect → embed for a single image file.
pub struct FaceEmbeddingExtractor {
    reader: Box<dyn ImageReader>,
    detector: Box<dyn FaceDetector>,
    embedder: Box<dyn FaceEmbedder>,
}

impl FaceEmbeddingExtractor {
    pub fn new(
        reader: Box<dyn ImageReader>,
        detector: Box<dyn FaceDetector>,
        embedder: Box<dyn FaceEmbedder>,
    ) -> Self {
        Self {
            reader,
            detector,
            embedder,
        }
    }
}

impl ImageExtractor for FaceEmbeddingExtractor {
    fn extract(
        &self,
        path: &Path,
    ) -> Result<Option<ExtractedImage>, Box<dyn std::error::Error + Send + Sync>> {
        log::debug!("Reading {}", path.display());
        let frame = self.reader.read(path)?;

        let boxes = self.detector.detect(&frame)?;
        if boxes.is_empty() {
            log::debug!("No faces in {}", path.display());
            return Ok(None);
        }

        let embeddings = self.embedder.embed(&frame, &boxes)?;
        if embeddings.len() != boxes.len() {
            return Err(format!(
                "Embedder returned {} embeddings for {} faces",
                embeddings.len(),
                boxes.len()
            )
            .into());
        }

        Ok(Some(ExtractedImage {
            frame,
            embeddings,
            boxes,
            path: path.to_path_buf(),
        }))
    }
}
