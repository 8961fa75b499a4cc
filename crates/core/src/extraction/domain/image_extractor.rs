use std::path::{Path, PathBuf};

use crate::shared::bounding_box::BoundingBox;
use crate::shared::embedding::FaceEmbedding;
use crate::shared::frame::Frame;

/// Faces found in one source image: parallel embedding and box lists plus
/// the decoded image they were taken from.
#[derive(Clone, Debug)]
pub struct ExtractedImage {
    pub frame: Frame,
    pub embeddings: Vec<FaceEmbedding>,
    pub boxes: Vec<BoundingBox>,
    pub path: PathBuf,
}

/// Per-file face extraction boundary.
///
/// `Ok(None)` means the image decoded but holds no face. Implementations
/// are called concurrently from the extraction worker pool.
pub trait ImageExtractor: Send + Sync {
    fn extract(
        &self,
        path: &Path,
    ) -> Result<Option<ExtractedImage>, Box<dyn std::error::Error + Send + Sync>>;
}
