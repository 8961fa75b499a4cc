use std::path::{Path, PathBuf};

use crate::extraction::domain::image_extractor::{ExtractedImage, ImageExtractor};
use crate::pipeline::pipeline_logger::PipelineLogger;

/// A file that could not be turned into face data. The run continues
/// without it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl ExtractionFailure {
    pub fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Everything an extraction pass produced, in input order.
#[derive(Clone, Debug, Default)]
pub struct ExtractionBatch {
    /// Images with at least one face.
    pub images: Vec<ExtractedImage>,
    pub failures: Vec<ExtractionFailure>,
}

/// Abstracts how a list of image files is fanned out to an extractor.
///
/// Implementations must return images in the order of `paths` regardless
/// of completion order.
pub trait ExtractionExecutor: Send {
    fn execute(
        &self,
        extractor: &dyn ImageExtractor,
        paths: &[PathBuf],
        logger: &mut dyn PipelineLogger,
    ) -> ExtractionBatch;
}
