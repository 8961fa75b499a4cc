use std::path::PathBuf;
use std::time::Instant;

use crate::clustering::domain::face_corpus::FaceCorpus;
use crate::extraction::domain::image_extractor::ImageExtractor;
use crate::pipeline::cluster_error::ClusterError;
use crate::pipeline::extraction_executor::{ExtractionExecutor, ExtractionFailure};
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Faces gathered for a run, whether freshly extracted or loaded from an
/// atlas.
#[derive(Clone, Debug, Default)]
pub struct ExtractionOutput {
    pub corpus: FaceCorpus,
    /// Images submitted for extraction.
    pub image_count: usize,
    pub failures: Vec<ExtractionFailure>,
}

impl ExtractionOutput {
    /// Wraps a corpus that did not come from extraction (an atlas).
    pub fn from_corpus(corpus: FaceCorpus) -> Self {
        Self {
            image_count: corpus.sources().len(),
            corpus,
            failures: Vec::new(),
        }
    }
}

/// Image files → face corpus, using the configured executor for the
/// per-file work.
pub struct ExtractFacesUseCase {
    extractor: Box<dyn ImageExtractor>,
    executor: Box<dyn ExtractionExecutor>,
    thumbnail_size: u32,
}

impl ExtractFacesUseCase {
    pub fn new(
        extractor: Box<dyn ImageExtractor>,
        executor: Box<dyn ExtractionExecutor>,
        thumbnail_size: u32,
    ) -> Self {
        Self {
            extractor,
            executor,
            thumbnail_size,
        }
    }

    pub fn execute(
        &self,
        paths: &[PathBuf],
        logger: &mut dyn PipelineLogger,
    ) -> Result<ExtractionOutput, ClusterError> {
        let start = Instant::now();
        logger.info(&format!("Extracting faces from {} images", paths.len()));

        let batch = self.executor.execute(&*self.extractor, paths, logger);
        let corpus = FaceCorpus::build(batch.images, self.thumbnail_size)?;

        logger.timing("extract", start.elapsed().as_secs_f64() * 1000.0);
        if !batch.failures.is_empty() {
            logger.info(&format!(
                "Skipped {} of {} images that could not be processed",
                batch.failures.len(),
                paths.len()
            ));
        }

        Ok(ExtractionOutput {
            corpus,
            image_count: paths.len(),
            failures: batch.failures,
        })
    }
}
