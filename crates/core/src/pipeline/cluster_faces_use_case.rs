use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::clustering::domain::clustering_error::ClusteringError;
use crate::clustering::domain::density_estimator::DensityEstimator;
use crate::clustering::domain::hard_assignment::HardAssignment;
use crate::clustering::domain::outlier_filter::{Outlier, OutlierFilter};
use crate::detection::domain::embedding_distance::EmbeddingDistance;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::cluster_config::ClusterConfig;
use crate::pipeline::cluster_error::ClusterError;
use crate::pipeline::extract_faces_use_case::ExtractionOutput;
use crate::pipeline::extraction_executor::ExtractionFailure;
use crate::pipeline::grid_summarizer::{GridSummarizer, WriteFailure};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::constants::DEFAULT_DENSITY_RADIUS;

/// Shown when the default radius finds nobody; ArcFace vectors are unit
/// length, so cosine similarity 0.4 sits at Euclidean distance ~1.1.
const DEFAULT_RADIUS_HINT: &str = "No identity found at the default density radius, \
     which is calibrated for 128-d dlib encodings. For L2-normalised ArcFace \
     embeddings try --density-radius 1.1 and --outlier-threshold 1.1";

/// What a run produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterReport {
    pub image_count: usize,
    pub face_count: usize,
    pub cluster_count: usize,
    /// Faces the density pass left unlabeled before hard assignment.
    pub noise_count: usize,
    pub accepted_count: usize,
    pub outliers: Vec<Outlier>,
    pub written: Vec<PathBuf>,
    pub write_failures: Vec<WriteFailure>,
    pub extraction_failures: Vec<ExtractionFailure>,
}

/// Corpus → estimate → assign → filter → summarize.
///
/// The density pass only decides how many identities there are and where
/// each starts; k-means then labels every face, and the outlier filter
/// decides which faces make it onto the contact sheets.
pub struct ClusterFacesUseCase {
    config: ClusterConfig,
    distance: Box<dyn EmbeddingDistance>,
    summarizer: GridSummarizer,
}

impl ClusterFacesUseCase {
    pub fn new(
        config: ClusterConfig,
        distance: Box<dyn EmbeddingDistance>,
        writer: Box<dyn ImageWriter>,
    ) -> Self {
        let summarizer = GridSummarizer::new(writer, config.grid_breakpoints.clone());
        Self {
            config,
            distance,
            summarizer,
        }
    }

    pub fn execute(
        &self,
        input: ExtractionOutput,
        output_dir: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<ClusterReport, ClusterError> {
        self.config.validate()?;
        let ExtractionOutput {
            corpus,
            image_count,
            failures,
        } = input;

        let mut report = ClusterReport {
            image_count,
            face_count: corpus.len(),
            extraction_failures: failures,
            ..Default::default()
        };
        logger.info(&format!("Number of faces detected: {}", corpus.len()));
        logger.metric("faces", corpus.len() as f64);
        if corpus.is_empty() {
            return Ok(report);
        }

        let embeddings = corpus.embeddings();
        let distance = &*self.distance;

        let start = Instant::now();
        let estimate =
            DensityEstimator::new(self.config.density_radius, self.config.min_points, distance)
                .estimate(&embeddings);
        logger.timing("estimate", elapsed_ms(start));
        if estimate.cluster_count == 0 {
            if self.config.density_radius == DEFAULT_DENSITY_RADIUS {
                logger.warn(DEFAULT_RADIUS_HINT);
            }
            return Err(ClusteringError::NoClusters {
                face_count: corpus.len(),
            }
            .into());
        }
        report.cluster_count = estimate.cluster_count;
        report.noise_count = estimate.noise_count();
        logger.info(&format!("Number of people found: {}", estimate.cluster_count));
        logger.metric("clusters", estimate.cluster_count as f64);

        let start = Instant::now();
        let assignment = HardAssignment::new(self.config.max_iterations, self.config.tolerance)
            .assign(&embeddings, estimate.cluster_count, &estimate.seeds)?;
        logger.timing("assign", elapsed_ms(start));

        let start = Instant::now();
        let filtered = OutlierFilter::new(self.config.outlier_threshold, distance)
            .filter(&embeddings, &assignment);
        logger.timing("filter", elapsed_ms(start));
        logger.metric("outliers", filtered.outliers.len() as f64);

        let start = Instant::now();
        let summary = self.summarizer.summarize(&corpus, &filtered, output_dir);
        logger.timing("summarize", elapsed_ms(start));

        report.accepted_count = filtered.accepted_count();
        report.outliers = filtered.outliers;
        report.written = summary.written;
        report.write_failures = summary.failures;
        Ok(report)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
