use std::path::PathBuf;
use std::process;

use clap::Parser;

use face_cluster_core::atlas::domain::atlas::Atlas;
use face_cluster_core::atlas::domain::atlas_store::AtlasStore;
use face_cluster_core::atlas::infrastructure::json_atlas_store::JsonAtlasStore;
use face_cluster_core::detection::domain::embedding_distance::DistanceMetric;
use face_cluster_core::detection::infrastructure::onnx_arcface_embedder::OnnxArcFaceEmbedder;
use face_cluster_core::detection::infrastructure::onnx_yolo_detector::{
    OnnxYoloDetector, DEFAULT_CONFIDENCE,
};
use face_cluster_core::extraction::infrastructure::face_embedding_extractor::FaceEmbeddingExtractor;
use face_cluster_core::imaging::infrastructure::image_directory::list_images;
use face_cluster_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use face_cluster_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use face_cluster_core::pipeline::cluster_config::ClusterConfig;
use face_cluster_core::pipeline::cluster_error::ClusterError;
use face_cluster_core::pipeline::cluster_faces_use_case::{ClusterFacesUseCase, ClusterReport};
use face_cluster_core::pipeline::extract_faces_use_case::{
    ExtractFacesUseCase, ExtractionOutput,
};
use face_cluster_core::pipeline::infrastructure::threaded_extraction_executor::ThreadedExtractionExecutor;
use face_cluster_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use face_cluster_core::shared::constants::{
    ATLAS_FILE_NAME, DEFAULT_DENSITY_RADIUS, DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_POINTS,
    DEFAULT_OUTLIER_THRESHOLD, DEFAULT_THUMBNAIL_SIZE, DEFAULT_TOLERANCE, DEFAULT_WORKER_COUNT,
    EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use face_cluster_core::shared::model_resolver;

type CliError = Box<dyn std::error::Error + Send + Sync>;

/// Group the faces in a photo folder by identity and write one contact
/// sheet per person.
#[derive(Parser)]
#[command(name = "face-cluster")]
struct Cli {
    /// Directory of input images (not searched recursively).
    input_dir: PathBuf,

    /// Directory that receives grid_<label>.jpg and outlier_grid_<label>_<n>.jpg.
    output_dir: PathBuf,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Neighborhood radius used to count identities. The default is
    /// calibrated for 128-d dlib encodings; the bundled ArcFace model
    /// produces unit vectors, where about 1.1 (cosine similarity 0.4) groups
    /// one person's photos.
    #[arg(long, default_value_t = DEFAULT_DENSITY_RADIUS)]
    density_radius: f64,

    /// Faces (including itself) a face needs within the radius to seed an identity.
    #[arg(long, default_value_t = DEFAULT_MIN_POINTS)]
    min_points: usize,

    /// Faces at least this far from their identity's centroid go to outlier
    /// images. Same calibration caveat as --density-radius.
    #[arg(long, default_value_t = DEFAULT_OUTLIER_THRESHOLD)]
    outlier_threshold: f64,

    /// Thumbnail edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_THUMBNAIL_SIZE)]
    thumbnail_size: u32,

    /// Parallel extraction workers.
    #[arg(long, default_value_t = DEFAULT_WORKER_COUNT)]
    workers: usize,

    /// k-means iteration cap.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// k-means convergence tolerance, relative to the mean per-feature
    /// variance of the embeddings.
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Embedding distance: euclidean or cosine.
    #[arg(long, default_value = "euclidean")]
    metric: String,

    /// Atlas file (default: <output_dir>/faceatlas.json).
    #[arg(long)]
    atlas: Option<PathBuf>,

    /// Cluster the faces stored in the atlas instead of extracting again.
    #[arg(long)]
    load_atlas: bool,

    /// Do not write the atlas after extraction.
    #[arg(long)]
    no_save_atlas: bool,
}

impl Cli {
    fn config(&self) -> ClusterConfig {
        ClusterConfig {
            density_radius: self.density_radius,
            min_points: self.min_points,
            outlier_threshold: self.outlier_threshold,
            thumbnail_size: self.thumbnail_size,
            worker_count: self.workers,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            ..ClusterConfig::default()
        }
    }

    fn atlas_path(&self) -> PathBuf {
        self.atlas
            .clone()
            .unwrap_or_else(|| self.output_dir.join(ATLAS_FILE_NAME))
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    validate(&cli)?;

    let metric: DistanceMetric = cli.metric.parse()?;
    let config = cli.config();
    config.validate()?;
    log::info!("Clustering with {metric} distance");

    let store = JsonAtlasStore::new(cli.atlas_path());
    if cli.load_atlas && !store.exists() {
        return Err(format!("Atlas not found: {}", store.path().display()).into());
    }
    let mut logger = StdoutPipelineLogger::default();

    let extraction = if cli.load_atlas {
        let corpus = store.load()?.into_corpus(config.thumbnail_size)?;
        ExtractionOutput::from_corpus(corpus)
    } else {
        let output = extract(&cli, &config, &mut logger)?;
        if !cli.no_save_atlas {
            save_atlas(&store, &output);
        }
        output
    };

    let use_case =
        ClusterFacesUseCase::new(config, metric.build(), Box::new(ImageFileWriter::new()));
    let report = use_case.execute(extraction, &cli.output_dir, &mut logger)?;

    logger.summary();
    print_report(&report);
    Ok(())
}

fn extract(
    cli: &Cli,
    config: &ClusterConfig,
    logger: &mut dyn PipelineLogger,
) -> Result<ExtractionOutput, CliError> {
    let paths = list_images(&cli.input_dir).map_err(|source| ClusterError::InputDir {
        path: cli.input_dir.clone(),
        source,
    })?;
    if paths.is_empty() {
        log::info!("No images found in {}", cli.input_dir.display());
        return Ok(ExtractionOutput::default());
    }

    let extractor = build_extractor(cli)?;
    let use_case = ExtractFacesUseCase::new(
        Box::new(extractor),
        Box::new(ThreadedExtractionExecutor::new(config.worker_count)),
        config.thumbnail_size,
    );
    Ok(use_case.execute(&paths, logger)?)
}

fn build_extractor(cli: &Cli) -> Result<FaceEmbeddingExtractor, CliError> {
    let detector_path = resolve_model(YOLO_MODEL_NAME, YOLO_MODEL_URL)?;
    let embedder_path = resolve_model(EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL)?;

    // One inference session per extraction worker.
    let detector = OnnxYoloDetector::new(&detector_path, cli.confidence, cli.workers)?;
    let embedder = OnnxArcFaceEmbedder::new(&embedder_path, cli.workers)?;
    Ok(FaceEmbeddingExtractor::new(
        Box::new(ImageFileReader::new()),
        Box::new(detector),
        Box::new(embedder),
    ))
}

fn resolve_model(name: &'static str, url: &str) -> Result<PathBuf, CliError> {
    log::info!("Resolving model: {name}");
    let path = model_resolver::resolve(
        name,
        url,
        None,
        Some(Box::new(move |downloaded: u64, total: u64| {
            download_progress(name, downloaded, total)
        })),
    )?;
    Ok(path)
}

/// Best effort: a failed save is logged and the run continues.
fn save_atlas(store: &JsonAtlasStore, output: &ExtractionOutput) {
    if output.corpus.is_empty() {
        log::debug!("No faces extracted, not writing an atlas");
        return;
    }
    if let Err(e) = store.save(&Atlas::from_corpus(&output.corpus)) {
        log::warn!("Could not save atlas to {}: {e}", store.path().display());
    }
}

fn validate(cli: &Cli) -> Result<(), CliError> {
    if !cli.load_atlas && !cli.input_dir.is_dir() {
        return Err(format!("Input directory not found: {}", cli.input_dir.display()).into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.load_atlas && cli.no_save_atlas {
        log::warn!("--no-save-atlas has no effect together with --load-atlas");
    }
    Ok(())
}

fn print_report(report: &ClusterReport) {
    println!("Images processed: {}", report.image_count);
    println!("Number of faces detected: {}", report.face_count);
    println!("Number of people found: {}", report.cluster_count);
    println!(
        "Faces in grids: {}, outliers: {}",
        report.accepted_count,
        report.outliers.len()
    );
    if !report.extraction_failures.is_empty() {
        println!("Skipped images:");
        for failure in &report.extraction_failures {
            println!("  {}: {}", failure.path.display(), failure.reason);
        }
    }
    if !report.write_failures.is_empty() {
        println!("Failed writes:");
        for failure in &report.write_failures {
            println!("  {}: {}", failure.path.display(), failure.reason);
        }
    }
    println!("Wrote {} files", report.written.len());
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}
