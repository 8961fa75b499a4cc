pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Neighborhood radius of the density pass (embedding-to-embedding distance).
pub const DEFAULT_DENSITY_RADIUS: f64 = 0.475;
pub const DEFAULT_MIN_POINTS: usize = 2;

/// Acceptance radius around a cluster centroid (embedding-to-centroid distance).
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 0.4625;

/// Side length in pixels of every face thumbnail and contact-sheet cell.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 96;

pub const DEFAULT_WORKER_COUNT: usize = 3;

pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

pub const ATLAS_FILE_NAME: &str = "faceatlas.json";
