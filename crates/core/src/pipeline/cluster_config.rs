use crate::clustering::domain::grid_layout::GridBreakpoints;
use crate::pipeline::cluster_error::ClusterError;
use crate::shared::constants::{
    DEFAULT_DENSITY_RADIUS, DEFAULT_MAX_ITERATIONS, DEFAULT_MIN_POINTS,
    DEFAULT_OUTLIER_THRESHOLD, DEFAULT_THUMBNAIL_SIZE, DEFAULT_TOLERANCE, DEFAULT_WORKER_COUNT,
};

/// Tunables for one clustering run.
///
/// `density_radius` (the DBSCAN ε) and `outlier_threshold` are independent
/// even though their defaults are close.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterConfig {
    pub density_radius: f64,
    pub min_points: usize,
    pub outlier_threshold: f64,
    pub thumbnail_size: u32,
    pub grid_breakpoints: GridBreakpoints,
    pub worker_count: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            density_radius: DEFAULT_DENSITY_RADIUS,
            min_points: DEFAULT_MIN_POINTS,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            grid_breakpoints: GridBreakpoints::default(),
            worker_count: DEFAULT_WORKER_COUNT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), ClusterError> {
        let invalid = |msg: String| Err(ClusterError::InvalidConfig(msg));

        if !(self.density_radius.is_finite() && self.density_radius > 0.0) {
            return invalid(format!(
                "density radius must be positive, got {}",
                self.density_radius
            ));
        }
        if self.min_points == 0 {
            return invalid("min points must be at least 1".into());
        }
        if !(self.outlier_threshold.is_finite() && self.outlier_threshold > 0.0) {
            return invalid(format!(
                "outlier threshold must be positive, got {}",
                self.outlier_threshold
            ));
        }
        if self.thumbnail_size == 0 {
            return invalid("thumbnail size must be at least 1".into());
        }
        if self.worker_count == 0 {
            return invalid("worker count must be at least 1".into());
        }
        if self.max_iterations == 0 {
            return invalid("max iterations must be at least 1".into());
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return invalid(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            ));
        }
        let sides = self.grid_breakpoints.steps().iter().map(|&(_, side)| side);
        if std::iter::once(self.grid_breakpoints.fallback_side())
            .chain(sides)
            .any(|side| side == 0)
        {
            return invalid("grid sides must be at least 1".into());
        }
        Ok(())
    }
}
