use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for locating faces in a still image.
///
/// Shared across extraction workers, hence `&self` and `Sync`.
pub trait FaceDetector: Send + Sync {
    fn detect(
        &self,
        frame: &Frame,
    ) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error + Send + Sync>>;
}
