use crate::shared::bounding_box::BoundingBox;
use crate::shared::embedding::FaceEmbedding;
use crate::shared::frame::Frame;

/// Domain interface for turning detected faces into identity embeddings.
///
/// Returns one embedding per box, in box order.
pub trait FaceEmbedder: Send + Sync {
    fn embed(
        &self,
        frame: &Frame,
        boxes: &[BoundingBox],
    ) -> Result<Vec<FaceEmbedding>, Box<dyn std::error::Error + Send + Sync>>;
}
