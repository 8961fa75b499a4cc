/// ArcFace face embedder using ONNX Runtime.
///
/// Each face box is cropped, resized to 112x112, normalized and run through
/// the model; outputs are L2-normalized so Euclidean and cosine distances
/// agree on ordering.
use std::path::Path;

use ort::session::Session;

use crate::detection::domain::face_embedder::FaceEmbedder;
use crate::detection::infrastructure::execution_provider::session_builder;
use crate::detection::infrastructure::math::l2_normalize;
use crate::detection::infrastructure::session_pool::SessionPool;
use crate::imaging::domain::thumbnail::crop_thumbnail;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::embedding::FaceEmbedding;
use crate::shared::frame::Frame;

const INPUT_SIZE: u32 = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct OnnxArcFaceEmbedder {
    sessions: SessionPool<Session>,
}

impl OnnxArcFaceEmbedder {
    /// Loads the model into `pool_size` inference sessions.
    pub fn new(
        model_path: &Path,
        pool_size: usize,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let sessions = SessionPool::build(
            pool_size,
            || -> Result<Session, Box<dyn std::error::Error + Send + Sync>> {
                Ok(session_builder(pool_size)?.commit_from_file(model_path)?)
            },
        )?;
        Ok(Self { sessions })
    }

    fn embed_one(
        &self,
        face: &Frame,
    ) -> Result<FaceEmbedding, Box<dyn std::error::Error + Send + Sync>> {
        let input_value = ort::value::Tensor::from_array(preprocess(face))?;
        let mut embedding = self.sessions.with(
            |session| -> Result<Vec<f32>, Box<dyn std::error::Error + Send + Sync>> {
                let outputs = session.run(ort::inputs![input_value])?;
                let embedding_array = outputs[0].try_extract_array::<f32>()?;
                Ok(embedding_array
                    .as_slice()
                    .ok_or("Cannot get embedding slice")?
                    .to_vec())
            },
        )?;
        l2_normalize(&mut embedding);
        Ok(FaceEmbedding::new(embedding))
    }
}

impl FaceEmbedder for OnnxArcFaceEmbedder {
    fn embed(
        &self,
        frame: &Frame,
        boxes: &[BoundingBox],
    ) -> Result<Vec<FaceEmbedding>, Box<dyn std::error::Error + Send + Sync>> {
        boxes
            .iter()
            .map(|bbox| {
                let face = crop_thumbnail(frame, bbox, INPUT_SIZE)
                    .ok_or_else(|| format!("Face box {bbox:?} is outside the image"))?;
                self.embed_one(&face)
            })
            .collect()
    }
}

/// Normalizes a 112x112 RGB crop into a `[1, 3, 112, 112]` tensor.
fn preprocess(face: &Frame) -> ndarray::Array4<f32> {
    let size = INPUT_SIZE as usize;
    let src = face.as_ndarray();
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));
    for y in 0..size.min(face.height() as usize) {
        for x in 0..size.min(face.width() as usize) {
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[y, x, c]] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(value: u8) -> Frame {
        let n = (INPUT_SIZE * INPUT_SIZE * 3) as usize;
        Frame::new(vec![value; n], INPUT_SIZE, INPUT_SIZE, 3)
    }

    #[test]
    fn test_preprocess_shape() {
        let tensor = preprocess(&face(128));
        assert_eq!(tensor.shape(), &[1, 3, 112, 112]);
    }

    #[test]
    fn test_preprocess_normalization_mid() {
        let tensor = preprocess(&face(127));
        let expected = (127.0 - 127.5) / 127.5;
        assert!((tensor[[0, 0, 0, 0]] - expected).abs() < 0.01);
    }

    #[test]
    fn test_preprocess_normalization_extremes() {
        assert!((preprocess(&face(255))[[0, 1, 5, 5]] - 1.0).abs() < 0.01);
        assert!((preprocess(&face(0))[[0, 2, 5, 5]] + 1.0).abs() < 0.01);
    }
}
