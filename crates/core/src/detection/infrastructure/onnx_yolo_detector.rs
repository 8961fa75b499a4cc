/// YOLO face detector using ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference and NMS post-processing for
/// still photos. One detector serves every extraction worker through a pool
/// of sessions.
use std::path::Path;

use ort::session::Session;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::execution_provider::session_builder;
use crate::detection::infrastructure::math::{nms, ScoredBox};
use crate::detection::infrastructure::session_pool::SessionPool;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Fallback YOLO model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for face detection.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxYoloDetector {
    sessions: SessionPool<Session>,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Load a YOLO ONNX model into `pool_size` inference sessions.
    ///
    /// The input resolution is read from the model's NCHW input shape,
    /// falling back to 640 when the shape is dynamic.
    pub fn new(
        model_path: &Path,
        confidence: f64,
        pool_size: usize,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let sessions = SessionPool::build(
            pool_size,
            || -> Result<Session, Box<dyn std::error::Error + Send + Sync>> {
                Ok(session_builder(pool_size)?.commit_from_file(model_path)?)
            },
        )?;
        let input_size = sessions.with(|session| model_input_size(session));
        log::debug!("YOLO input size: {input_size}");

        Ok(Self {
            sessions,
            confidence,
            input_size,
        })
    }
}

fn model_input_size(session: &Session) -> u32 {
    session
        .inputs()
        .first()
        .and_then(|input| match input.dtype() {
            ort::value::ValueType::Tensor { ref shape, .. }
                if shape.len() >= 4 && shape[2] > 0 =>
            {
                Some(shape[2] as u32)
            }
            _ => None,
        })
        .unwrap_or(DEFAULT_INPUT_SIZE)
}

impl FaceDetector for OnnxYoloDetector {
    fn detect(
        &self,
        frame: &Frame,
    ) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error + Send + Sync>> {
        let (input_tensor, letterbox) = letterbox(frame, self.input_size);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;

        let (shape, data) = self.sessions.with(
            |session| -> Result<_, Box<dyn std::error::Error + Send + Sync>> {
                let outputs = session.run(ort::inputs![input_value])?;
                if outputs.len() == 0 {
                    return Err("YOLO model produced no outputs".into());
                }
                let tensor = outputs[0].try_extract_array::<f32>()?;
                let data = tensor.as_slice().ok_or("Cannot get tensor slice")?.to_vec();
                Ok((tensor.shape().to_vec(), data))
            },
        )?;
        if shape.len() != 3 {
            return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
        }

        // Output is [1, features, detections] (transposed) or [1, detections, features].
        let transposed = shape[1] < shape[2];
        let (num_dets, num_feats) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };
        if num_feats < 5 {
            return Err(format!("YOLO output has too few features: {num_feats}").into());
        }
        let feature = |det: usize, f: usize| -> f64 {
            if transposed {
                data[f * num_dets + det] as f64
            } else {
                data[det * num_feats + f] as f64
            }
        };

        let mut raw = Vec::new();
        for det in 0..num_dets {
            let score = feature(det, 4);
            if score < self.confidence {
                continue;
            }
            let (cx, cy, w, h) = (
                feature(det, 0),
                feature(det, 1),
                feature(det, 2),
                feature(det, 3),
            );
            raw.push(ScoredBox {
                bbox: letterbox.to_source([cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0]),
                score,
            });
        }

        let boxes = nms(raw, NMS_IOU_THRESH)
            .into_iter()
            .map(|d| BoundingBox::from_corners(d.bbox[0], d.bbox[1], d.bbox[2], d.bbox[3]))
            .filter_map(|b| b.clamp_to(frame.width(), frame.height()))
            .collect();
        Ok(boxes)
    }
}

/// Geometry needed to map letterboxed coordinates back to the source image.
#[derive(Clone, Copy, Debug)]
struct Letterbox {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn to_source(&self, b: [f64; 4]) -> [f64; 4] {
        let (px, py) = (self.pad_x as f64, self.pad_y as f64);
        [
            (b[0] - px) / self.scale,
            (b[1] - py) / self.scale,
            (b[2] - px) / self.scale,
            (b[3] - py) / self.scale,
        ]
    }
}

/// Letterbox-resize a frame to `target_size` x `target_size` as an NCHW
/// float tensor in `[0, 1]`.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, Letterbox) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbor resize into the padded region.
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (
        tensor,
        Letterbox {
            scale,
            pad_x,
            pad_y,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 → scale 3.2, 640x320 content, 160px vertical padding
        let frame = Frame::new(vec![128u8; 200 * 100 * 3], 200, 100, 3);
        let (tensor, lb) = letterbox(&frame, 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert!((lb.scale - 3.2).abs() < 0.01);
        assert_eq!(lb.pad_x, 0);
        assert_eq!(lb.pad_y, 160);
    }

    #[test]
    fn test_letterbox_values_normalized() {
        let frame = Frame::new(vec![255u8; 100 * 50 * 3], 100, 50, 3);
        let (tensor, lb) = letterbox(&frame, 640);

        let y = lb.pad_y as usize + 1;
        let x = lb.pad_x as usize + 1;
        assert!((tensor[[0, 0, y, x]] - 1.0).abs() < 0.01);
        assert!((tensor[[0, 0, 0, 0]] - PAD_VALUE).abs() < 0.01);
    }

    #[test]
    fn test_to_source_inverts_letterbox() {
        let lb = Letterbox {
            scale: 2.0,
            pad_x: 0,
            pad_y: 100,
        };
        let mapped = lb.to_source([20.0, 140.0, 60.0, 180.0]);
        assert_eq!(mapped, [10.0, 20.0, 30.0, 40.0]);
    }
}
