use std::path::Path;

use crate::shared::frame::Frame;

/// Output boundary for contact sheets and outlier thumbnails.
pub trait ImageWriter: Send {
    /// Writes `frame` to `path`; the encoding follows the path's extension.
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
