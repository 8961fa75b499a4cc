use std::path::Path;

use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;

/// Decodes image files with the `image` crate, converting any pixel format
/// to 8-bit RGB.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error + Send + Sync>> {
        let img = image::open(path)?.to_rgb8();
        if img.width() == 0 || img.height() == 0 {
            return Err(format!("Empty image: {}", path.display()).into());
        }
        Ok(Frame::from_rgb_image(img))
    }
}
