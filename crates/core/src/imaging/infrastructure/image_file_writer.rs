use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;

use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// JPEG quality for contact sheets and outlier thumbnails.
const JPEG_QUALITY: u8 = 92;

/// Encodes frames with the `image` crate, picking the format from the file
/// extension. JPEG output uses [`JPEG_QUALITY`] instead of the crate default.
pub struct ImageFileWriter {
    jpeg_quality: u8,
}

impl ImageFileWriter {
    pub fn new() -> Self {
        Self {
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let format = ImageFormat::from_path(path)?;
        let img = frame
            .to_rgb_image()
            .ok_or_else(|| format!("cannot encode a {}-channel frame as RGB", frame.channels()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if format == ImageFormat::Jpeg {
            let out = BufWriter::new(File::create(path)?);
            JpegEncoder::new_with_quality(out, self.jpeg_quality).encode_image(&img)?;
        } else {
            img.save_with_format(path, format)?;
        }
        Ok(())
    }
}
