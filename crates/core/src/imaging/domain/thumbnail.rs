use image::imageops::FilterType;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Crops `bbox` out of `frame` and resizes it to a `size` x `size` thumbnail.
///
/// Parts of the box outside the frame are clipped. Returns `None` when no
/// pixel of the box is visible or the frame is not RGB.
pub fn crop_thumbnail(frame: &Frame, bbox: &BoundingBox, size: u32) -> Option<Frame> {
    if frame.channels() != 3 {
        return None;
    }
    let visible = bbox.clamp_to(frame.width(), frame.height())?;
    let crop = crop(frame, &visible);
    let img = crop.to_rgb_image()?;
    let resized = image::imageops::resize(&img, size, size, FilterType::Triangle);
    Some(Frame::from_rgb_image(resized))
}

/// Like [`crop_thumbnail`], substituting a blank thumbnail on failure so the
/// caller always gets exactly `size` x `size` pixels.
pub fn thumbnail_or_blank(frame: &Frame, bbox: &BoundingBox, size: u32) -> Frame {
    crop_thumbnail(frame, bbox, size).unwrap_or_else(|| {
        log::warn!(
            "Face box {bbox:?} lies outside the {}x{} image, using a blank thumbnail",
            frame.width(),
            frame.height()
        );
        Frame::blank(size, size)
    })
}

/// Resizes an arbitrary frame to a square thumbnail.
pub fn resize_square(frame: &Frame, size: u32) -> Option<Frame> {
    if frame.width() == size && frame.height() == size {
        return Some(frame.clone());
    }
    let img = frame.to_rgb_image()?;
    let resized = image::imageops::resize(&img, size, size, FilterType::Triangle);
    Some(Frame::from_rgb_image(resized))
}

fn crop(frame: &Frame, visible: &BoundingBox) -> Frame {
    let x1 = visible.left as usize;
    let y1 = visible.top as usize;
    let x2 = visible.right as usize;
    let y2 = visible.bottom as usize;
    let channels = frame.channels() as usize;

    let src = frame.as_ndarray();
    let mut data = Vec::with_capacity((x2 - x1) * (y2 - y1) * channels);
    for row in y1..y2 {
        for col in x1..x2 {
            for c in 0..channels {
                data.push(src[[row, col, c]]);
            }
        }
    }

    Frame::new(
        data,
        (x2 - x1) as u32,
        (y2 - y1) as u32,
        channels as u8,
    )
}
