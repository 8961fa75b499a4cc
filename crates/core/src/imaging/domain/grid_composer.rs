use image::{imageops, RgbImage};

use crate::imaging::domain::thumbnail::resize_square;
use crate::shared::frame::Frame;

/// Tiles thumbnails row-major into a `side` x `side` contact sheet of
/// `cell` x `cell` pixel cells.
///
/// Unused cells stay black; thumbnails beyond `side * side` are ignored.
/// Thumbnails of the wrong size are rescaled to the cell; ones that cannot
/// be converted leave their cell black.
pub fn compose_grid(thumbnails: &[Frame], side: usize, cell: u32) -> Frame {
    let sheet_px = side as u32 * cell;
    let mut sheet = RgbImage::new(sheet_px, sheet_px);

    for (slot, thumb) in thumbnails.iter().take(side * side).enumerate() {
        let Some(tile) = resize_square(thumb, cell).and_then(|t| t.to_rgb_image()) else {
            log::warn!("Skipping non-RGB thumbnail in grid cell {slot}");
            continue;
        };
        let x = (slot % side) as u32 * cell;
        let y = (slot / side) as u32 * cell;
        imageops::replace(&mut sheet, &tile, i64::from(x), i64::from(y));
    }

    Frame::from_rgb_image(sheet)
}
