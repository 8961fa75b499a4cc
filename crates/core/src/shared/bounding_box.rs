/// A detected face rectangle in source-image pixel coordinates.
///
/// Detectors may report boxes that extend past the image edges, so the
/// coordinates are signed and unclamped; [`BoundingBox::clamp_to`] produces
/// the visible part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rounds a floating-point `[x1, y1, x2, y2]` detection to pixel bounds.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(
            x1.floor() as i32,
            y1.floor() as i32,
            x2.ceil() as i32,
            y2.ceil() as i32,
        )
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Intersection with a `width` x `height` image, or `None` when nothing
    /// of the box is visible.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        let clamped = BoundingBox::new(
            self.left.clamp(0, width as i32),
            self.top.clamp(0, height as i32),
            self.right.clamp(0, width as i32),
            self.bottom.clamp(0, height as i32),
        );
        if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        }
    }
}
