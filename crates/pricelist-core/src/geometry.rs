//! Axis-aligned bounding boxes for positioned text.
//!
//! Both extraction strategies position text with these boxes: the text layer
//! in PDF points, the OCR fallback in raster pixels. All clustering logic is
//! written against relative measures (overlaps, distances scaled by token
//! height) so the same code serves both coordinate spaces.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left coordinate (x)
    pub left: f32,
    /// Top coordinate (y)
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    #[inline]
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge coordinate.
    #[inline]
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge coordinate.
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Horizontal center.
    #[inline]
    #[must_use]
    pub const fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    /// Vertical center.
    #[inline]
    #[must_use]
    pub const fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    /// Height of the vertical overlap with `other`; zero when disjoint.
    #[inline]
    #[must_use]
    pub fn vertical_overlap(&self, other: &Self) -> f32 {
        (self.bottom().min(other.bottom()) - self.top.max(other.top)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn edges_and_centers() {
        let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(bbox.right(), 110.0);
        assert_eq!(bbox.bottom(), 70.0);
        assert_eq!(bbox.center_x(), 60.0);
        assert_eq!(bbox.center_y(), 45.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn vertical_overlap_of_stacked_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 50.0, 20.0);
        let b = BoundingBox::new(100.0, 15.0, 50.0, 20.0);
        let c = BoundingBox::new(0.0, 40.0, 50.0, 20.0);
        assert_eq!(a.vertical_overlap(&b), 5.0);
        assert_eq!(b.vertical_overlap(&a), 5.0);
        assert_eq!(a.vertical_overlap(&c), 0.0);
    }
}
