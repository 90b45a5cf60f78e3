//! Feature bar geometry.
//!
//! The host renderer lays out feature bars and hands the engine their pixel
//! rectangles; the arrow router consumes them to place dependency arrows.
//! The engine never produces positions.

use serde::{Deserialize, Serialize};

/// Pixel rectangle of a rendered feature bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeaturePosition {
    /// Left edge (px).
    pub left: f64,
    /// Top edge (px).
    pub top: f64,
    /// Bar width (px).
    pub width: f64,
    /// Bar height (px).
    pub height: f64,
}

impl FeaturePosition {
    /// Creates a bar rectangle.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (px).
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (px).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Vertical center of the bar, where arrows attach.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let p = FeaturePosition::new(100.0, 40.0, 80.0, 24.0);
        assert_eq!(p.right(), 180.0);
        assert_eq!(p.bottom(), 64.0);
        assert_eq!(p.center_y(), 52.0);
    }
}
