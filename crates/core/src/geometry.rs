//! Pixel-space geometry shared by detection, selection and redaction.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in bitmap pixel coordinates.
///
/// `right` and `bottom` are exclusive, so a 1x1 box at the origin is
/// `(0, 0, 1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Builds a rectangle, rejecting inverted edges.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Option<Self> {
        if left <= right && top <= bottom {
            Some(Self {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Widened so boxes spanning most of the `i32` range cannot overflow.
    pub fn width(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.bottom) - i64::from(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Whether any part of the rectangle lies within a `width x height` bitmap.
    pub fn intersects_bounds(&self, width: u32, height: u32) -> bool {
        let (w, h) = (dim_to_i32(width), dim_to_i32(height));
        self.left < w && self.top < h && self.right > 0 && self.bottom > 0
    }

    /// Grows every edge by `margin` and clamps the result to the bitmap.
    ///
    /// Returns `None` when nothing of the grown rectangle lies inside
    /// `width x height`.
    pub fn expand_clamped(&self, margin: i32, width: u32, height: u32) -> Option<Rect> {
        let left = self.left.saturating_sub(margin).max(0);
        let top = self.top.saturating_sub(margin).max(0);
        let right = self.right.saturating_add(margin).min(dim_to_i32(width));
        let bottom = self.bottom.saturating_add(margin).min(dim_to_i32(height));

        if left >= right || top >= bottom {
            return None;
        }
        Some(Rect {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Hit test with all four edges inclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left as f32
            && point.x <= self.right as f32
            && point.y >= self.top as f32
            && point.y <= self.bottom as f32
    }
}

/// A point in either bitmap or screen space, depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Clamps a sample coordinate into `[0, dim - 1]`.
///
/// A zero dimension yields 0; callers must not sample an empty bitmap.
pub fn clamp_coord(value: i64, dim: u32) -> u32 {
    if dim == 0 {
        return 0;
    }
    value.clamp(0, i64::from(dim) - 1) as u32
}

fn dim_to_i32(dim: u32) -> i32 {
    i32::try_from(dim).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_inverted_edges() {
        assert!(Rect::new(10, 10, 5, 20).is_none());
        assert!(Rect::new(10, 20, 30, 10).is_none());
        assert!(Rect::new(10, 10, 10, 10).is_some());
    }

    #[test]
    fn test_expand_clamped_inside_bounds() {
        let rect = Rect::new(10, 10, 30, 20).unwrap();
        assert_eq!(
            rect.expand_clamped(3, 100, 50),
            Rect::new(7, 7, 33, 23)
        );
    }

    #[test]
    fn test_expand_clamped_at_edges() {
        let rect = Rect::new(0, 1, 99, 50).unwrap();
        let expanded = rect.expand_clamped(3, 100, 50).unwrap();
        assert_eq!(expanded, Rect::new(0, 0, 100, 50).unwrap());
        assert!(expanded.left <= expanded.right && expanded.top <= expanded.bottom);
    }

    #[test]
    fn test_expand_clamped_outside_bounds() {
        let rect = Rect::new(200, 10, 220, 20).unwrap();
        assert_eq!(rect.expand_clamped(3, 100, 50), None);
        assert!(!rect.intersects_bounds(100, 50));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let rect = Rect::new(10, 10, 30, 20).unwrap();
        assert!(rect.contains(Point::new(10.0, 10.0)));
        assert!(rect.contains(Point::new(30.0, 20.0)));
        assert!(!rect.contains(Point::new(30.5, 15.0)));
    }

    #[test]
    fn test_span_of_huge_box() {
        let rect = Rect::new(-2_000_000_000, 10, 2_000_000_000, 20).unwrap();
        assert_eq!(rect.width(), 4_000_000_000);
        assert_eq!(rect.height(), 10);
        assert!(rect.intersects_bounds(100, 50));
    }

    #[test]
    fn test_clamp_coord() {
        assert_eq!(clamp_coord(-5, 50), 0);
        assert_eq!(clamp_coord(60, 50), 49);
        assert_eq!(clamp_coord(25, 50), 25);
    }
}
