//! Screen <-> bitmap coordinate mapping for a bitmap drawn with uniform
//! "fit" scaling, centred on its render surface.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ViewTransform {
    /// Fits a `bitmap_w x bitmap_h` bitmap into a `surface_w x surface_h`
    /// surface, preserving aspect ratio.
    ///
    /// Returns `None` if either side of either size is zero.
    pub fn fit(surface_w: f32, surface_h: f32, bitmap_w: u32, bitmap_h: u32) -> Option<Self> {
        if bitmap_w == 0 || bitmap_h == 0 || surface_w <= 0.0 || surface_h <= 0.0 {
            return None;
        }
        let (bw, bh) = (bitmap_w as f32, bitmap_h as f32);
        let scale = (surface_w / bw).min(surface_h / bh);

        Some(Self {
            scale,
            offset_x: (surface_w - bw * scale) / 2.0,
            offset_y: (surface_h - bh * scale) / 2.0,
        })
    }

    pub fn to_bitmap(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        )
    }

    pub fn to_screen(&self, bitmap: Point) -> Point {
        Point::new(
            bitmap.x * self.scale + self.offset_x,
            bitmap.y * self.scale + self.offset_y,
        )
    }

    /// Positions a detection box on screen for overlay drawing.
    pub fn rect_to_screen(&self, rect: &Rect) -> ScreenRect {
        let top_left = self.to_screen(Point::new(rect.left as f32, rect.top as f32));
        let bottom_right = self.to_screen(Point::new(rect.right as f32, rect.bottom as f32));
        ScreenRect {
            left: top_left.x,
            top: top_left.y,
            right: bottom_right.x,
            bottom: bottom_right.y,
        }
    }
}
