//! Colour sampling around and inside word boxes.
//!
//! Every sample coordinate is clamped into the bitmap before lookup, so
//! boxes touching or crossing an edge never read out of bounds.

use image::{Rgba, RgbaImage};
use shhhot_core::{clamp_coord, Rect};

/// Distance of background samples from the word box edge.
pub const BACKGROUND_SAMPLE_OFFSET: i64 = 5;

/// Interior sample positions as (x, y) fractions of the box:
/// centre, left-centre, right-centre, top-centre, bottom-centre.
const TEXT_SAMPLE_FRACTIONS: [(f32, f32); 5] = [
    (0.5, 0.5),
    (0.25, 0.5),
    (0.75, 0.5),
    (0.5, 0.25),
    (0.5, 0.75),
];

/// Interior sample points of `rect`, clamped to the bitmap.
pub fn text_sample_points(rect: &Rect, width: u32, height: u32) -> [(u32, u32); 5] {
    TEXT_SAMPLE_FRACTIONS.map(|(fx, fy)| {
        let x = i64::from(rect.left) + (rect.width() as f32 * fx) as i64;
        let y = i64::from(rect.top) + (rect.height() as f32 * fy) as i64;
        (clamp_coord(x, width), clamp_coord(y, height))
    })
}

/// Points just outside each edge of `rect`, clamped to the bitmap.
///
/// Order is above, left, right, below.
pub fn background_sample_points(rect: &Rect, width: u32, height: u32) -> [(u32, u32); 4] {
    let (left, top) = (i64::from(rect.left), i64::from(rect.top));
    // last row/column that belongs to the box
    let (last_x, last_y) = (i64::from(rect.right) - 1, i64::from(rect.bottom) - 1);
    let cx = left + rect.width() / 2;
    let cy = top + rect.height() / 2;

    [
        (cx, top - BACKGROUND_SAMPLE_OFFSET),
        (left - BACKGROUND_SAMPLE_OFFSET, cy),
        (last_x + BACKGROUND_SAMPLE_OFFSET, cy),
        (cx, last_y + BACKGROUND_SAMPLE_OFFSET),
    ]
    .map(|(x, y)| (clamp_coord(x, width), clamp_coord(y, height)))
}

/// Most frequent colour among the samples.
///
/// Ties go to the colour sampled first.
pub fn most_frequent(samples: &[Rgba<u8>]) -> Option<Rgba<u8>> {
    let mut counts: Vec<(Rgba<u8>, usize)> = Vec::with_capacity(samples.len());
    for sample in samples {
        match counts.iter_mut().find(|(color, _)| color == sample) {
            Some((_, count)) => *count += 1,
            None => counts.push((*sample, 1)),
        }
    }

    let mut best: Option<(Rgba<u8>, usize)> = None;
    for (color, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((color, count));
        }
    }
    best.map(|(color, _)| color)
}

/// Likely ink colour of the glyphs inside `rect`.
pub fn dominant_text_color(img: &RgbaImage, rect: &Rect) -> Option<Rgba<u8>> {
    sample(img, &text_sample_points(rect, img.width(), img.height()))
}

/// Likely background colour around `rect`.
pub fn background_color(img: &RgbaImage, rect: &Rect) -> Option<Rgba<u8>> {
    sample(img, &background_sample_points(rect, img.width(), img.height()))
}

fn sample(img: &RgbaImage, points: &[(u32, u32)]) -> Option<Rgba<u8>> {
    if img.width() == 0 || img.height() == 0 {
        return None;
    }
    let colors: Vec<Rgba<u8>> = points.iter().map(|&(x, y)| *img.get_pixel(x, y)).collect();
    most_frequent(&colors)
}
