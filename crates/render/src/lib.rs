//! Redaction engine
//!
//! Produces a censored copy of a bitmap from a [`DetectionResult`]. Only
//! words flagged as censored are touched; everything else is left
//! pixel-identical.

pub mod sampling;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use serde::{Deserialize, Serialize};
use shhhot_core::{CensorMode, DetectionResult, Rect};

/// Pixels added on every side of a word box before filling.
pub const DEFAULT_EXPAND_MARGIN: i32 = 3;

/// White at 180/255 (~70 %). Softens text but does not guarantee it is
/// unreadable.
pub const BLUR_OVERLAY: Rgba<u8> = Rgba([255, 255, 255, 180]);

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Colour policy for [`CensorMode::Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockFill {
    /// Most frequent colour among five points inside the word box.
    #[default]
    DominantTextColor,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RedactOptions {
    pub expand_margin: i32,
    pub block_fill: BlockFill,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            expand_margin: DEFAULT_EXPAND_MARGIN,
            block_fill: BlockFill::default(),
        }
    }
}

/// Returns a redacted copy of `original`.
///
/// Each censored word is filled according to its effective mode
/// (its own override, else `default_mode`). Colours are always sampled from
/// `original`, never from partially redacted output.
pub fn redact(
    original: &RgbaImage,
    result: &DetectionResult,
    default_mode: CensorMode,
    options: &RedactOptions,
) -> RgbaImage {
    let mut output = original.clone();
    let (width, height) = original.dimensions();
    let mut redacted = 0usize;

    for (addr, word) in result.censored_words() {
        let bbox = word.bounding_box();
        if !bbox.intersects_bounds(width, height) {
            log::debug!(
                "[Redact] word {}:{} lies outside the {}x{} bitmap, skipped",
                addr.line,
                addr.word,
                width,
                height
            );
            continue;
        }
        let Some(area) = bbox.expand_clamped(options.expand_margin, width, height) else {
            continue;
        };

        let mode = word.mode().resolve(default_mode);
        // sampling only fails on an empty bitmap, which the bounds check excludes
        match mode {
            CensorMode::Block => {
                let color = match options.block_fill {
                    BlockFill::Black => Some(BLACK),
                    BlockFill::DominantTextColor => sampling::dominant_text_color(original, &bbox),
                };
                let Some(color) = color else { continue };
                fill(&mut output, &area, color);
            }
            CensorMode::Hide => {
                let Some(color) = sampling::background_color(original, &bbox) else {
                    continue;
                };
                fill(&mut output, &area, color);
            }
            CensorMode::Blur => overlay(&mut output, &area, BLUR_OVERLAY),
        }
        redacted += 1;
    }

    log::info!("[Redact] {} words redacted", redacted);
    output
}

/// `area` must already be clamped to the image and non-empty.
fn fill(img: &mut RgbaImage, area: &Rect, color: Rgba<u8>) {
    let rect = imageproc::rect::Rect::at(area.left, area.top)
        .of_size(area.width() as u32, area.height() as u32);
    draw_filled_rect_mut(img, rect, color);
}

/// Mixes `color` into the RGB channels by its alpha. The destination alpha
/// is kept, so an opaque bitmap stays opaque.
fn overlay(img: &mut RgbaImage, area: &Rect, color: Rgba<u8>) {
    let alpha = u32::from(color[3]);
    for y in area.top as u32..area.bottom as u32 {
        for x in area.left as u32..area.right as u32 {
            let px = img.get_pixel_mut(x, y);
            for c in 0..3 {
                let mixed = u32::from(color[c]) * alpha + u32::from(px[c]) * (255 - alpha);
                px[c] = ((mixed + 127) / 255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shhhot_core::{CensorState, Line, Word, WordAddress};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);
    const INK: Rgba<u8> = Rgba([20, 30, 200, 255]);

    fn rect(l: i32, t: i32, r: i32, b: i32) -> Rect {
        Rect::new(l, t, r, b).unwrap()
    }

    /// One line per box; `censor` lists the words to toggle on.
    fn state(boxes: &[Rect], censor: &[usize], capture: bool) -> CensorState {
        let lines = boxes
            .iter()
            .enumerate()
            .map(|(i, b)| Line::new(*b, vec![Word::new(format!("w{}", i), *b)]))
            .collect();
        let mut state = CensorState::new(CensorMode::Block, capture);
        state.replace_result(DetectionResult::new(lines));
        for &i in censor {
            state.toggle_word(i, 0);
        }
        state
    }

    fn assert_region(img: &RgbaImage, area: Rect, expected: Rgba<u8>) {
        for y in area.top..area.bottom {
            for x in area.left..area.right {
                assert_eq!(*img.get_pixel(x as u32, y as u32), expected, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_block_fills_expanded_box() {
        let original = RgbaImage::from_pixel(100, 50, WHITE);
        let state = state(&[rect(10, 10, 30, 20)], &[0], false);
        let options = RedactOptions {
            block_fill: BlockFill::Black,
            ..Default::default()
        };

        let out = redact(&original, state.result(), CensorMode::Block, &options);

        assert_region(&out, rect(7, 7, 33, 23), BLACK);
        assert_eq!(*out.get_pixel(6, 7), WHITE);
        assert_eq!(*out.get_pixel(33, 22), WHITE);
        assert_eq!(*out.get_pixel(20, 23), WHITE);
        assert_eq!(*original.get_pixel(20, 15), WHITE);
    }

    #[test]
    fn test_block_uses_dominant_text_color() {
        let mut original = RgbaImage::from_pixel(100, 50, WHITE);
        // a horizontal stroke through the vertical centre hits three of five samples
        for x in 10..30 {
            original.put_pixel(x, 15, INK);
        }
        let state = state(&[rect(10, 10, 30, 20)], &[0], false);

        let out = redact(&original, state.result(), CensorMode::Block, &RedactOptions::default());
        assert_region(&out, rect(7, 7, 33, 23), INK);
    }

    #[test]
    fn test_hide_paints_background() {
        let mut original = RgbaImage::from_pixel(100, 50, GRAY);
        for y in 10..20 {
            for x in 10..30 {
                original.put_pixel(x, y, INK);
            }
        }
        let state = state(&[rect(10, 10, 30, 20)], &[0], false);

        let out = redact(&original, state.result(), CensorMode::Hide, &RedactOptions::default());
        assert_region(&out, rect(7, 7, 33, 23), GRAY);
    }

    #[test]
    fn test_blur_is_translucent_white() {
        let original = RgbaImage::from_pixel(40, 40, BLACK);
        let state = state(&[rect(10, 10, 20, 20)], &[0], false);

        let out = redact(&original, state.result(), CensorMode::Blur, &RedactOptions::default());
        let px = out.get_pixel(15, 15);
        assert_eq!(*px, Rgba([180, 180, 180, 255]));
        assert_eq!(*out.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn test_uncensored_words_untouched() {
        let mut original = RgbaImage::from_pixel(100, 60, WHITE);
        for (i, px) in original.pixels_mut().enumerate() {
            *px = Rgba([(i % 251) as u8, (i % 13) as u8, (i % 7) as u8, 255]);
        }
        let kept = rect(60, 30, 90, 45);
        let state = state(&[rect(10, 10, 30, 20), kept], &[0], false);

        for mode in [CensorMode::Block, CensorMode::Hide, CensorMode::Blur] {
            let out = redact(&original, state.result(), mode, &RedactOptions::default());
            let expanded = kept.expand_clamped(DEFAULT_EXPAND_MARGIN, 100, 60).unwrap();
            for y in expanded.top..expanded.bottom {
                for x in expanded.left..expanded.right {
                    assert_eq!(out.get_pixel(x as u32, y as u32), original.get_pixel(x as u32, y as u32));
                }
            }
        }
    }

    #[test]
    fn test_nothing_censored_is_identity() {
        let original = RgbaImage::from_pixel(30, 30, INK);
        let state = state(&[rect(1, 1, 10, 10)], &[], false);
        let out = redact(&original, state.result(), CensorMode::Block, &RedactOptions::default());
        assert_eq!(out, original);
    }

    #[test]
    fn test_box_outside_bitmap_skipped() {
        let original = RgbaImage::from_pixel(100, 50, WHITE);
        let state = state(&[rect(150, 60, 170, 70)], &[0], false);
        let out = redact(&original, state.result(), CensorMode::Block, &RedactOptions::default());
        assert_eq!(out, original);
    }

    #[test]
    fn test_huge_box_is_clamped_not_overflowed() {
        let original = RgbaImage::from_pixel(100, 50, GRAY);
        let huge = rect(-2_000_000_000, 10, 2_000_000_000, 20);
        let state = state(&[huge], &[0], false);

        for mode in [CensorMode::Block, CensorMode::Hide, CensorMode::Blur] {
            let out = redact(&original, state.result(), mode, &RedactOptions::default());
            assert_eq!(*out.get_pixel(0, 40), GRAY);
            assert_eq!(out.get_pixel(50, 15)[3], 255);
        }
        let out = redact(&original, state.result(), CensorMode::Blur, &RedactOptions::default());
        assert!(out.get_pixel(99, 15)[0] > GRAY[0]);
    }

    #[test]
    fn test_box_touching_edges_is_clamped() {
        let original = RgbaImage::from_pixel(40, 20, WHITE);
        let state = state(&[rect(0, 0, 40, 20)], &[0], false);
        let options = RedactOptions {
            block_fill: BlockFill::Black,
            ..Default::default()
        };
        let out = redact(&original, state.result(), CensorMode::Block, &options);
        assert_region(&out, rect(0, 0, 40, 20), BLACK);
    }

    #[test]
    fn test_per_word_override_wins() {
        let original = RgbaImage::from_pixel(100, 50, GRAY);
        let mut state = state(&[rect(10, 10, 30, 20), rect(50, 10, 70, 20)], &[0, 1], true);
        state.set_word_mode(WordAddress::new(1, 0), Some(CensorMode::Blur));
        let options = RedactOptions {
            block_fill: BlockFill::Black,
            ..Default::default()
        };

        // global mode is HIDE now, but word 0 captured BLOCK when toggled
        state.set_censor_mode(CensorMode::Hide);
        let out = redact(&original, state.result(), state.censor_mode(), &options);

        assert_eq!(*out.get_pixel(20, 15), BLACK);
        let blurred = out.get_pixel(60, 15);
        assert!(blurred[0] > GRAY[0]);
    }
}
