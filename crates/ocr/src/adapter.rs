//! Detection adapter
//!
//! Runs a [`TextRecognizer`] over a bitmap and maps its output into a
//! [`DetectionResult`]. Recognizer failures never reach the caller: they are
//! logged and collapse to an empty result.

use image::RgbaImage;
use shhhot_core::{DetectionResult, Line, Word};
use std::time::Instant;

use crate::engine::TextRecognizer;
use crate::types::RecognizedText;

pub struct DetectionAdapter<R> {
    recognizer: R,
}

impl<R: TextRecognizer> DetectionAdapter<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// One detection pass. Blocks for as long as the recognizer does.
    pub fn detect(&mut self, bitmap: &RgbaImage) -> DetectionResult {
        let start = Instant::now();
        log::info!(
            "[OCR] {} detecting on {}x{} bitmap",
            self.recognizer.name(),
            bitmap.width(),
            bitmap.height()
        );

        match self.recognizer.recognize(bitmap) {
            Ok(raw) => {
                let result = to_detection_result(&raw);
                log::info!(
                    "[OCR] detection done in {} ms: {} lines, {} words",
                    start.elapsed().as_millis(),
                    result.lines().len(),
                    result.word_count()
                );
                result
            }
            Err(e) => {
                log::warn!("[OCR] detection failed, continuing with no text: {}", e);
                DetectionResult::empty()
            }
        }
    }
}

/// Flattens blocks into lines, keeping order, and drops any line or word
/// whose box is missing or inverted.
///
/// A line whose words were all dropped is kept with no words so line
/// indices still follow the recognizer's order.
pub fn to_detection_result(raw: &RecognizedText) -> DetectionResult {
    let mut lines = Vec::new();

    for block in &raw.blocks {
        for line in &block.lines {
            let Some(line_box) = line.bbox.and_then(|b| b.to_rect()) else {
                log::debug!("[OCR] dropping line without a usable box");
                continue;
            };

            let words = line
                .elements
                .iter()
                .filter_map(|element| {
                    let rect = element.bbox.and_then(|b| b.to_rect())?;
                    Some(Word::new(element.text.clone(), rect))
                })
                .collect();

            lines.push(Line::new(line_box, words));
        }
    }

    DetectionResult::new(lines)
}
