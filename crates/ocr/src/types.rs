//! Raw recognizer output
//!
//! Mirrors what on-device engines hand back: blocks of lines of elements,
//! where any box may be missing or malformed. Nothing here is trusted until
//! it has been mapped into the core model.

use serde::{Deserialize, Serialize};
use shhhot_core::Rect;

/// Unvalidated box in bitmap pixels, `right`/`bottom` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl RawBox {
    pub fn from_ltwh(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(width),
            bottom: top.saturating_add(height),
        }
    }

    /// `None` for inverted geometry.
    pub fn to_rect(&self) -> Option<Rect> {
        Rect::new(self.left, self.top, self.right, self.bottom)
    }
}

/// A single recognized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub text: String,
    pub bbox: Option<RawBox>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub bbox: Option<RawBox>,
    pub elements: Vec<TextElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

/// Everything one recognizer call found in a bitmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    pub blocks: Vec<TextBlock>,
}

impl RecognizedText {
    /// Plain text, one line per detected line.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .map(|l| {
                l.elements
                    .iter()
                    .map(|e| e.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
