//! Text detection for censoring
//!
//! Wraps an external recognizer behind [`TextRecognizer`] and maps its
//! output into the core line/word model through [`DetectionAdapter`].

mod adapter;
mod engine;
mod error;
mod tesseract;
mod types;

pub use adapter::{to_detection_result, DetectionAdapter};
pub use engine::TextRecognizer;
pub use error::OcrError;
pub use tesseract::{parse_tsv, tesseract_version, TesseractConfig, TesseractRecognizer};
pub use types::{RawBox, RecognizedText, TextBlock, TextElement, TextLine};
