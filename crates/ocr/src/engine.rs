//! Recognizer trait

use image::RgbaImage;

use crate::error::OcrError;
use crate::types::RecognizedText;

/// External text recognition capability.
///
/// Given a bitmap, produce lines of words with their boxes in the bitmap's
/// own pixel space. Implementations may block; callers run them off the
/// interaction thread.
pub trait TextRecognizer: Send {
    fn recognize(&mut self, bitmap: &RgbaImage) -> Result<RecognizedText, OcrError>;

    /// Short engine name for logs.
    fn name(&self) -> &str;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&mut self, bitmap: &RgbaImage) -> Result<RecognizedText, OcrError> {
        (**self).recognize(bitmap)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
