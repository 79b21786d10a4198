//! Shhhot: censor text in photos.
//!
//! Pick an image, detect its words, choose which ones to hide and how
//! (BLOCK, HIDE or BLUR), then export a redacted JPEG. The pieces live in
//! the workspace crates; this crate ties them into an [`EditorSession`].

mod config;
mod error;
mod export;
mod session;

pub use config::{
    default_config_path, load_config, save_config, AppConfig, ConfigError, ExportConfig,
    DEFAULT_FILE_PREFIX, DEFAULT_JPEG_QUALITY, EXPORT_DIR_ENV,
};
pub use error::{Error, Result};
pub use export::{ExportError, ExportLocation, ExportSink, PicturesSink};
pub use session::{EditorSession, ExportOutcome, SessionSnapshot, WordOverlay};

pub use shhhot_core::{
    CensorMode, CensorState, DetectionResult, Line, ModeSource, Point, Rect, ScreenRect,
    ViewTransform, Word, WordAddress,
};
pub use shhhot_ocr::{
    DetectionAdapter, OcrError, RawBox, RecognizedText, TesseractConfig, TesseractRecognizer,
    TextBlock, TextElement, TextLine, TextRecognizer,
};
pub use shhhot_render::{redact, BlockFill, RedactOptions};
