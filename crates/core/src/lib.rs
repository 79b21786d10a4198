//! Core model for censoring tasks.
//!
//! Detected lines and words, their censoring state, and the mapping between
//! screen taps and bitmap pixels.

pub mod geometry;
pub mod model;
pub mod selection;
pub mod transform;

pub use geometry::{clamp_coord, Point, Rect};
pub use model::{CensorMode, DetectionResult, Line, ModeSource, Word, WordAddress};
pub use selection::CensorState;
pub use transform::{ScreenRect, ViewTransform};
