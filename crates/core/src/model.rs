//! Detection result model
//!
//! Lines and words as produced by one detection pass, plus the per-word
//! censoring state. Geometry is always in the coordinate space of the
//! original, unscaled bitmap.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Visual treatment applied to a censored word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CensorMode {
    /// Opaque fill
    #[default]
    Block,
    /// Fill with the surrounding background colour
    Hide,
    /// Translucent white overlay
    Blur,
}

impl std::fmt::Display for CensorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CensorMode::Block => write!(f, "BLOCK"),
            CensorMode::Hide => write!(f, "HIDE"),
            CensorMode::Blur => write!(f, "BLUR"),
        }
    }
}

/// Where a word's censor mode comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "source", content = "mode", rename_all = "camelCase")]
pub enum ModeSource {
    /// Follows the session's global mode.
    #[default]
    Default,
    /// Pinned to a specific mode.
    Override(CensorMode),
}

impl ModeSource {
    pub fn resolve(self, default: CensorMode) -> CensorMode {
        match self {
            ModeSource::Override(mode) => mode,
            ModeSource::Default => default,
        }
    }
}

/// Stable address of a word: line index, then word index within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordAddress {
    pub line: usize,
    pub word: usize,
}

impl WordAddress {
    pub const fn new(line: usize, word: usize) -> Self {
        Self { line, word }
    }
}

/// A detected word and its censoring state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    text: String,
    bounding_box: Rect,
    is_censored: bool,
    mode: ModeSource,
}

impl Word {
    pub fn new(text: impl Into<String>, bounding_box: Rect) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            is_censored: false,
            mode: ModeSource::Default,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }

    pub fn is_censored(&self) -> bool {
        self.is_censored
    }

    pub fn mode(&self) -> ModeSource {
        self.mode
    }

    pub(crate) fn set_censored(&mut self, censored: bool) {
        self.is_censored = censored;
    }

    pub(crate) fn set_mode(&mut self, mode: ModeSource) {
        self.mode = mode;
    }
}

/// A detected line of text. Words keep detection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    words: Vec<Word>,
    bounding_box: Rect,
}

impl Line {
    pub fn new(bounding_box: Rect, words: Vec<Word>) -> Self {
        Self {
            words,
            bounding_box,
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn bounding_box(&self) -> Rect {
        self.bounding_box
    }
}

/// Output of one detection pass.
///
/// The number of lines and words is fixed once built; only the censoring
/// state of individual words changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    lines: Vec<Line>,
}

impl DetectionResult {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.words.len()).sum()
    }

    pub fn word(&self, addr: WordAddress) -> Option<&Word> {
        self.lines.get(addr.line)?.words.get(addr.word)
    }

    pub(crate) fn word_mut(&mut self, addr: WordAddress) -> Option<&mut Word> {
        self.lines.get_mut(addr.line)?.words.get_mut(addr.word)
    }

    /// All words with their addresses, in detection order.
    pub fn words(&self) -> impl Iterator<Item = (WordAddress, &Word)> {
        self.lines.iter().enumerate().flat_map(|(line_idx, line)| {
            line.words
                .iter()
                .enumerate()
                .map(move |(word_idx, word)| (WordAddress::new(line_idx, word_idx), word))
        })
    }

    pub(crate) fn words_mut(&mut self) -> impl Iterator<Item = &mut Word> {
        self.lines.iter_mut().flat_map(|line| line.words.iter_mut())
    }

    pub fn censored_words(&self) -> impl Iterator<Item = (WordAddress, &Word)> {
        self.words().filter(|(_, word)| word.is_censored)
    }

    /// First word (in detection order) whose box contains `point`.
    pub fn word_at(&self, point: Point) -> Option<WordAddress> {
        self.words()
            .find(|(_, word)| word.bounding_box.contains(point))
            .map(|(addr, _)| addr)
    }
}
