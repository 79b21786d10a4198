//! Selection state manager
//!
//! Owns the live [`DetectionResult`] of a session together with the global
//! censor mode. Every observable change bumps [`CensorState::version`];
//! operations that change nothing leave it untouched so observers never see
//! a spurious update.

use crate::geometry::Point;
use crate::model::{CensorMode, DetectionResult, ModeSource, WordAddress};

#[derive(Debug, Clone, Default)]
pub struct CensorState {
    result: DetectionResult,
    mode: CensorMode,
    capture_mode_on_toggle: bool,
    version: u64,
}

impl CensorState {
    /// `capture_mode_on_toggle` pins the global mode onto a word when it is
    /// toggled on; otherwise every word follows the global mode.
    pub fn new(mode: CensorMode, capture_mode_on_toggle: bool) -> Self {
        Self {
            result: DetectionResult::empty(),
            mode,
            capture_mode_on_toggle,
            version: 0,
        }
    }

    pub fn result(&self) -> &DetectionResult {
        &self.result
    }

    pub fn censor_mode(&self) -> CensorMode {
        self.mode
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn captures_mode_on_toggle(&self) -> bool {
        self.capture_mode_on_toggle
    }

    /// Replaces the detection result wholesale (new image, new pass).
    pub fn replace_result(&mut self, result: DetectionResult) {
        self.result = result;
        self.bump();
    }

    /// Flips the censored flag of exactly one word.
    ///
    /// Returns `false` and changes nothing when the address is out of
    /// bounds, which happens when the result was replaced under the caller.
    pub fn toggle_word(&mut self, line: usize, word: usize) -> bool {
        let addr = WordAddress::new(line, word);
        let mode = self.mode;
        let capture = self.capture_mode_on_toggle;

        let Some(target) = self.result.word_mut(addr) else {
            log::debug!("[Censor] toggle ignored, no word at {}:{}", line, word);
            return false;
        };

        let censored = !target.is_censored();
        target.set_censored(censored);
        if capture {
            target.set_mode(if censored {
                ModeSource::Override(mode)
            } else {
                ModeSource::Default
            });
        }
        log::debug!(
            "[Censor] word {}:{} \"{}\" censored={}",
            line,
            word,
            target.text(),
            censored
        );

        self.bump();
        true
    }

    /// Updates the global default mode. Returns `false` if it was already set.
    pub fn set_censor_mode(&mut self, mode: CensorMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.bump();
        true
    }

    /// Pins (`Some`) or releases (`None`) the mode of a single word.
    pub fn set_word_mode(&mut self, addr: WordAddress, mode: Option<CensorMode>) -> bool {
        let source = mode.map_or(ModeSource::Default, ModeSource::Override);
        match self.result.word_mut(addr) {
            Some(word) if word.mode() != source => {
                word.set_mode(source);
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// Mode the redaction engine will use for the word at `addr`.
    pub fn effective_mode(&self, addr: WordAddress) -> Option<CensorMode> {
        self.result.word(addr).map(|w| w.mode().resolve(self.mode))
    }

    /// `point` must already be in bitmap space.
    pub fn hit_test(&self, point: Point) -> Option<WordAddress> {
        self.result.word_at(point)
    }

    /// Toggles whichever word sits under `point`, if any.
    pub fn toggle_at(&mut self, point: Point) -> Option<WordAddress> {
        let addr = self.hit_test(point)?;
        self.toggle_word(addr.line, addr.word).then_some(addr)
    }

    pub fn censored_count(&self) -> usize {
        self.result.censored_words().count()
    }

    /// Un-censors every word. One version bump at most.
    pub fn clear_selection(&mut self) -> bool {
        let capture = self.capture_mode_on_toggle;
        let mut changed = false;
        for word in self.result.words_mut().filter(|w| w.is_censored()) {
            word.set_censored(false);
            if capture {
                word.set_mode(ModeSource::Default);
            }
            changed = true;
        }
        if changed {
            self.bump();
        }
        changed
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
