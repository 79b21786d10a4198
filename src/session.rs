//! Editor session
//!
//! The state holder a UI talks to: one selected image, its bitmap, the live
//! [`CensorState`] and the processing/export flags. Interaction calls are
//! synchronous; detection and export run on blocking workers and are awaited.
//!
//! Every observable change bumps the session version and publishes it on a
//! [`watch`] channel. Work started before a `select_image`/`reset` carries an
//! older generation and its result is dropped when it completes.

use image::RgbaImage;
use serde::Serialize;
use shhhot_core::{
    CensorMode, CensorState, DetectionResult, Point, ScreenRect, ViewTransform, WordAddress,
};
use shhhot_ocr::{DetectionAdapter, TesseractRecognizer, TextRecognizer};
use shhhot_render::RedactOptions;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::export::{ExportLocation, ExportSink, PicturesSink};

type SharedDetector = Arc<Mutex<DetectionAdapter<Box<dyn TextRecognizer>>>>;

/// How an export request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(ExportLocation),
    /// Cause is logged, not reported.
    Failed,
    /// The session moved on while the export was running.
    Discarded,
    /// No bitmap yet, or detection still running.
    NotReady,
}

impl ExportOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, ExportOutcome::Saved(_))
    }
}

/// One detection box as it should be drawn on the render surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordOverlay {
    pub address: WordAddress,
    pub rect: ScreenRect,
    pub is_censored: bool,
    pub mode: CensorMode,
}

/// Copy of the observable session state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub selected_image: Option<String>,
    pub bitmap_size: Option<(u32, u32)>,
    pub result: DetectionResult,
    pub censor_mode: CensorMode,
    pub censored_count: usize,
    pub is_processing: bool,
    pub export_successful: bool,
    pub version: u64,
}

struct SessionState {
    selected_image: Option<String>,
    bitmap: Option<Arc<RgbaImage>>,
    censor: CensorState,
    is_processing: bool,
    export_successful: bool,
    generation: u64,
    version: u64,
}

pub struct EditorSession {
    state: Mutex<SessionState>,
    detector: SharedDetector,
    sink: Arc<dyn ExportSink>,
    redact_options: RedactOptions,
    notifier: watch::Sender<u64>,
}

impl EditorSession {
    pub fn new(
        recognizer: impl TextRecognizer + 'static,
        sink: Arc<dyn ExportSink>,
        config: &AppConfig,
    ) -> Self {
        let recognizer: Box<dyn TextRecognizer> = Box::new(recognizer);
        let (notifier, _) = watch::channel(0);

        Self {
            state: Mutex::new(SessionState {
                selected_image: None,
                bitmap: None,
                censor: CensorState::new(config.censor_mode, config.capture_mode_on_toggle),
                is_processing: false,
                export_successful: false,
                generation: 0,
                version: 0,
            }),
            detector: Arc::new(Mutex::new(DetectionAdapter::new(recognizer))),
            sink,
            redact_options: config.redact_options(),
            notifier,
        }
    }

    /// Tesseract for detection, the pictures directory for export.
    pub fn with_tesseract(config: &AppConfig) -> crate::Result<Self> {
        let recognizer = TesseractRecognizer::new(config.tesseract.clone())?;
        let sink = PicturesSink::from_config(&config.export)?;
        log::info!("[Session] exporting to {}", sink.directory().display());
        Ok(Self::new(recognizer, Arc::new(sink), config))
    }

    // ============ Image lifecycle ============

    /// Starts over with a new image. Pending detection or export results
    /// for the previous image will be dropped.
    pub fn select_image(&self, locator: impl Into<String>) {
        let locator = locator.into();
        let mut state = self.lock();
        log::info!("[Session] selected image {}", locator);

        state.generation += 1;
        state.selected_image = Some(locator);
        state.bitmap = None;
        state.censor.replace_result(DetectionResult::empty());
        state.is_processing = false;
        state.export_successful = false;
        self.publish(&mut state);
    }

    /// Runs one detection pass over `bitmap` and installs the result.
    ///
    /// Returns `false` if the result was discarded because the session moved
    /// on (new image, reset, or a newer pass) while detection was running.
    pub async fn process_image(&self, bitmap: RgbaImage) -> bool {
        let bitmap = Arc::new(bitmap);
        let generation = {
            let mut state = self.lock();
            state.generation += 1;
            state.bitmap = Some(Arc::clone(&bitmap));
            state.censor.replace_result(DetectionResult::empty());
            state.is_processing = true;
            state.export_successful = false;
            self.publish(&mut state);
            state.generation
        };

        let detector = Arc::clone(&self.detector);
        let result = match tokio::task::spawn_blocking(move || {
            let mut adapter = detector.lock().unwrap_or_else(PoisonError::into_inner);
            adapter.detect(&bitmap)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => {
                log::warn!("[Session] detection task failed: {}", e);
                DetectionResult::empty()
            }
        };

        let mut state = self.lock();
        if state.generation != generation {
            log::warn!(
                "[Session] discarding stale detection result ({} words)",
                result.word_count()
            );
            return false;
        }
        state.censor.replace_result(result);
        state.is_processing = false;
        self.publish(&mut state);
        true
    }

    /// Clears image, detections and flags.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.selected_image = None;
        state.bitmap = None;
        state.censor.replace_result(DetectionResult::empty());
        state.is_processing = false;
        state.export_successful = false;
        self.publish(&mut state);
        log::info!("[Session] reset");
    }

    // ============ Selection ============

    pub fn toggle_word(&self, line: usize, word: usize) -> bool {
        let mut state = self.lock();
        let changed = state.censor.toggle_word(line, word);
        if changed {
            self.publish(&mut state);
        }
        changed
    }

    /// Toggles the word under a tap on a `surface_w x surface_h` render
    /// surface showing the bitmap with fit scaling.
    pub fn toggle_at_screen(
        &self,
        point: Point,
        surface_w: f32,
        surface_h: f32,
    ) -> Option<WordAddress> {
        let mut state = self.lock();
        let transform = Self::transform(&state, surface_w, surface_h)?;
        let addr = state.censor.toggle_at(transform.to_bitmap(point))?;
        self.publish(&mut state);
        Some(addr)
    }

    /// `point` is in bitmap space.
    pub fn hit_test(&self, point: Point) -> Option<WordAddress> {
        self.lock().censor.hit_test(point)
    }

    pub fn set_censor_mode(&self, mode: CensorMode) -> bool {
        let mut state = self.lock();
        let changed = state.censor.set_censor_mode(mode);
        if changed {
            log::debug!("[Session] censor mode {}", mode);
            self.publish(&mut state);
        }
        changed
    }

    pub fn set_word_mode(&self, addr: WordAddress, mode: Option<CensorMode>) -> bool {
        let mut state = self.lock();
        let changed = state.censor.set_word_mode(addr, mode);
        if changed {
            self.publish(&mut state);
        }
        changed
    }

    pub fn clear_selection(&self) -> bool {
        let mut state = self.lock();
        let changed = state.censor.clear_selection();
        if changed {
            self.publish(&mut state);
        }
        changed
    }

    // ============ Rendering ============

    /// Screen-space boxes for every detected word. Empty until a bitmap is
    /// loaded or when the surface has no area.
    pub fn overlays(&self, surface_w: f32, surface_h: f32) -> Vec<WordOverlay> {
        let state = self.lock();
        let Some(transform) = Self::transform(&state, surface_w, surface_h) else {
            return Vec::new();
        };
        let default_mode = state.censor.censor_mode();

        state
            .censor
            .result()
            .words()
            .map(|(address, word)| WordOverlay {
                address,
                rect: transform.rect_to_screen(&word.bounding_box()),
                is_censored: word.is_censored(),
                mode: word.mode().resolve(default_mode),
            })
            .collect()
    }

    /// The bitmap as it would be exported right now.
    pub fn preview(&self) -> Option<RgbaImage> {
        let (bitmap, result, mode) = {
            let state = self.lock();
            let bitmap = state.bitmap.clone()?;
            (bitmap, state.censor.result().clone(), state.censor.censor_mode())
        };
        Some(shhhot_render::redact(
            &bitmap,
            &result,
            mode,
            &self.redact_options,
        ))
    }

    // ============ Export ============

    /// Redacts a snapshot of the current state and hands it to the sink.
    ///
    /// Toggles made while the export runs do not affect the written image.
    pub async fn export(&self) -> ExportOutcome {
        let (bitmap, result, mode, generation) = {
            let state = self.lock();
            if state.is_processing {
                log::debug!("[Session] export requested while detecting");
                return ExportOutcome::NotReady;
            }
            let Some(bitmap) = state.bitmap.clone() else {
                return ExportOutcome::NotReady;
            };
            (
                bitmap,
                state.censor.result().clone(),
                state.censor.censor_mode(),
                state.generation,
            )
        };

        let sink = Arc::clone(&self.sink);
        let options = self.redact_options;
        let written = tokio::task::spawn_blocking(move || {
            let redacted = shhhot_render::redact(&bitmap, &result, mode, &options);
            sink.export(&redacted)
        })
        .await;

        let mut state = self.lock();
        if state.generation != generation {
            log::warn!("[Session] session changed during export, outcome discarded");
            return ExportOutcome::Discarded;
        }

        match written {
            Ok(Ok(location)) => {
                if !state.export_successful {
                    state.export_successful = true;
                    self.publish(&mut state);
                }
                ExportOutcome::Saved(location)
            }
            Ok(Err(e)) => {
                log::warn!("[Session] export failed: {}", e);
                ExportOutcome::Failed
            }
            Err(e) => {
                log::warn!("[Session] export task failed: {}", e);
                ExportOutcome::Failed
            }
        }
    }

    /// Acknowledges a finished export so the UI can leave its success state.
    pub fn reset_export_state(&self) {
        let mut state = self.lock();
        if state.export_successful {
            state.export_successful = false;
            self.publish(&mut state);
        }
    }

    // ============ Observation ============

    /// Receives the session version after every observable change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notifier.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            selected_image: state.selected_image.clone(),
            bitmap_size: state.bitmap.as_ref().map(|b| b.dimensions()),
            result: state.censor.result().clone(),
            censor_mode: state.censor.censor_mode(),
            censored_count: state.censor.censored_count(),
            is_processing: state.is_processing,
            export_successful: state.export_successful,
            version: state.version,
        }
    }

    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn is_processing(&self) -> bool {
        self.lock().is_processing
    }

    pub fn export_successful(&self) -> bool {
        self.lock().export_successful
    }

    pub fn censor_mode(&self) -> CensorMode {
        self.lock().censor.censor_mode()
    }

    pub fn result(&self) -> DetectionResult {
        self.lock().censor.result().clone()
    }

    pub fn effective_mode(&self, addr: WordAddress) -> Option<CensorMode> {
        self.lock().censor.effective_mode(addr)
    }

    fn transform(state: &SessionState, surface_w: f32, surface_h: f32) -> Option<ViewTransform> {
        let bitmap = state.bitmap.as_ref()?;
        ViewTransform::fit(surface_w, surface_h, bitmap.width(), bitmap.height())
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &mut SessionState) {
        state.version = state.version.wrapping_add(1);
        self.notifier.send_replace(state.version);
    }
}
