//! Single-flight capture → recognize → translate → display cycle

use crate::error::{PipelineError, RecognitionError, TranslationError};
use crate::state::{PipelinePhase, PipelineState, RunGate};
use capture::{CaptureError, RawImage, Rect};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Screenshot collaborator
pub trait ScreenCapture {
    fn capture(&mut self, region: Rect) -> Result<RawImage, CaptureError>;
}

/// OCR collaborator; may legitimately return an empty string
pub trait TextRecognizer {
    fn recognize(&mut self, image: &RawImage) -> Result<String, RecognitionError>;
}

/// Translation collaborator
pub trait Translator {
    fn translate(&mut self, text: &str) -> Result<String, TranslationError>;
}

/// Where results end up: the result overlay in the real app
pub trait ResultDisplay {
    /// Replace whatever is shown with `text` at `bounds`, auto-closing after `duration`
    fn show(&mut self, text: &str, bounds: Rect, duration: Duration) -> Result<(), PipelineError>;

    /// Bounds the user dragged the last window to, if they moved it since the last call
    fn take_moved_bounds(&mut self) -> Option<Rect>;

    fn close(&mut self);
}

/// Called with the normalized source text before translation
pub type SourceTextHook = Arc<dyn Fn(&str) + Send + Sync>;

/// How a `trigger()` call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Another cycle was running; nothing happened
    Dropped,
    /// OCR found no text; no window shown
    NoText,
    /// The translation is on screen
    Translated(String),
    /// A collaborator failed and its message is on screen
    ErrorShown(String),
    /// The display itself failed
    DisplayFailed(String),
}

/// Collapse whitespace runs to single spaces and trim both ends
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text shown in place of a translation when the cycle fails
pub fn error_text(err: &PipelineError) -> String {
    format!("Error: {err}")
}

struct Collaborators<S, R, T, D> {
    capture: S,
    recognizer: R,
    translator: T,
    display: D,
}

pub struct CapturePipeline<S, R, T, D> {
    gate: RunGate,
    state: Mutex<PipelineState>,
    parts: Mutex<Collaborators<S, R, T, D>>,
    display_duration: Duration,
    on_source_text: Option<SourceTextHook>,
}

impl<S, R, T, D> CapturePipeline<S, R, T, D>
where
    S: ScreenCapture,
    R: TextRecognizer,
    T: Translator,
    D: ResultDisplay,
{
    pub fn new(
        region: Rect,
        display_duration: Duration,
        capture: S,
        recognizer: R,
        translator: T,
        display: D,
    ) -> Self {
        Self {
            gate: RunGate::new(),
            state: Mutex::new(PipelineState::new(region)),
            parts: Mutex::new(Collaborators {
                capture,
                recognizer,
                translator,
                display,
            }),
            display_duration,
            on_source_text: None,
        }
    }

    /// Install a hook receiving the normalized source text of each cycle
    pub fn with_source_text_hook(mut self, hook: SourceTextHook) -> Self {
        self.on_source_text = Some(hook);
        self
    }

    pub fn phase(&self) -> PipelinePhase {
        self.gate.phase()
    }

    pub fn state(&self) -> PipelineState {
        self.state.lock().clone()
    }

    /// Run one cycle unless one is already in flight.
    ///
    /// Overlapping triggers are dropped, not queued.
    #[instrument(skip(self))]
    pub fn trigger(&self) -> TriggerOutcome {
        let Some(_running) = self.gate.try_begin() else {
            debug!("capture already running, trigger dropped");
            return TriggerOutcome::Dropped;
        };

        let mut parts = self.parts.lock();
        let region = self.state.lock().region();

        info!(?region, "capturing and translating");
        let (message, failed) = match self.run_cycle(&mut parts, region) {
            Ok(Some(translated)) => {
                info!("translation complete");
                (translated, false)
            }
            Ok(None) => {
                info!("no text recognised");
                return TriggerOutcome::NoText;
            }
            Err(e) => {
                error!(error = %e, "capture cycle failed");
                (error_text(&e), true)
            }
        };

        if let Err(e) = self.display(&mut parts, &message) {
            error!(error = %e, "result window could not be shown");
            return TriggerOutcome::DisplayFailed(e.to_string());
        }

        if failed {
            TriggerOutcome::ErrorShown(message)
        } else {
            TriggerOutcome::Translated(message)
        }
    }

    fn run_cycle(
        &self,
        parts: &mut Collaborators<S, R, T, D>,
        region: Rect,
    ) -> Result<Option<String>, PipelineError> {
        let image = parts.capture.capture(region)?;
        let raw = parts.recognizer.recognize(&image)?;

        let text = normalize_whitespace(&raw);
        if text.is_empty() {
            return Ok(None);
        }
        debug!(chars = text.len(), "recognised source text");

        if let Some(hook) = &self.on_source_text {
            hook(&text);
        }

        let translated = parts.translator.translate(&text)?;
        let translated = translated.trim();
        if translated.is_empty() {
            return Err(TranslationError::EmptyResponse.into());
        }
        Ok(Some(translated.to_string()))
    }

    fn display(
        &self,
        parts: &mut Collaborators<S, R, T, D>,
        text: &str,
    ) -> Result<(), PipelineError> {
        let bounds = {
            let mut state = self.state.lock();
            if let Some(moved) = parts.display.take_moved_bounds() {
                state.last_bounds = moved;
            }
            state.last_bounds
        };
        parts.display.show(text, bounds, self.display_duration)
    }

    /// Close any open result window
    pub fn close_display(&self) {
        match self.parts.try_lock() {
            Some(mut parts) => parts.display.close(),
            None => warn!("cycle in flight, result window left to its timer"),
        }
    }
}
