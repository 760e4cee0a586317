//! Error taxonomy for the capture-translate application

use capture::CaptureError;
use thiserror::Error;

/// Text recognition collaborator failures
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("OCR engine unavailable at {path}: {source}")]
    Engine {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR failed: {0}")]
    Failed(String),

    #[error("Could not encode capture for OCR: {0}")]
    Encode(#[from] CaptureError),
}

/// Translation collaborator failures
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Translation came back empty")]
    EmptyResponse,
}

/// Anything that ends a capture cycle early
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("Could not display result: {0}")]
    Display(String),
}

/// Fatal before the event loop starts
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("No valid region was selected")]
    RegionCancelled,

    #[error("OCR engine not available: {0}")]
    OcrUnavailable(#[source] RecognitionError),

    #[error("Invalid hotkey {hotkey:?}: {reason}")]
    Hotkey { hotkey: String, reason: String },

    #[error("Failed to initialise the display: {0}")]
    Display(String),

    #[error("No display backend is available on this platform")]
    UnsupportedPlatform,
}
