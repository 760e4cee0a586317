//! Overlay module for OverlayTranslate
//!
//! Provides the translucent region-selection surface and the draggable,
//! resizable, auto-dismissing result window.

pub mod geometry;
pub mod interaction;
pub mod selection;

#[cfg(windows)]
pub mod render;
#[cfg(windows)]
pub mod result_window;
#[cfg(windows)]
pub mod window;

pub use geometry::{classify, compute_resized_bounds, CursorShape, Edges, HitZone};
pub use interaction::{Button, DragAction, DragState, Effect, PointerInput, ResultInteraction};
pub use selection::RegionSelector;

#[cfg(windows)]
pub use result_window::ResultWindow;
#[cfg(windows)]
pub use window::SelectionOverlay;

use capture::Rect;
#[cfg(windows)]
use thiserror::Error;

#[cfg(windows)]
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),
}

#[cfg(windows)]
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Selection outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// User selected a region
    Region(Rect),
    /// User cancelled or released without area
    Cancelled,
}

impl SelectionOutcome {
    pub fn region(self) -> Option<Rect> {
        match self {
            SelectionOutcome::Region(rect) => Some(rect),
            SelectionOutcome::Cancelled => None,
        }
    }
}
