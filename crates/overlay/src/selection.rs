//! Selection logic for the startup region gesture

use crate::SelectionOutcome;
use capture::{Point, Rect};

/// Calculate selection rectangle from drag points
pub fn calc_selection_rect(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Rect {
    let x = start_x.min(end_x);
    let y = start_y.min(end_y);
    let width = (start_x - end_x).unsigned_abs();
    let height = (start_y - end_y).unsigned_abs();

    Rect::new(x, y, width, height)
}

/// Check if selection is valid
pub fn is_valid_selection(rect: &Rect) -> bool {
    !rect.is_empty()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Dragging { anchor: Point, current: Point },
    Finished(SelectionOutcome),
}

/// Press-drag-release gesture turned into a confirmed rectangle
#[derive(Debug, Clone)]
pub struct RegionSelector {
    phase: Phase,
}

impl RegionSelector {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Fix the anchor corner
    pub fn press(&mut self, at: Point) {
        if let Phase::Idle = self.phase {
            self.phase = Phase::Dragging { anchor: at, current: at };
        }
    }

    /// Track the pointer; returns the rectangle to draw while dragging
    pub fn motion(&mut self, at: Point) -> Option<Rect> {
        if let Phase::Dragging { ref mut current, .. } = self.phase {
            *current = at;
        }
        self.preview()
    }

    /// Finish the gesture. Zero-area releases become a cancellation.
    pub fn release(&mut self, at: Point) -> Option<SelectionOutcome> {
        let Phase::Dragging { anchor, .. } = self.phase else {
            return None;
        };

        let rect = calc_selection_rect(anchor.x, anchor.y, at.x, at.y);
        let outcome = if is_valid_selection(&rect) {
            SelectionOutcome::Region(rect)
        } else {
            SelectionOutcome::Cancelled
        };
        self.phase = Phase::Finished(outcome);
        Some(outcome)
    }

    /// Abandon the gesture (Escape, surface closed)
    pub fn cancel(&mut self) {
        if !self.is_finished() {
            self.phase = Phase::Finished(SelectionOutcome::Cancelled);
        }
    }

    /// Rectangle currently spanned by the drag
    pub fn preview(&self) -> Option<Rect> {
        match self.phase {
            Phase::Dragging { anchor, current } => {
                Some(calc_selection_rect(anchor.x, anchor.y, current.x, current.y))
            }
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    pub fn outcome(&self) -> Option<SelectionOutcome> {
        match self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }
}

impl Default for RegionSelector {
    fn default() -> Self {
        Self::new()
    }
}
