//! Drag/resize state machine and layout of the result window
//!
//! The Win32 window only translates messages into [`PointerInput`] and applies
//! the returned [`Effect`], so all behavior here runs without a display.

use crate::geometry::{classify, compute_resized_bounds, CursorShape, HitZone, GRIP_SIZE};
use capture::{Point, Rect};

/// Horizontal/vertical padding around the label
pub const LABEL_PADDING_X: u32 = 20;
pub const LABEL_PADDING_Y: u32 = 10;

/// Side of the square close button and its inset from the top-right corner
pub const CLOSE_BUTTON_SIZE: u32 = 16;
pub const CLOSE_BUTTON_INSET: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerInput {
    Press { at: Point, button: Button },
    Motion { at: Point, primary_held: bool },
    Release { at: Point, button: Button },
}

/// What the host window has to do in response to an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Apply new bounds immediately and re-wrap the label
    Reposition(Rect),
    /// Drag finished; these bounds should be remembered for the next window
    Commit(Rect),
    Cursor(CursorShape),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragAction {
    Move,
    Resize(crate::geometry::Edges),
}

/// Bookkeeping for one press-move-release cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub action: DragAction,
    pub anchor: Point,
    pub anchor_bounds: Rect,
}

/// Live bounds of a result window plus the drag in progress, if any
#[derive(Debug, Clone)]
pub struct ResultInteraction {
    bounds: Rect,
    drag: Option<DragState>,
}

impl ResultInteraction {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds, drag: None }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn handle(&mut self, input: PointerInput) -> Effect {
        match input {
            PointerInput::Press { button: Button::Secondary, .. } => {
                self.drag = None;
                Effect::Close
            }
            PointerInput::Press { at, button: Button::Primary } => {
                if close_button_rect(self.bounds).contains(at.x, at.y) {
                    self.drag = None;
                    return Effect::Close;
                }

                let action = match classify(at, self.bounds, GRIP_SIZE) {
                    HitZone::Move => DragAction::Move,
                    HitZone::Resize(edges) => DragAction::Resize(edges),
                };
                self.drag = Some(DragState {
                    action,
                    anchor: at,
                    anchor_bounds: self.bounds,
                });
                Effect::None
            }
            PointerInput::Motion { at, primary_held: true } => {
                let Some(drag) = self.drag else {
                    return Effect::None;
                };
                let (dx, dy) = at.delta_from(drag.anchor);
                let next = match drag.action {
                    DragAction::Move => drag
                        .anchor_bounds
                        .moved_to(drag.anchor_bounds.x + dx, drag.anchor_bounds.y + dy),
                    DragAction::Resize(edges) => {
                        compute_resized_bounds(drag.anchor_bounds, edges, dx, dy)
                    }
                };
                if next == self.bounds {
                    return Effect::None;
                }
                self.bounds = next;
                Effect::Reposition(next)
            }
            PointerInput::Motion { at, primary_held: false } => {
                Effect::Cursor(classify(at, self.bounds, GRIP_SIZE).cursor())
            }
            PointerInput::Release { button: Button::Primary, .. } => match self.drag.take() {
                Some(_) => Effect::Commit(self.bounds),
                None => Effect::None,
            },
            PointerInput::Release { button: Button::Secondary, .. } => Effect::None,
        }
    }
}

/// Width available to the word-wrapped label
pub fn wrap_width(bounds: Rect) -> u32 {
    bounds.width.saturating_sub(2 * LABEL_PADDING_X)
}

/// Label area in window-local coordinates
pub fn label_rect(bounds: Rect) -> Rect {
    Rect::new(
        LABEL_PADDING_X as i32,
        LABEL_PADDING_Y as i32,
        wrap_width(bounds),
        bounds.height.saturating_sub(2 * LABEL_PADDING_Y),
    )
}

/// Close button in screen coordinates, anchored to the top-right corner
pub fn close_button_rect(bounds: Rect) -> Rect {
    Rect::new(
        bounds.right() - CLOSE_BUTTON_INSET - CLOSE_BUTTON_SIZE as i32,
        bounds.y + CLOSE_BUTTON_INSET,
        CLOSE_BUTTON_SIZE,
        CLOSE_BUTTON_SIZE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Edges, MIN_WIDTH};

    fn window() -> ResultInteraction {
        ResultInteraction::new(Rect::new(500, 360, 1000, 200))
    }

    fn press(at: (i32, i32)) -> PointerInput {
        PointerInput::Press { at: Point::new(at.0, at.1), button: Button::Primary }
    }

    fn drag_to(at: (i32, i32)) -> PointerInput {
        PointerInput::Motion { at: Point::new(at.0, at.1), primary_held: true }
    }

    fn release(at: (i32, i32)) -> PointerInput {
        PointerInput::Release { at: Point::new(at.0, at.1), button: Button::Primary }
    }

    #[test]
    fn press_in_move_zone_starts_move() {
        let mut w = window();
        assert_eq!(w.handle(press((700, 450))), Effect::None);
        let drag = w.drag().copied().unwrap();
        assert_eq!(drag.action, DragAction::Move);
        assert_eq!(drag.anchor, Point::new(700, 450));
        assert_eq!(drag.anchor_bounds, Rect::new(500, 360, 1000, 200));
    }

    #[test]
    fn press_on_corner_starts_resize() {
        let mut w = window();
        w.handle(press((1497, 558)));
        assert_eq!(
            w.drag().map(|d| d.action),
            Some(DragAction::Resize(Edges::SOUTH.union(Edges::EAST)))
        );
    }

    #[test]
    fn deltas_are_measured_from_the_anchor() {
        let mut w = window();
        w.handle(press((700, 450)));
        w.handle(drag_to((710, 455)));
        assert_eq!(w.handle(drag_to((720, 460))), Effect::Reposition(Rect::new(520, 370, 1000, 200)));
    }

    #[test]
    fn motion_without_button_only_changes_cursor() {
        let mut w = window();
        assert_eq!(
            w.handle(PointerInput::Motion { at: Point::new(503, 450), primary_held: false }),
            Effect::Cursor(CursorShape::EastWest)
        );
        assert_eq!(w.bounds(), Rect::new(500, 360, 1000, 200));
        assert!(w.drag().is_none());
    }

    #[test]
    fn resize_drag_respects_minimum() {
        let mut w = window();
        w.handle(press((1498, 450)));
        assert_eq!(w.handle(drag_to((0, 450))), Effect::Reposition(Rect::new(500, 360, MIN_WIDTH, 200)));
    }

    #[test]
    fn release_commits_and_clears() {
        let mut w = window();
        w.handle(press((700, 450)));
        w.handle(drag_to((730, 440)));
        assert_eq!(w.handle(release((730, 440))), Effect::Commit(Rect::new(530, 350, 1000, 200)));
        assert!(w.drag().is_none());
        assert_eq!(w.handle(release((730, 440))), Effect::None);
    }

    #[test]
    fn secondary_press_closes_anywhere() {
        let mut w = window();
        w.handle(press((700, 450)));
        let close = PointerInput::Press { at: Point::new(1000, 400), button: Button::Secondary };
        assert_eq!(w.handle(close), Effect::Close);
        assert!(w.drag().is_none());
    }

    #[test]
    fn close_button_takes_priority_over_resize_grip() {
        let mut w = window();
        let button = close_button_rect(w.bounds());
        assert_eq!(button, Rect::new(1482, 362, 16, 16));
        assert_eq!(w.handle(press((1490, 364))), Effect::Close);
    }

    #[test]
    fn label_wraps_inside_padding() {
        let bounds = Rect::new(0, 0, 300, 100);
        assert_eq!(wrap_width(bounds), 260);
        assert_eq!(label_rect(bounds), Rect::new(20, 10, 260, 80));
        assert_eq!(wrap_width(Rect::new(0, 0, 30, 30)), 0);
    }
}
