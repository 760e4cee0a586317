//! Hit-testing and resize math for borderless overlay windows
//!
//! Everything here is pure: a pointer position plus the window's bounds map to
//! a [`HitZone`], and an anchor rectangle plus a drag delta map to new bounds.

use capture::{Point, Rect};

/// Margin near the border that is treated as a resize grip
pub const GRIP_SIZE: i32 = 8;

/// Smallest size a result window can be resized to
pub const MIN_WIDTH: u32 = 50;
pub const MIN_HEIGHT: u32 = 30;

/// Subset of {N, S, E, W} being resized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Edges {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl Edges {
    pub const NONE: Edges = Edges { north: false, south: false, east: false, west: false };
    pub const NORTH: Edges = Edges { north: true, ..Edges::NONE };
    pub const SOUTH: Edges = Edges { south: true, ..Edges::NONE };
    pub const EAST: Edges = Edges { east: true, ..Edges::NONE };
    pub const WEST: Edges = Edges { west: true, ..Edges::NONE };

    pub fn union(self, other: Edges) -> Edges {
        Edges {
            north: self.north || other.north,
            south: self.south || other.south,
            east: self.east || other.east,
            west: self.west || other.west,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.north || self.south || self.east || self.west)
    }

    pub fn len(&self) -> usize {
        [self.north, self.south, self.east, self.west]
            .iter()
            .filter(|e| **e)
            .count()
    }
}

/// Classification of a pointer against a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    Move,
    Resize(Edges),
}

/// Cursor shown while hovering, purely as an affordance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Move,
    NorthSouth,
    EastWest,
    NorthEastSouthWest,
    NorthWestSouthEast,
}

impl HitZone {
    pub fn cursor(&self) -> CursorShape {
        match *self {
            HitZone::Move => CursorShape::Move,
            HitZone::Resize(e) => match (e.north || e.south, e.east || e.west) {
                (true, false) => CursorShape::NorthSouth,
                (false, true) => CursorShape::EastWest,
                (true, true) if (e.north && e.east) || (e.south && e.west) => {
                    CursorShape::NorthEastSouthWest
                }
                (true, true) => CursorShape::NorthWestSouthEast,
                (false, false) => CursorShape::Move,
            },
        }
    }
}

/// Classify a screen-space pointer against `bounds`.
///
/// The move zone is the rectangle shrunk by `grip` on every side, exclusive.
/// Outside it, every side within `grip` of the pointer contributes its edge,
/// so corners yield two edges.
pub fn classify(pointer: Point, bounds: Rect, grip: i32) -> HitZone {
    let local = bounds.to_local(pointer);
    let w = bounds.width as i32;
    let h = bounds.height as i32;

    let inside = local.x > grip && local.x < w - grip && local.y > grip && local.y < h - grip;
    if inside {
        return HitZone::Move;
    }

    HitZone::Resize(Edges {
        north: local.y <= grip,
        south: local.y >= h - grip,
        west: local.x <= grip,
        east: local.x >= w - grip,
    })
}

/// New bounds after dragging `edges` of `anchor` by `(dx, dy)`.
///
/// The side opposite a moving edge stays fixed. When the minimum size is hit
/// the moving side is clamped, so the window never inverts.
pub fn compute_resized_bounds(anchor: Rect, edges: Edges, dx: i32, dy: i32) -> Rect {
    let mut out = anchor;

    if edges.east {
        out.width = clamp_len(anchor.width as i64 + dx as i64, MIN_WIDTH);
    } else if edges.west {
        let right = anchor.right();
        out.width = clamp_len(anchor.width as i64 - dx as i64, MIN_WIDTH);
        out.x = right - out.width as i32;
    }

    if edges.south {
        out.height = clamp_len(anchor.height as i64 + dy as i64, MIN_HEIGHT);
    } else if edges.north {
        let bottom = anchor.bottom();
        out.height = clamp_len(anchor.height as i64 - dy as i64, MIN_HEIGHT);
        out.y = bottom - out.height as i32;
    }

    out
}

fn clamp_len(len: i64, min: u32) -> u32 {
    len.clamp(min as i64, u32::MAX as i64) as u32
}
