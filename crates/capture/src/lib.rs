//! Screen region capture for OverlayTranslate
//!
//! Provides the shared screen geometry types and a GDI grabber for a fixed
//! region of the virtual desktop.

pub mod frame;
#[cfg(windows)]
pub mod screen;

pub use frame::RawImage;
#[cfg(windows)]
pub use screen::{virtual_desktop_rect, ScreenGrabber};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("Region {region:?} lies outside the virtual screen {screen:?}")]
    OutOfBounds { region: Rect, screen: Rect },

    #[error("Empty capture region")]
    EmptyRegion,

    #[error("GDI error: {0}")]
    Gdi(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Point in screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset from `origin` to `self`
    pub fn delta_from(&self, origin: Point) -> (i32, i32) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// Rectangle in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// A capture region needs a positive area
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Same size, new origin
    pub fn moved_to(&self, x: i32, y: i32) -> Rect {
        Rect { x, y, ..*self }
    }

    /// Convert a screen point into this rectangle's local coordinates
    pub fn to_local(&self, point: Point) -> Point {
        Point::new(point.x - self.x, point.y - self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_rect_checks_all_edges() {
        let screen = Rect::new(0, 0, 1920, 1080);
        assert!(screen.contains_rect(&Rect::new(500, 360, 1000, 200)));
        assert!(screen.contains_rect(&Rect::new(0, 0, 1920, 1080)));
        assert!(!screen.contains_rect(&Rect::new(1900, 10, 40, 40)));
        assert!(!screen.contains_rect(&Rect::new(-1, 10, 40, 40)));
    }

    #[test]
    fn to_local_subtracts_origin() {
        let bounds = Rect::new(100, 50, 300, 200);
        assert_eq!(bounds.to_local(Point::new(110, 60)), Point::new(10, 10));
    }

    #[test]
    fn empty_when_either_side_is_zero() {
        assert!(Rect::new(5, 5, 0, 10).is_empty());
        assert!(Rect::new(5, 5, 10, 0).is_empty());
        assert!(!Rect::new(5, 5, 1, 1).is_empty());
    }
}
