//! Captured pixel data and PNG encoding

use crate::{CaptureError, CaptureResult};
use image::{ImageBuffer, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::time::Instant;

/// Top-down 32-bit BGRA pixels of a captured region
#[derive(Debug, Clone)]
pub struct RawImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

impl RawImage {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Convert BGRA data to RGBA image
    pub fn to_rgba_image(&self) -> CaptureResult<RgbaImage> {
        let mut rgba_data = self.data.clone();

        for chunk in rgba_data.chunks_exact_mut(4) {
            chunk.swap(0, 2);
            // GDI leaves alpha undefined
            chunk[3] = 0xFF;
        }

        ImageBuffer::from_raw(self.width, self.height, rgba_data).ok_or_else(|| {
            CaptureError::Gdi(format!(
                "buffer of {} bytes does not match {}x{}",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Encode as an in-memory PNG
    pub fn to_png(&self) -> CaptureResult<Vec<u8>> {
        let img = self.to_rgba_image()?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgra_is_swizzled_to_opaque_rgba() {
        let raw = RawImage::new(vec![10, 20, 30, 0, 1, 2, 3, 0], 2, 1);
        let img = raw.to_rgba_image().unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [30, 20, 10, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [3, 2, 1, 255]);
    }

    #[test]
    fn mismatched_buffer_is_an_error() {
        let raw = RawImage::new(vec![0; 7], 2, 1);
        assert!(matches!(raw.to_rgba_image(), Err(CaptureError::Gdi(_))));
    }

    #[test]
    fn png_has_signature() {
        let raw = RawImage::new(vec![0; 4 * 4 * 4], 4, 4);
        let png = raw.to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
