//! Pixel buffer presented by the window, plus the drawing the harness needs:
//! captured frames, bitmap text, and the timestamp overlay.

use crate::capture::{CaptureError, RawFrame};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use time::macros::format_description;
use time::OffsetDateTime;

const GLYPH_SIZE: i32 = 8;

pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

pub const CLOCK_COLOR: u32 = rgb(0xff, 0xd0, 0x40);
pub const CLOCK_SHADOW: u32 = rgb(0x10, 0x10, 0x10);

/// Frame converted to packed 24-bit RGB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbImage {
    /// Reinterpret a BGRX capture as RGB, dropping the padding byte.
    pub fn from_bgrx(frame: &RawFrame) -> Result<Self, CaptureError> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        let needed = width * height * 4;
        if frame.data.len() < needed {
            return Err(CaptureError::Protocol(format!(
                "short image: {} bytes for {width}x{height}",
                frame.data.len()
            )));
        }
        let mut data = Vec::with_capacity(width * height * 3);
        for px in frame.data[..needed].chunks_exact(4) {
            data.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }
}

/// `0RGB` pixel buffer, the layout `minifb` presents.
#[derive(Debug, Clone)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    fn put(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = color;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for py in y0..y1 {
            let row = py as usize * self.width;
            for px in x0..x1 {
                self.pixels[row + px as usize] = color;
            }
        }
    }

    /// Replace the region at (`x`, `y`) with `image`, clipped to the surface.
    pub fn draw_image(&mut self, x: usize, y: usize, image: &RgbImage) {
        let cols = image.width.min(self.width.saturating_sub(x));
        let rows = image.height.min(self.height.saturating_sub(y));
        for row in 0..rows {
            let src = row * image.width * 3;
            let dst = (y + row) * self.width + x;
            for col in 0..cols {
                let i = src + col * 3;
                self.pixels[dst + col] =
                    rgb(image.data[i], image.data[i + 1], image.data[i + 2]);
            }
        }
    }

    /// Draw `text` with 8x8 bitmap glyphs scaled by `scale`. Unknown glyphs leave a gap.
    pub fn draw_text(&mut self, x: i32, y: i32, scale: i32, color: u32, text: &str) {
        let mut cx = x;
        for ch in text.chars() {
            if let Some(glyph) = BASIC_FONTS.get(ch) {
                for (row, bits) in glyph.iter().enumerate() {
                    for col in 0..GLYPH_SIZE {
                        if (bits >> col) & 1 == 1 {
                            self.fill_scaled(cx + col * scale, y + row as i32 * scale, scale, color);
                        }
                    }
                }
            }
            cx += GLYPH_SIZE * scale;
        }
    }

    fn fill_scaled(&mut self, x: i32, y: i32, scale: i32, color: u32) {
        if scale == 1 {
            self.put(x, y, color);
        } else {
            self.fill_rect(x, y, scale, scale, color);
        }
    }

    /// Dark copy one pixel down-right, colored copy on top.
    pub fn draw_outlined_text(
        &mut self,
        x: i32,
        y: i32,
        scale: i32,
        color: u32,
        shadow: u32,
        text: &str,
    ) {
        self.draw_text(x + 1, y + 1, scale, shadow, text);
        self.draw_text(x, y, scale, color, text);
    }
}

/// Width in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * GLYPH_SIZE * scale
}

/// Current wall-clock time as `HH:MM:SS`, local when the offset is known.
pub fn timestamp_label() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| "--:--:--".to_string())
}
