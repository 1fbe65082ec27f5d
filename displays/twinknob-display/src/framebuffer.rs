//! Monochrome framebuffer
//!
//! 1 bit per pixel, stored in the controller's page layout (see crate docs).
//! The byte storage is borrowed from the caller so the panel size is not
//! fixed at compile time. All drawing clips silently: coordinates outside
//! the buffer are dropped pixel by pixel, never reported.
//!
//! Colors are `bool`: `true` lights the pixel.

use crate::error::ConfigError;
use crate::font::{self, CHAR_ADVANCE, GLYPH_HEIGHT};

/// Page height in pixel rows
pub const PAGE_HEIGHT: u16 = 8;

/// Bytes needed for a `width` x `height` buffer
pub const fn buffer_len(width: u16, height: u16) -> usize {
    (width as usize) * (height as usize) / PAGE_HEIGHT as usize
}

/// Lines are drawn exactly inside ±`LINE_WINDOW`; endpoints beyond it are
/// first clipped to that window so far-off lines stay cheap
const LINE_WINDOW: i64 = 1 << 15;

/// Page-organised 1-bit framebuffer over borrowed storage
pub struct FrameBuffer<'a> {
    buf: &'a mut [u8],
    width: u16,
    height: u16,
}

impl<'a> FrameBuffer<'a> {
    /// Create a framebuffer over the first `width * height / 8` bytes of `buf`
    ///
    /// Width and height must be positive multiples of 8. Existing contents
    /// of `buf` are kept.
    pub fn new(buf: &'a mut [u8], width: u16, height: u16) -> Result<Self, ConfigError> {
        if width == 0 || width % 8 != 0 {
            return Err(ConfigError::InvalidWidth(width));
        }
        if height == 0 || height % PAGE_HEIGHT != 0 {
            return Err(ConfigError::InvalidHeight(height));
        }

        let required = buffer_len(width, height);
        if buf.len() < required {
            return Err(ConfigError::BufferTooSmall {
                required,
                actual: buf.len(),
            });
        }

        Ok(Self {
            buf: &mut buf[..required],
            width,
            height,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of 8-row pages
    pub fn pages(&self) -> u16 {
        self.height / PAGE_HEIGHT
    }

    /// Raw page-ordered bytes (`width * height / 8` long)
    pub fn as_bytes(&self) -> &[u8] {
        self.buf
    }

    /// Bytes of one page, or `None` past the last page
    pub fn page(&self, page: u16) -> Option<&[u8]> {
        let width = self.width as usize;
        let start = page as usize * width;
        self.buf.get(start..start + width)
    }

    /// Iterate over pages from top to bottom
    pub fn page_slices(&self) -> impl Iterator<Item = &[u8]> {
        self.buf.chunks_exact(self.width as usize)
    }

    /// Set every pixel to `color`
    pub fn fill(&mut self, color: bool) {
        self.buf.fill(if color { 0xFF } else { 0x00 });
    }

    /// Byte index and bit mask for an in-bounds pixel
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        let index = (y / PAGE_HEIGHT as usize) * self.width as usize + x;
        Some((index, 1 << (y % PAGE_HEIGHT as usize)))
    }

    /// Set one pixel; out-of-bounds coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: bool) {
        if let Some((index, mask)) = self.locate(x, y) {
            if color {
                self.buf[index] |= mask;
            } else {
                self.buf[index] &= !mask;
            }
        }
    }

    /// Read one pixel; `None` out of bounds
    pub fn pixel(&self, x: i32, y: i32) -> Option<bool> {
        self.locate(x, y)
            .map(|(index, mask)| self.buf[index] & mask != 0)
    }

    /// Horizontal line of `width` pixels starting at (x, y)
    pub fn hline(&mut self, x: i32, y: i32, width: i32, color: bool) {
        self.fill_rect(x, y, width, 1, color);
    }

    /// Vertical line of `height` pixels starting at (x, y)
    pub fn vline(&mut self, x: i32, y: i32, height: i32, color: bool) {
        self.fill_rect(x, y, 1, height, color);
    }

    /// Line between two points (inclusive), Bresenham
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: bool) {
        let Some(((x0, y0), (x1, y1))) = clip_to_window((x0, y0), (x1, y1)) else {
            return;
        };

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Rectangle outline
    pub fn rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: bool) {
        if width <= 0 || height <= 0 {
            return;
        }
        self.hline(x, y, width, color);
        self.hline(x, y.saturating_add(height - 1), width, color);
        self.vline(x, y, height, color);
        self.vline(x.saturating_add(width - 1), y, height, color);
    }

    /// Filled rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: bool) {
        // Clip to the buffer once instead of per pixel
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(width).min(self.width as i32);
        let y1 = y.saturating_add(height).min(self.height as i32);

        for py in y0..y1 {
            for px in x0..x1 {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Draw text with the built-in 5x8 font, top-left corner at (x, y)
    ///
    /// Only the glyph's lit pixels are drawn; the background is left as is.
    /// `'\n'` moves to the start of the next text line.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, color: bool) {
        let mut cursor_x = x;
        let mut cursor_y = y;

        for ch in text.chars() {
            if ch == '\n' {
                cursor_x = x;
                cursor_y = cursor_y.saturating_add(GLYPH_HEIGHT);
                continue;
            }

            for (col, &bits) in font::glyph(ch).iter().enumerate() {
                let Some(px) = cursor_x.checked_add(col as i32) else {
                    continue;
                };
                for row in 0..GLYPH_HEIGHT {
                    if bits & (1u8 << row) == 0 {
                        continue;
                    }
                    if let Some(py) = cursor_y.checked_add(row) {
                        self.set_pixel(px, py, color);
                    }
                }
            }
            cursor_x = cursor_x.saturating_add(CHAR_ADVANCE);
        }
    }

    /// Copy `source` with its top-left corner at (x, y)
    ///
    /// Source pixels equal to `key` are treated as transparent.
    pub fn blit(&mut self, source: &FrameBuffer<'_>, x: i32, y: i32, key: Option<bool>) {
        for sy in 0..source.height as i32 {
            for sx in 0..source.width as i32 {
                let Some(color) = source.pixel(sx, sy) else {
                    continue;
                };
                if key == Some(color) {
                    continue;
                }
                if let (Some(px), Some(py)) = (x.checked_add(sx), y.checked_add(sy)) {
                    self.set_pixel(px, py, color);
                }
            }
        }
    }

    /// Shift the contents by (dx, dy)
    ///
    /// The area the image moved away from keeps its previous pixels.
    pub fn scroll(&mut self, dx: i32, dy: i32) {
        let width = self.width as i32;
        let height = self.height as i32;
        if dx.unsigned_abs() >= width as u32 || dy.unsigned_abs() >= height as u32 {
            return;
        }

        // Walk against the shift direction so every source pixel is read
        // before it is overwritten
        let ys: (i32, i32, i32) = if dy < 0 {
            (0, height + dy, 1)
        } else {
            (height - 1, dy - 1, -1)
        };
        let xs: (i32, i32, i32) = if dx < 0 {
            (0, width + dx, 1)
        } else {
            (width - 1, dx - 1, -1)
        };

        let mut y = ys.0;
        while y != ys.1 {
            let mut x = xs.0;
            while x != xs.1 {
                if let Some(color) = self.pixel(x - dx, y - dy) {
                    self.set_pixel(x, y, color);
                }
                x += xs.2;
            }
            y += ys.2;
        }
    }
}

/// Clip a segment to the ±`LINE_WINDOW` square (Cohen-Sutherland)
///
/// Returns `None` when the segment misses the window entirely.
fn clip_to_window(p0: (i32, i32), p1: (i32, i32)) -> Option<((i32, i32), (i32, i32))> {
    const LEFT: u8 = 1;
    const RIGHT: u8 = 2;
    const BELOW: u8 = 4;
    const ABOVE: u8 = 8;

    fn outcode((x, y): (i64, i64)) -> u8 {
        let mut code = 0;
        if x < -LINE_WINDOW {
            code |= LEFT;
        } else if x > LINE_WINDOW {
            code |= RIGHT;
        }
        if y < -LINE_WINDOW {
            code |= BELOW;
        } else if y > LINE_WINDOW {
            code |= ABOVE;
        }
        code
    }

    let mut a = (p0.0 as i64, p0.1 as i64);
    let mut b = (p1.0 as i64, p1.1 as i64);
    let mut code_a = outcode(a);
    let mut code_b = outcode(b);

    loop {
        if code_a | code_b == 0 {
            // Inside the window, so both fit in i32
            return Some(((a.0 as i32, a.1 as i32), (b.0 as i32, b.1 as i32)));
        }
        if code_a & code_b != 0 {
            return None;
        }

        let code = if code_a != 0 { code_a } else { code_b };
        let (dx, dy) = ((b.0 - a.0) as i128, (b.1 - a.1) as i128);
        // Products of two 33-bit spans need i128
        let point = if code & (ABOVE | BELOW) != 0 {
            let edge = if code & ABOVE != 0 { LINE_WINDOW } else { -LINE_WINDOW };
            let x = a.0 as i128 + dx * (edge - a.1) as i128 / dy;
            (x as i64, edge)
        } else {
            let edge = if code & RIGHT != 0 { LINE_WINDOW } else { -LINE_WINDOW };
            let y = a.1 as i128 + dy * (edge - a.0) as i128 / dx;
            (edge, y as i64)
        };

        if code == code_a {
            a = point;
            code_a = outcode(a);
        } else {
            b = point;
            code_b = outcode(b);
        }
    }
}
