//! Off-screen frame buffer in the panel's native pixel format, plus the
//! drawing primitives the status screens are built from.
//!
//! Pixels are stored exactly as they are streamed to the ST7789: 12-bit
//! pixels pack two per three bytes, 16-bit pixels are big-endian. Only
//! [`Pixmap::set_pixel`] knows about packing; everything else goes through it.

use std::fmt;

use crate::color::{Color, Depth};
use crate::font::Font;

/// Frame buffer for one panel.
#[derive(Clone)]
pub struct Pixmap {
    pub bits: Vec<u8>,
    pub width: u16,
    pub height: u16,
    /// Bytes per row
    pub stride: u16,
    pub depth: Depth,
}

impl fmt::Debug for Pixmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pixmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl Pixmap {
    pub fn new(width: u16, height: u16, depth: Depth) -> Self {
        let stride = depth.stride(width);
        Pixmap {
            bits: vec![0; stride as usize * height as usize],
            width,
            height,
            stride,
            depth,
        }
    }

    /// Raw value of a named color in this pixmap's depth.
    #[inline]
    pub fn color(&self, color: Color) -> u16 {
        self.depth.raw(color)
    }

    /// Set a single pixel. Coordinates outside the pixmap are ignored.
    pub fn set_pixel(&mut self, x: u16, y: u16, color: u16) {
        if x >= self.width || y >= self.height {
            #[cfg(debug_assertions)]
            tracing::debug!("set_pixel: ({}, {}) outside {}x{}", x, y, self.width, self.height);
            return;
        }
        let row = y as usize * self.stride as usize;
        match self.depth {
            Depth::Rgb444 => {
                let p = &mut self.bits[row + (x as usize >> 1) * 3..][..3];
                if x & 1 == 0 {
                    p[0] = (color >> 4) as u8;
                    p[1] = (((color & 0x0f) << 4) as u8) | (p[1] & 0x0f);
                } else {
                    p[1] = (p[1] & 0xf0) | ((color >> 8) & 0x0f) as u8;
                    p[2] = color as u8;
                }
            }
            Depth::Rgb565 => {
                let i = row + x as usize * 2;
                self.bits[i..i + 2].copy_from_slice(&color.to_be_bytes());
            }
        }
    }

    /// Read back a pixel as a raw color value.
    pub fn pixel(&self, x: u16, y: u16) -> u16 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let row = y as usize * self.stride as usize;
        match self.depth {
            Depth::Rgb444 => {
                let p = &self.bits[row + (x as usize >> 1) * 3..][..3];
                if x & 1 == 0 {
                    ((p[0] as u16) << 4) | (p[1] as u16 >> 4)
                } else {
                    (((p[1] & 0x0f) as u16) << 8) | p[2] as u16
                }
            }
            Depth::Rgb565 => {
                let i = row + x as usize * 2;
                u16::from_be_bytes([self.bits[i], self.bits[i + 1]])
            }
        }
    }

    /// Fill the whole pixmap with one color.
    pub fn clear(&mut self, color: u16) {
        match self.depth {
            Depth::Rgb444 => {
                let pair = [
                    (color >> 4) as u8,
                    (((color & 0x0f) << 4) | ((color >> 8) & 0x0f)) as u8,
                    color as u8,
                ];
                let stride = self.stride as usize;
                for row in self.bits.chunks_exact_mut(stride) {
                    for p in row.chunks_exact_mut(3) {
                        p.copy_from_slice(&pair);
                    }
                }
            }
            Depth::Rgb565 => {
                let be = color.to_be_bytes();
                for p in self.bits.chunks_exact_mut(2) {
                    p.copy_from_slice(&be);
                }
            }
        }
    }

    /// Draw a glyph with its top-left corner at (`x`, `y`). Set bits are
    /// drawn in `fg`, clear bits in `bg`.
    pub fn draw_char(&mut self, x: u16, y: u16, c: u8, font: &Font, fg: u16, bg: u16) {
        let off = (c & 0x7f) as usize * font.width as usize;
        let first = off >> 3;
        let first_mask = 0x80u8 >> (off & 7);
        for j in 0..font.height {
            let mut idx = first + j as usize * font.stride as usize;
            let mut m = first_mask;
            for i in 0..font.width {
                let set = font.bits[idx] & m != 0;
                self.set_pixel(x + i, y + j, if set { fg } else { bg });
                m >>= 1;
                if m == 0 {
                    m = 0x80;
                    idx += 1;
                }
            }
        }
    }

    /// Draw `s` left to right starting at (`x`, `y`).
    pub fn draw_string(&mut self, x: u16, y: u16, s: &str, font: &Font, fg: u16, bg: u16) {
        let mut x = x;
        for c in s.bytes() {
            self.draw_char(x, y, c, font, fg, bg);
            x = x.saturating_add(font.width);
        }
    }

    /// Draw the set bits of a 1-bit image of `width` x `height` pixels,
    /// rows padded to whole bytes. Clear bits leave the pixmap untouched.
    pub fn draw_bitmap(&mut self, x: u16, y: u16, bitmap: &[u8], width: u16, height: u16, fg: u16) {
        let row_bytes = ((width + 7) / 8) as usize;
        for j in 0..height {
            let row = &bitmap[j as usize * row_bytes..][..row_bytes];
            for i in 0..width {
                if row[i as usize / 8] & (0x80 >> (i % 8)) != 0 {
                    self.set_pixel(x + i, y + j, fg);
                }
            }
        }
    }

    pub fn draw_hline(&mut self, x: u16, y: u16, w: u16, color: u16) {
        for i in 0..w {
            self.set_pixel(x.saturating_add(i), y, color);
        }
    }

    pub fn draw_vline(&mut self, x: u16, y: u16, h: u16, color: u16) {
        for j in 0..h {
            self.set_pixel(x, y.saturating_add(j), color);
        }
    }

    /// Full-screen message: black background, a one-pixel frame around the
    /// edge and the lines centered as a block, each in its own color.
    pub fn draw_banner(&mut self, lines: &[(&str, u16)], font: &Font, frame: u16) {
        let black = self.color(Color::Black);
        self.clear(black);
        let (w, h) = (self.width, self.height);
        self.draw_hline(0, 0, w, frame);
        self.draw_hline(0, h - 1, w, frame);
        self.draw_vline(0, 0, h, frame);
        self.draw_vline(w - 1, 0, h, frame);

        let block = lines.len() as u16 * (font.height + 2);
        let mut y = h.saturating_sub(block) / 2;
        for &(line, color) in lines {
            let len = line.len() as u16 * font.width;
            let x = w.saturating_sub(len) / 2;
            self.draw_string(x, y, line, font, color, black);
            y += font.height + 2;
        }
    }

    /// Gray rounded outline of a 10 x 10 LED at (`x`, `y`).
    pub fn led_bracket(&mut self, x: u16, y: u16) {
        let gray = self.color(Color::Gray);
        self.draw_hline(x + 2, y, 6, gray);
        self.set_pixel(x + 1, y + 1, gray);
        self.set_pixel(x + 8, y + 1, gray);
        self.draw_vline(x, y + 2, 6, gray);
        self.draw_vline(x + 9, y + 2, 6, gray);
        self.set_pixel(x + 1, y + 8, gray);
        self.set_pixel(x + 8, y + 8, gray);
        self.draw_hline(x + 2, y + 9, 6, gray);
    }

    /// Fill the inside of an LED bracket at (`x`, `y`).
    pub fn draw_led(&mut self, x: u16, y: u16, color: u16) {
        for i in 1..9 {
            if i == 1 || i == 8 {
                self.draw_hline(x + 2, y + i, 6, color);
            } else {
                self.draw_hline(x + 1, y + i, 8, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{font12, font20};

    fn both() -> [Pixmap; 2] {
        [Pixmap::new(240, 135, Depth::Rgb444), Pixmap::new(240, 135, Depth::Rgb565)]
    }

    #[test]
    fn test_buffer_size() {
        assert_eq!(Pixmap::new(240, 135, Depth::Rgb444).bits.len(), 360 * 135);
        assert_eq!(Pixmap::new(240, 135, Depth::Rgb565).bits.len(), 480 * 135);
    }

    #[test]
    fn test_12bit_packing() {
        let mut pm = Pixmap::new(4, 1, Depth::Rgb444);
        pm.set_pixel(0, 0, 0x0abc);
        pm.set_pixel(1, 0, 0x0def);
        assert_eq!(&pm.bits[0..3], &[0xab, 0xcd, 0xef]);
        assert_eq!(pm.pixel(0, 0), 0x0abc);
        assert_eq!(pm.pixel(1, 0), 0x0def);
    }

    #[test]
    fn test_12bit_neighbor_kept() {
        let mut pm = Pixmap::new(4, 2, Depth::Rgb444);
        pm.set_pixel(2, 1, 0x0123);
        pm.set_pixel(3, 1, 0x0456);
        pm.set_pixel(2, 1, 0x0fff);
        assert_eq!(pm.pixel(3, 1), 0x0456);
        pm.set_pixel(3, 1, 0x0000);
        assert_eq!(pm.pixel(2, 1), 0x0fff);
    }

    #[test]
    fn test_16bit_big_endian() {
        let mut pm = Pixmap::new(2, 2, Depth::Rgb565);
        pm.set_pixel(1, 1, 0xf81f);
        assert_eq!(&pm.bits[6..8], &[0xf8, 0x1f]);
        assert_eq!(pm.pixel(1, 1), 0xf81f);
        assert_eq!(pm.pixel(0, 1), 0);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        for mut pm in both() {
            let before = pm.bits.clone();
            pm.set_pixel(240, 0, 0xffff);
            pm.set_pixel(0, 135, 0xffff);
            assert_eq!(pm.bits, before);
        }
    }

    #[test]
    fn test_clear_fills_every_pixel() {
        for mut pm in both() {
            let c = pm.color(Color::Orange);
            pm.clear(c);
            for y in [0, 67, 134] {
                for x in [0, 1, 119, 238, 239] {
                    assert_eq!(pm.pixel(x, y), c);
                }
            }
            let once = pm.bits.clone();
            pm.clear(c);
            assert_eq!(pm.bits, once);
        }
    }

    #[test]
    fn test_draw_char_fg_bg() {
        let font = font20();
        for mut pm in both() {
            let (fg, bg) = (pm.color(Color::Green), pm.color(Color::DkBlue));
            pm.draw_char(5, 7, b'8', font, fg, bg);
            for y in 0..font.height {
                for x in 0..font.width {
                    let want = if font.glyph_pixel(b'8', x, y) { fg } else { bg };
                    assert_eq!(pm.pixel(5 + x, 7 + y), want);
                }
            }
            assert_eq!(pm.pixel(4, 7), 0);
            assert_eq!(pm.pixel(15, 7), 0);
        }
    }

    #[test]
    fn test_draw_string_advances_by_width() {
        let font = font12();
        let mut pm = Pixmap::new(240, 135, Depth::Rgb444);
        let (fg, bg) = (pm.color(Color::White), pm.color(Color::Black));
        pm.draw_string(0, 0, "AB", font, fg, bg);
        let mut single = Pixmap::new(240, 135, Depth::Rgb444);
        single.draw_char(6, 0, b'B', font, fg, bg);
        for y in 0..12 {
            for x in 6..12 {
                assert_eq!(pm.pixel(x, y), single.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_bitmap_leaves_clear_bits() {
        let mut pm = Pixmap::new(16, 2, Depth::Rgb565);
        pm.clear(0x1234);
        pm.draw_bitmap(0, 0, &[0x81, 0x00, 0x00, 0x00], 9, 2, 0xffff);
        assert_eq!(pm.pixel(0, 0), 0xffff);
        assert_eq!(pm.pixel(7, 0), 0xffff);
        assert_eq!(pm.pixel(1, 0), 0x1234);
        assert_eq!(pm.pixel(8, 0), 0x1234);
    }

    #[test]
    fn test_lines() {
        let mut pm = Pixmap::new(20, 20, Depth::Rgb444);
        pm.draw_hline(2, 3, 5, 0x0f00);
        pm.draw_vline(10, 4, 3, 0x00f0);
        assert_eq!(pm.pixel(1, 3), 0);
        assert_eq!(pm.pixel(2, 3), 0x0f00);
        assert_eq!(pm.pixel(6, 3), 0x0f00);
        assert_eq!(pm.pixel(7, 3), 0);
        assert_eq!(pm.pixel(10, 3), 0);
        assert_eq!(pm.pixel(10, 6), 0x00f0);
        assert_eq!(pm.pixel(10, 7), 0);
    }

    #[test]
    fn test_led_shape() {
        let mut pm = Pixmap::new(20, 20, Depth::Rgb565);
        let gray = pm.color(Color::Gray);
        let red = pm.color(Color::Red);
        pm.led_bracket(5, 5);
        pm.draw_led(5, 5, red);
        // bracket corners are open
        assert_eq!(pm.pixel(5, 5), 0);
        assert_eq!(pm.pixel(7, 5), gray);
        assert_eq!(pm.pixel(6, 6), gray);
        assert_eq!(pm.pixel(5, 7), gray);
        assert_eq!(pm.pixel(14, 12), gray);
        // fill stays inside the bracket
        assert_eq!(pm.pixel(7, 6), red);
        assert_eq!(pm.pixel(6, 7), red);
        assert_eq!(pm.pixel(13, 12), red);
        assert_eq!(pm.pixel(7, 13), red);
        assert_eq!(pm.pixel(7, 14), gray);
    }

    #[test]
    fn test_banner_frame_and_center() {
        let font = font20();
        for mut pm in both() {
            let (red, green, white) = (pm.color(Color::Red), pm.color(Color::Green), pm.color(Color::White));
            pm.draw_banner(&[("Waiting for", red), ("terminal", green)], font, white);
            assert_eq!(pm.pixel(0, 0), white);
            assert_eq!(pm.pixel(239, 134), white);
            assert_eq!(pm.pixel(120, 0), white);
            assert_eq!(pm.pixel(0, 70), white);
            // two lines of 22 px centered in 135 rows
            let y0 = (135 - 2 * 22) / 2;
            let x0 = (240 - 11 * 10) / 2;
            let mut expect = Pixmap::new(240, 135, pm.depth);
            expect.draw_char(x0, y0, b'W', font, red, 0);
            let x1 = (240 - 8 * 10) / 2;
            expect.draw_char(x1, y0 + 22, b't', font, green, 0);
            for y in 0..20 {
                for x in 0..10 {
                    assert_eq!(pm.pixel(x0 + x, y0 + y), expect.pixel(x0 + x, y0 + y));
                    assert_eq!(pm.pixel(x1 + x, y0 + 22 + y), expect.pixel(x1 + x, y0 + 22 + y));
                }
            }
        }
    }

    #[test]
    fn test_depth_independent_drawing() {
        let colors = [
            Color::Black, Color::White, Color::Red, Color::Green, Color::Blue, Color::Gray,
            Color::DkRed, Color::DkGreen, Color::DkBlue, Color::Orange, Color::Magenta, Color::Yellow,
        ];
        let [mut a, mut b] = both();
        for (i, &c) in colors.iter().enumerate() {
            let i = i as u16;
            a.draw_string(i * 12, i * 9, "Z80", font12(), a.color(c), a.color(Color::Black));
            b.draw_string(i * 12, i * 9, "Z80", font12(), b.color(c), b.color(Color::Black));
        }
        for y in 0..135 {
            for x in 0..240 {
                let ra = a.depth.to_rgb888(a.pixel(x, y));
                let rb = b.depth.to_rgb888(b.pixel(x, y));
                let hi = |(r, g, b): (u8, u8, u8)| (r >> 4, g >> 4, b >> 4);
                assert_eq!(hi(ra), hi(rb), "pixel ({}, {})", x, y);
            }
        }
    }
}
