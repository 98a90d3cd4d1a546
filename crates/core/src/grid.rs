//! Character-cell layout over a pixmap.
//!
//! Cells are one glyph wide and one glyph plus `spc` pixels high. Grid lines
//! sit in the spacing between rows and in the middle of a cell between
//! columns, which gives the register screens their table look.

use crate::font::Font;
use crate::pixmap::Pixmap;

#[derive(Debug, Clone, Copy)]
pub struct Grid {
    pub font: &'static Font,
    pub xoff: u16,
    pub yoff: u16,
    /// Pixels between rows
    pub spc: u16,
    pub cwidth: u16,
    pub cheight: u16,
    pub cols: u16,
    pub rows: u16,
}

impl Grid {
    /// Lay a grid over `pixmap`. A `cols` or `rows` of 0 fills the pixmap.
    pub fn new(
        pixmap: &Pixmap,
        font: &'static Font,
        xoff: u16,
        yoff: u16,
        spc: u16,
        cols: u16,
        rows: u16,
    ) -> Self {
        let cwidth = font.width;
        let cheight = font.height + spc;
        let cols = if cols == 0 { pixmap.width.saturating_sub(xoff) / cwidth } else { cols };
        let rows = if rows == 0 {
            (pixmap.height.saturating_sub(yoff) + spc) / cheight
        } else {
            rows
        };
        let grid = Grid { font, xoff, yoff, spc, cwidth, cheight, cols, rows };
        debug_assert!(
            xoff + cols * cwidth <= pixmap.width && yoff + rows * cheight - spc <= pixmap.height,
            "grid does not fit the pixmap"
        );
        grid
    }

    /// Pixel position of the top-left corner of cell (`x`, `y`).
    #[inline]
    pub fn origin(&self, x: u16, y: u16) -> (u16, u16) {
        (x * self.cwidth + self.xoff, y * self.cheight + self.yoff)
    }

    pub fn draw_char(&self, pm: &mut Pixmap, x: u16, y: u16, c: u8, fg: u16, bg: u16) {
        let (px, py) = self.origin(x, y);
        pm.draw_char(px, py, c, self.font, fg, bg);
    }

    pub fn draw_string(&self, pm: &mut Pixmap, x: u16, y: u16, s: &str, fg: u16, bg: u16) {
        let (px, py) = self.origin(x, y);
        pm.draw_string(px, py, s, self.font, fg, bg);
    }

    /// Horizontal line `w` cells long above row `y`, centered in the row
    /// spacing. Row 0 puts the line at the top edge.
    pub fn draw_hline(&self, pm: &mut Pixmap, x: u16, y: u16, w: u16, color: u16) {
        if w == 0 {
            return;
        }
        let x = x * self.cwidth;
        let y = if y == 0 { 0 } else { y * self.cheight - (self.spc + 1) / 2 };
        pm.draw_hline(x + self.xoff, y + self.yoff, w * self.cwidth, color);
    }

    /// Vertical line through the middle of column `x`, spanning `h` rows
    /// starting at row `y` and reaching into the row spacing at both ends.
    pub fn draw_vline(&self, pm: &mut Pixmap, x: u16, y: u16, h: u16, color: u16) {
        if h == 0 {
            return;
        }
        let x = x * self.cwidth + (self.cwidth + 1) / 2;
        let mut hadj = 0;
        if y + h < self.rows {
            hadj += self.spc / 2 + 1;
        }
        let y = if y == 0 {
            0
        } else {
            hadj += (self.spc + 1) / 2;
            y * self.cheight - (self.spc + 1) / 2
        };
        let h = (h * self.cheight + hadj).saturating_sub(self.spc);
        pm.draw_vline(x + self.xoff, y + self.yoff, h, color);
    }
}
