//! Memory heatmap.
//!
//! Both memory banks are shown as boxes of 128 rows, one pixel per 32-bit
//! word, filled column by column. A word's color is its Fibonacci hash, so
//! any change in memory shows as a change of color. Every pixel is
//! recomputed each frame; the frame transfer costs far more than this.

use std::sync::atomic::{AtomicU32, Ordering};

use super::{Frame, Screen};
use crate::color::Color;
use crate::machine::Machine;
use crate::pixmap::Pixmap;

const XOFF: u16 = 3;
const YOFF: u16 = 0;
const BRDR: u16 = 3;
const HEIGHT: u16 = 128;
const BANK0_COLS: u16 = 128;
const BANK1_COLS: u16 = 96;

/// 2^32 divided by the golden ratio
const FIB_HASH: u32 = 2654435769;

#[inline]
fn word_color(w: u32) -> u16 {
    (w.wrapping_mul(FIB_HASH) >> 20) as u16
}

#[derive(Debug, Default)]
pub struct MemoryMap;

impl MemoryMap {
    fn draw_static(pm: &mut Pixmap) {
        let dkblue = pm.color(Color::DkBlue);
        pm.clear(dkblue);
        let green = pm.color(Color::Green);
        let width = BANK0_COLS + BANK1_COLS + 4 * BRDR - 1;
        let height = HEIGHT + 2 * BRDR;
        pm.draw_hline(XOFF, YOFF, width, green);
        pm.draw_hline(XOFF, YOFF + height - 1, width, green);
        pm.draw_vline(XOFF, YOFF, height, green);
        pm.draw_vline(XOFF + BANK0_COLS + 2 * BRDR - 1, YOFF, height, green);
        pm.draw_vline(XOFF + width - 1, YOFF, height, green);
    }

    fn draw_bank(pm: &mut Pixmap, bank: &[AtomicU32], x0: u16, cols: u16) {
        let mut words = bank.iter().map(|w| w.load(Ordering::Relaxed));
        for x in x0..x0 + cols {
            for y in YOFF + BRDR..YOFF + BRDR + HEIGHT {
                let w = words.next().unwrap_or(0);
                pm.set_pixel(x, y, word_color(w));
            }
        }
    }

    fn draw_dynamic(pm: &mut Pixmap, m: &Machine) {
        Self::draw_bank(pm, m.bank0(), XOFF + BRDR, BANK0_COLS);
        Self::draw_bank(pm, m.bank1(), XOFF + 3 * BRDR - 1 + BANK0_COLS, BANK1_COLS);
    }
}

impl Screen for MemoryMap {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        if first {
            Self::draw_static(frame.pixmap);
        } else {
            Self::draw_dynamic(frame.pixmap, frame.machine);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Depth;
    use crate::machine::CpuKind;
    use crate::screens::tests::render;

    #[test]
    fn test_border_layout() {
        let m = Machine::default();
        let pm = render(Depth::Rgb444, &m, 0.0, |f| MemoryMap.draw(f, true));
        let green = pm.color(Color::Green);
        assert_eq!(pm.pixel(3, 0), green);
        assert_eq!(pm.pixel(237, 0), green);
        assert_eq!(pm.pixel(238, 0), pm.color(Color::DkBlue));
        assert_eq!(pm.pixel(3, 133), green);
        assert_eq!(pm.pixel(136, 70), green);
        assert_eq!(pm.pixel(237, 133), green);
        assert_eq!(pm.pixel(100, 134), pm.color(Color::DkBlue));
    }

    #[test]
    fn test_words_fill_columns() {
        let m = Machine::new(CpuKind::Z80);
        // word 1 of bank 0 is the second pixel of the first column
        m.write_byte(0, 4, 0x01);
        // word 128 starts the second column
        m.write_byte(0, 128 * 4, 0x02);
        // first word of bank 1
        m.write_byte(1, 0, 0x03);
        let pm = render(Depth::Rgb565, &m, 0.0, |f| {
            MemoryMap.draw(f, true);
            MemoryMap.draw(f, false);
        });
        assert_eq!(pm.pixel(6, 3), 0);
        assert_eq!(pm.pixel(6, 4), word_color(1));
        assert_eq!(pm.pixel(7, 3), word_color(2));
        assert_eq!(pm.pixel(139, 3), word_color(3));
        assert_eq!(pm.pixel(138, 3), pm.color(Color::DkBlue));
    }

    #[test]
    fn test_colors_fit_12_bits() {
        for w in [0, 1, 0xff, 0xdead_beef, u32::MAX] {
            assert!(word_color(w) <= 0x0fff);
        }
        assert_ne!(word_color(1), word_color(2));
    }

    #[test]
    fn test_heatmap_is_deterministic() {
        let m = Machine::default();
        for i in 0..4096 {
            m.write_byte(i % 2, i * 37 % 49152, (i * 13) as u8);
        }
        let mut s = MemoryMap;
        let frames = render(Depth::Rgb444, &m, 0.0, |f| {
            s.draw(f, true);
            s.draw(f, false);
        });
        let again = render(Depth::Rgb444, &m, 0.0, |f| {
            s.draw(f, true);
            s.draw(f, false);
            s.draw(f, false);
        });
        assert_eq!(frames.bits, again.bits);
    }
}
