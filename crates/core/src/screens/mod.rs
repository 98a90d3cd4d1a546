//! Display screens.
//!
//! Every screen draws in two phases. With `first` set it clears the pixmap
//! and draws everything that does not change: labels, grid lines, frames.
//! Without it only the live values are redrawn. The display task passes
//! `first` on the frame after a screen is selected; a screen may also decide
//! by itself to redraw its static content (the register screen does when the
//! CPU changes).

pub mod banner;
pub mod cpu_regs;
pub mod empty;
pub mod memory;
pub mod panel;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::font::font20;
use crate::machine::Machine;
use crate::pixmap::Pixmap;
use crate::sensor::{centidegrees, TemperatureSensor};

pub use banner::Banner;
pub use cpu_regs::CpuRegs;
pub use empty::Empty;
pub use memory::MemoryMap;
pub use panel::Panel;

/// Everything a screen may look at while drawing one frame.
pub struct Frame<'a> {
    pub pixmap: &'a mut Pixmap,
    pub machine: &'a Machine,
    pub sensor: &'a mut dyn TemperatureSensor,
}

/// A two-phase renderer.
pub trait Screen: Send {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool);
}

impl<F> Screen for F
where
    F: FnMut(&mut Frame<'_>, bool) + Send,
{
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        self(frame, first)
    }
}

/// The built-in status screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusScreen {
    Registers,
    Panel,
    Memory,
}

impl Default for StatusScreen {
    fn default() -> Self {
        StatusScreen::Registers
    }
}

/// Fires once every `rate` ticks.
#[derive(Debug, Clone)]
pub struct Cadence {
    rate: u32,
    count: u32,
}

impl Cadence {
    pub fn new(rate: u32) -> Self {
        Cadence { rate: rate.max(1), count: 0 }
    }

    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.rate {
            self.count = 0;
            true
        } else {
            false
        }
    }

    /// Make the next tick fire.
    pub fn force(&mut self) {
        self.count = self.rate - 1;
    }
}

/// Info line x pixel offset
const IXOFF: u16 = 5;
/// Columns of the temperature digits, least significant first
const TEMP_COLS: [u16; 4] = [21, 20, 18, 17];
const LED_COL: u16 = 15;

/// Bottom line of the register and panel screens:
///
/// ```text
/// 01234567890123456789012
/// Z80pack x.x    o xx.xxC
/// ```
///
/// The lamp mirrors the board's RGB LED every frame; the temperature is
/// refreshed once per second.
pub struct InfoLine {
    product: String,
    temp: Cadence,
}

impl InfoLine {
    /// `rate` is the frame rate, so the temperature updates once a second.
    pub fn new(product: &str, rate: u32) -> Self {
        InfoLine { product: product.to_string(), temp: Cadence::new(rate) }
    }

    fn col(c: u16) -> u16 {
        c * font20().width + IXOFF
    }

    fn y(pm: &Pixmap) -> u16 {
        pm.height - font20().height
    }

    pub fn draw_static(&mut self, pm: &mut Pixmap) {
        let font = font20();
        let y = Self::y(pm);
        let (fg, bg) = (pm.color(Color::Orange), pm.color(Color::DkBlue));
        for (i, c) in self.product.bytes().take(12).enumerate() {
            pm.draw_char(Self::col(i as u16), y, c, font, fg, bg);
        }
        pm.draw_char(Self::col(19), y, b'.', font, fg, bg);
        pm.draw_char(Self::col(22), y, b'C', font, fg, bg);
        pm.led_bracket(Self::col(LED_COL), y + 5);
        self.temp.force();
    }

    pub fn draw_dynamic(&mut self, frame: &mut Frame<'_>) {
        let pm = &mut *frame.pixmap;
        let y = Self::y(pm);
        if self.temp.tick() {
            let mut t = centidegrees(frame.sensor.read_celsius()) % 10000;
            let (fg, bg) = (pm.color(Color::Orange), pm.color(Color::DkBlue));
            for col in TEMP_COLS {
                pm.draw_char(Self::col(col), y, b'0' + (t % 10) as u8, font20(), fg, bg);
                t /= 10;
            }
        }
        pm.draw_led(Self::col(LED_COL), y + 5, frame.machine.led_color());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::color::Depth;
    use crate::machine::CpuKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Run `draw` against a fresh 240x135 pixmap and return it.
    pub(crate) fn render(
        depth: Depth,
        machine: &Machine,
        temp: f32,
        mut draw: impl FnMut(&mut Frame<'_>),
    ) -> Pixmap {
        let mut pm = Pixmap::new(240, 135, depth);
        let mut sensor = move || temp;
        let mut frame = Frame { pixmap: &mut pm, machine, sensor: &mut sensor };
        draw(&mut frame);
        pm
    }

    #[test]
    fn test_cadence() {
        let mut c = Cadence::new(60);
        for _ in 0..59 {
            assert!(!c.tick());
        }
        assert!(c.tick()); // 60th tick
    }

    #[test]
    fn test_cadence_once_per_rate() {
        let mut c = Cadence::new(60);
        let fired = (0..119).filter(|_| c.tick()).count();
        assert_eq!(fired, 1);
        assert!(c.tick()); // tick 120
    }

    #[test]
    fn test_cadence_force() {
        let mut c = Cadence::new(30);
        c.tick();
        c.force();
        assert!(c.tick());
        assert!(!c.tick());
    }

    #[test]
    fn test_info_line_temperature() {
        let m = Machine::new(CpuKind::Z80);
        let reads = AtomicU32::new(0);
        let pm = render(Depth::Rgb565, &m, 0.0, |f| {
            let mut info = InfoLine::new("Z80pack 1.0", 60);
            info.draw_static(f.pixmap);
            let mut sensor = || {
                reads.fetch_add(1, Ordering::Relaxed);
                23.45f32
            };
            let mut frame = Frame { pixmap: &mut *f.pixmap, machine: f.machine, sensor: &mut sensor };
            for _ in 0..60 {
                info.draw_dynamic(&mut frame);
            }
        });
        // forced on the first tick, the next read is due on tick 61
        assert_eq!(reads.load(Ordering::Relaxed), 1);

        let mut expect = Pixmap::new(240, 135, Depth::Rgb565);
        let (fg, bg) = (expect.color(Color::Orange), expect.color(Color::DkBlue));
        for (col, c) in [(17, b'2'), (18, b'3'), (19, b'.'), (20, b'4'), (21, b'5'), (22, b'C')] {
            expect.draw_char(InfoLine::col(col), 115, c, font20(), fg, bg);
        }
        // column 16 is left alone
        for col in 16..23 {
            let x = InfoLine::col(col);
            for y in 115..135 {
                for dx in 0..10 {
                    assert_eq!(pm.pixel(x + dx, y), expect.pixel(x + dx, y), "column {}", col);
                }
            }
        }
    }

    #[test]
    fn test_info_line_temperature_wraps_above_100() {
        let m = Machine::new(CpuKind::Z80);
        let pm = render(Depth::Rgb444, &m, 123.45, |f| {
            let mut info = InfoLine::new("Z80pack 1.0", 30);
            info.draw_static(f.pixmap);
            info.draw_dynamic(f);
        });
        let mut expect = Pixmap::new(240, 135, Depth::Rgb444);
        let (fg, bg) = (expect.color(Color::Orange), expect.color(Color::DkBlue));
        for (col, c) in [(17, b'2'), (18, b'3'), (20, b'4'), (21, b'5')] {
            expect.draw_char(InfoLine::col(col), 115, c, font20(), fg, bg);
        }
        for col in [16, 17, 18, 20, 21] {
            let x = InfoLine::col(col);
            for y in 115..135 {
                for dx in 0..10 {
                    assert_eq!(pm.pixel(x + dx, y), expect.pixel(x + dx, y), "column {}", col);
                }
            }
        }
    }

    #[test]
    fn test_info_line_led_follows_machine() {
        let m = Machine::new(CpuKind::Z80);
        m.set_led_color(0x0f0f);
        let pm = render(Depth::Rgb444, &m, 20.0, |f| {
            let mut info = InfoLine::new("x", 30);
            info.draw_static(f.pixmap);
            info.draw_dynamic(f);
        });
        let x = InfoLine::col(LED_COL);
        assert_eq!(pm.pixel(x + 4, 115 + 5 + 4), 0x0f0f);
        assert_eq!(pm.pixel(x + 4, 115 + 5), pm.color(Color::Gray));
    }
}
