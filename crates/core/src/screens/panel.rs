//! Front-panel lamps: output port, machine state, status bus, data bus and
//! address bus, 16 lamps per row in banks of 8.

use super::{Frame, InfoLine, Screen};
use crate::color::Color;
use crate::font::font12;
use crate::machine::{ByteReg, Machine, PanelByte};

const PXOFF: u16 = 6;
const PYOFF: u16 = 6;
/// font12 width
const PFNTW: u16 = 6;
/// font12 height
const PFNTH: u16 = 12;
/// Label width, two characters minus the trailing letter spacing
const PLBLW: u16 = 2 * PFNTW - 1;
const PLBLS: u16 = 2;
const PLEDS: u16 = 3;
/// Gap between banks of 8
const PLEDBS: u16 = 6;
const PLEDD: u16 = 10;
const PLEDXO: u16 = (PLBLW - PLEDD + 1) / 2;
const PLEDYO: u16 = PFNTH + PLBLS;
const PLEDHO: u16 = PLBLW + PLEDS;
const PLEDVO: u16 = 3 * PFNTH;

const fn lx(x: u16) -> u16 {
    PXOFF + PLEDXO + PLEDBS * (x / 8) + PLEDHO * x
}

const fn ly(y: u16) -> u16 {
    PYOFF + PLEDYO + PLEDVO * y
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Panel(PanelByte),
    Reg(ByteReg),
}

#[derive(Debug, Clone, Copy)]
enum Bit {
    /// Lit when `(value ^ invert) & mask` is non-zero
    Byte { src: Source, invert: u8, mask: u8 },
    /// Address bus bit
    Address(u16),
}

#[derive(Debug, Clone, Copy)]
struct Led {
    x: u16,
    y: u16,
    label: [u8; 2],
    bit: Bit,
}

const fn byte_led(col: u16, row: u16, label: &[u8; 2], src: Source, invert: u8, mask: u8) -> Led {
    Led { x: lx(col), y: ly(row), label: *label, bit: Bit::Byte { src, invert, mask } }
}

const fn address_led(col: u16, label: &[u8; 2]) -> Led {
    Led { x: lx(col), y: ly(2), label: *label, bit: Bit::Address(1 << (15 - col)) }
}

const OUT: Source = Source::Panel(PanelByte::LedOutput);
const BUS: Source = Source::Panel(PanelByte::CpuBus);
const DATA: Source = Source::Panel(PanelByte::LedData);

static LEDS: [Led; 44] = [
    byte_led(0, 0, b"P7", OUT, 0xff, 0x80),
    byte_led(1, 0, b"P6", OUT, 0xff, 0x40),
    byte_led(2, 0, b"P5", OUT, 0xff, 0x20),
    byte_led(3, 0, b"P4", OUT, 0xff, 0x10),
    byte_led(4, 0, b"P3", OUT, 0xff, 0x08),
    byte_led(5, 0, b"P2", OUT, 0xff, 0x04),
    byte_led(6, 0, b"P1", OUT, 0xff, 0x02),
    byte_led(7, 0, b"P0", OUT, 0xff, 0x01),
    byte_led(12, 0, b"IE", Source::Reg(ByteReg::Iff), 0, 0x01),
    byte_led(13, 0, b"RU", Source::Panel(PanelByte::CpuState), 0, 0x01),
    byte_led(14, 0, b"WA", Source::Panel(PanelByte::Wait), 0, 0x01),
    byte_led(15, 0, b"HO", Source::Panel(PanelByte::BusRequest), 0, 0x01),
    byte_led(0, 1, b"MR", BUS, 0, 0x80),
    byte_led(1, 1, b"IP", BUS, 0, 0x40),
    byte_led(2, 1, b"M1", BUS, 0, 0x20),
    byte_led(3, 1, b"OP", BUS, 0, 0x10),
    byte_led(4, 1, b"HA", BUS, 0, 0x08),
    byte_led(5, 1, b"ST", BUS, 0, 0x04),
    byte_led(6, 1, b"WO", BUS, 0, 0x02),
    byte_led(7, 1, b"IA", BUS, 0, 0x01),
    byte_led(8, 1, b"D7", DATA, 0, 0x80),
    byte_led(9, 1, b"D6", DATA, 0, 0x40),
    byte_led(10, 1, b"D5", DATA, 0, 0x20),
    byte_led(11, 1, b"D4", DATA, 0, 0x10),
    byte_led(12, 1, b"D3", DATA, 0, 0x08),
    byte_led(13, 1, b"D2", DATA, 0, 0x04),
    byte_led(14, 1, b"D1", DATA, 0, 0x02),
    byte_led(15, 1, b"D0", DATA, 0, 0x01),
    address_led(0, b"15"),
    address_led(1, b"14"),
    address_led(2, b"13"),
    address_led(3, b"12"),
    address_led(4, b"11"),
    address_led(5, b"10"),
    address_led(6, b"A9"),
    address_led(7, b"A8"),
    address_led(8, b"A7"),
    address_led(9, b"A6"),
    address_led(10, b"A5"),
    address_led(11, b"A4"),
    address_led(12, b"A3"),
    address_led(13, b"A2"),
    address_led(14, b"A1"),
    address_led(15, b"A0"),
];

impl Bit {
    fn lit(self, m: &Machine) -> bool {
        match self {
            Bit::Byte { src, invert, mask } => {
                let v = match src {
                    Source::Panel(p) => m.panel(p),
                    Source::Reg(r) => m.byte(r),
                };
                (v ^ invert) & mask != 0
            }
            Bit::Address(mask) => m.led_address() & mask != 0,
        }
    }
}

pub struct Panel {
    info: InfoLine,
}

impl Panel {
    pub fn new(product: &str, rate: u32) -> Self {
        Panel { info: InfoLine::new(product, rate) }
    }
}

impl Screen for Panel {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        let pm = &mut *frame.pixmap;
        if first {
            let (white, dkblue) = (pm.color(Color::White), pm.color(Color::DkBlue));
            pm.clear(dkblue);
            for led in &LEDS {
                let (x, y) = (led.x - PLEDXO, led.y - PLEDYO);
                pm.draw_char(x, y, led.label[0], font12(), white, dkblue);
                pm.draw_char(x + PFNTW, y, led.label[1], font12(), white, dkblue);
                // active low
                if &led.label == b"WO" {
                    pm.draw_hline(x, y - 2, PLBLW, white);
                }
                pm.led_bracket(led.x, led.y);
            }
            self.info.draw_static(pm);
        } else {
            let (red, dkred) = (pm.color(Color::Red), pm.color(Color::DkRed));
            for led in &LEDS {
                let color = if led.bit.lit(frame.machine) { red } else { dkred };
                pm.draw_led(led.x, led.y, color);
            }
            self.info.draw_dynamic(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Depth;
    use crate::pixmap::Pixmap;
    use crate::screens::tests::render;

    fn led_color(pm: &Pixmap, col: u16, row: u16) -> u16 {
        pm.pixel(lx(col) + 4, ly(row) + 4)
    }

    fn frames(m: &Machine) -> Pixmap {
        let mut s = Panel::new("Z80pack", 30);
        render(Depth::Rgb444, m, 25.0, |f| {
            s.draw(f, true);
            s.draw(f, false);
        })
    }

    #[test]
    fn test_layout() {
        assert_eq!(lx(0), 7);
        assert_eq!(lx(7), 7 + 98);
        assert_eq!(lx(8), 7 + 6 + 112);
        assert_eq!(lx(15), 7 + 6 + 210);
        assert_eq!((ly(0), ly(1), ly(2)), (20, 56, 92));
        // last lamp ends inside the panel
        assert!(lx(15) + 10 <= 240);
    }

    #[test]
    fn test_output_port_is_active_low() {
        let m = Machine::default();
        m.set_panel(PanelByte::LedOutput, 0x7f);
        let pm = frames(&m);
        let (red, dkred) = (pm.color(Color::Red), pm.color(Color::DkRed));
        assert_eq!(led_color(&pm, 0, 0), red);
        for col in 1..8 {
            assert_eq!(led_color(&pm, col, 0), dkred);
        }
    }

    #[test]
    fn test_status_and_data() {
        let m = Machine::default();
        m.set_panel(PanelByte::LedOutput, 0xff);
        m.set_panel(PanelByte::CpuState, 1);
        m.set_panel(PanelByte::CpuBus, 0x22);
        m.set_panel(PanelByte::LedData, 0x81);
        m.set_byte(ByteReg::Iff, 3);
        let pm = frames(&m);
        let (red, dkred) = (pm.color(Color::Red), pm.color(Color::DkRed));
        assert_eq!(led_color(&pm, 12, 0), red);
        assert_eq!(led_color(&pm, 13, 0), red);
        assert_eq!(led_color(&pm, 14, 0), dkred);
        assert_eq!(led_color(&pm, 15, 0), dkred);
        assert_eq!(led_color(&pm, 2, 1), red); // M1
        assert_eq!(led_color(&pm, 6, 1), red); // WO
        assert_eq!(led_color(&pm, 7, 1), dkred);
        assert_eq!(led_color(&pm, 8, 1), red);
        assert_eq!(led_color(&pm, 9, 1), dkred);
        assert_eq!(led_color(&pm, 15, 1), red);
    }

    #[test]
    fn test_address_bus() {
        let m = Machine::default();
        m.set_led_address(0x8001);
        let pm = frames(&m);
        let (red, dkred) = (pm.color(Color::Red), pm.color(Color::DkRed));
        assert_eq!(led_color(&pm, 0, 2), red);
        for col in 1..15 {
            assert_eq!(led_color(&pm, col, 2), dkred);
        }
        assert_eq!(led_color(&pm, 15, 2), red);
    }

    #[test]
    fn test_labels_and_overbar() {
        let m = Machine::default();
        let pm = frames(&m);
        let white = pm.color(Color::White);
        let (x, y) = (lx(6) - PLEDXO, ly(1) - PLEDYO);
        // overbar above WO only
        assert_eq!(pm.pixel(x, y - 2), white);
        assert_eq!(pm.pixel(x + PLBLW - 1, y - 2), white);
        assert_eq!(pm.pixel(lx(5) - PLEDXO, y - 2), pm.color(Color::DkBlue));

        let mut expect = Pixmap::new(240, 135, Depth::Rgb444);
        let dkblue = expect.color(Color::DkBlue);
        expect.draw_char(x, y, b'W', font12(), white, dkblue);
        for j in 0..12 {
            for i in 0..6 {
                assert_eq!(pm.pixel(x + i, y + j), expect.pixel(x + i, y + j));
            }
        }
    }
}
