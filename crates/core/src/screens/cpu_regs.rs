//! CPU register screen.
//!
//! Z80 in the 10 x 20 font:
//!
//! ```text
//!   01234567890123456789012
//! 0 A  12   BC 1234 DE 1234
//! 1 HL 1234 SP 1234 PC 1234
//! 2 IX 1234 IY 1234 AF'1234
//! 3 BC'1234 DE'1234 HL'1234
//! 4 F  SZHPNC  IF12 IR 1234
//! ```
//!
//! 8080 in the 14 x 28 font:
//!
//! ```text
//!   0123456789012345
//! 0 A  12    BC 1234
//! 1 DE 1234  HL 1234
//! 2 SP 1234  PC 1234
//! 3 F  SZHPC    IF 1
//! ```
//!
//! Register values are hex, written right to left from the entry's column.
//! Flags are green when set and red when clear.

use super::{Frame, InfoLine, Screen};
use crate::color::Color;
use crate::font::{font20, font28, Font};
use crate::grid::Grid;
use crate::machine::{
    ByteReg, CpuKind, Machine, WordReg, C_FLAG, H_FLAG, N_FLAG, P_FLAG, S_FLAG, Z_FLAG,
};
use crate::pixmap::Pixmap;

#[derive(Debug, Clone, Copy)]
enum Field {
    Byte(ByteReg),
    Word(WordReg),
    /// Bit of F
    Flag(u8, u8),
    /// Lit only when every bit of the mask is set in IFF
    IntEnable(u8, u8),
    /// F'
    AltFlags,
    /// R with bit 7 from R'
    Refresh,
}

#[derive(Debug, Clone, Copy)]
struct Reg {
    x: u16,
    y: u16,
    label: Option<&'static str>,
    field: Field,
}

const fn reg(x: u16, y: u16, label: Option<&'static str>, field: Field) -> Reg {
    Reg { x, y, label, field }
}

struct Profile {
    font: fn() -> &'static Font,
    xoff: u16,
    yoff: u16,
    spc: u16,
    /// (column, row, rows)
    vlines: &'static [(u16, u16, u16)],
    /// Rows getting a full-width line in the static phase
    hlines: &'static [u16],
    /// Full-width line redrawn every frame after the info line
    hline_dynamic: Option<u16>,
    regs: &'static [Reg],
}

use Field::*;

static Z80_REGS: [Reg; 29] = [
    reg(4, 0, Some("A"), Byte(ByteReg::A)),
    reg(12, 0, Some("BC"), Byte(ByteReg::B)),
    reg(14, 0, None, Byte(ByteReg::C)),
    reg(20, 0, Some("DE"), Byte(ByteReg::D)),
    reg(22, 0, None, Byte(ByteReg::E)),
    reg(4, 1, Some("HL"), Byte(ByteReg::H)),
    reg(6, 1, None, Byte(ByteReg::L)),
    reg(14, 1, Some("SP"), Word(WordReg::Sp)),
    reg(22, 1, Some("PC"), Word(WordReg::Pc)),
    reg(6, 2, Some("IX"), Word(WordReg::Ix)),
    reg(14, 2, Some("IY"), Word(WordReg::Iy)),
    reg(20, 2, Some("AF'"), Byte(ByteReg::A_)),
    reg(22, 2, None, AltFlags),
    reg(4, 3, Some("BC'"), Byte(ByteReg::B_)),
    reg(6, 3, None, Byte(ByteReg::C_)),
    reg(12, 3, Some("DE'"), Byte(ByteReg::D_)),
    reg(14, 3, None, Byte(ByteReg::E_)),
    reg(20, 3, Some("HL'"), Byte(ByteReg::H_)),
    reg(22, 3, None, Byte(ByteReg::L_)),
    reg(3, 4, None, Flag(b'S', S_FLAG)),
    reg(4, 4, Some("F"), Flag(b'Z', Z_FLAG)),
    reg(5, 4, None, Flag(b'H', H_FLAG)),
    reg(6, 4, None, Flag(b'P', P_FLAG)),
    reg(7, 4, None, Flag(b'N', N_FLAG)),
    reg(8, 4, None, Flag(b'C', C_FLAG)),
    reg(13, 4, None, IntEnable(b'1', 1)),
    reg(14, 4, Some("IF"), IntEnable(b'2', 2)),
    reg(20, 4, Some("IR"), Byte(ByteReg::I)),
    reg(22, 4, None, Refresh),
];

static I8080_REGS: [Reg; 15] = [
    reg(4, 0, Some("A"), Byte(ByteReg::A)),
    reg(13, 0, Some("BC"), Byte(ByteReg::B)),
    reg(15, 0, None, Byte(ByteReg::C)),
    reg(4, 1, Some("DE"), Byte(ByteReg::D)),
    reg(6, 1, None, Byte(ByteReg::E)),
    reg(13, 1, Some("HL"), Byte(ByteReg::H)),
    reg(15, 1, None, Byte(ByteReg::L)),
    reg(6, 2, Some("SP"), Word(WordReg::Sp)),
    reg(15, 2, Some("PC"), Word(WordReg::Pc)),
    reg(3, 3, None, Flag(b'S', S_FLAG)),
    reg(4, 3, Some("F"), Flag(b'Z', Z_FLAG)),
    reg(5, 3, None, Flag(b'H', H_FLAG)),
    reg(6, 3, None, Flag(b'P', P_FLAG)),
    reg(7, 3, None, Flag(b'C', C_FLAG)),
    reg(15, 3, Some("IF"), IntEnable(b'1', 3)),
];

static Z80: Profile = Profile {
    font: font20,
    xoff: 5,
    yoff: 0,
    spc: 3,
    vlines: &[(7, 0, 4), (10, 4, 1), (15, 0, 5)],
    hlines: &[1, 2, 3, 4, 5],
    hline_dynamic: None,
    regs: &Z80_REGS,
};

// the row 4 line overlaps the info line's top pixel row
static I8080: Profile = Profile {
    font: font28,
    xoff: 8,
    yoff: 0,
    spc: 1,
    vlines: &[(8, 0, 4)],
    hlines: &[1, 2, 3],
    hline_dynamic: Some(4),
    regs: &I8080_REGS,
};

fn profile(cpu: CpuKind) -> &'static Profile {
    match cpu {
        CpuKind::Z80 => &Z80,
        CpuKind::I8080 => &I8080,
    }
}

fn hex_digit(n: u16) -> u8 {
    let n = (n & 0xf) as u8;
    if n < 10 {
        b'0' + n
    } else {
        b'A' + n - 10
    }
}

pub struct CpuRegs {
    info: InfoLine,
    /// CPU the static content was drawn for
    cpu: Option<CpuKind>,
    grid: Option<Grid>,
}

impl CpuRegs {
    pub fn new(product: &str, rate: u32) -> Self {
        CpuRegs { info: InfoLine::new(product, rate), cpu: None, grid: None }
    }

    fn draw_static(&mut self, pm: &mut Pixmap, p: &Profile) -> Grid {
        let dkblue = pm.color(Color::DkBlue);
        pm.clear(dkblue);

        let grid = Grid::new(pm, (p.font)(), p.xoff, p.yoff, p.spc, 0, 0);
        let line = pm.color(Color::DkYellow);
        for &(x, y, h) in p.vlines {
            grid.draw_vline(pm, x, y, h, line);
        }
        for &y in p.hlines {
            grid.draw_hline(pm, 0, y, grid.cols, line);
        }

        let white = pm.color(Color::White);
        for r in p.regs {
            let Some(label) = r.label else { continue };
            let mut x = r.x - if matches!(r.field, Word(_)) { 6 } else { 4 };
            if matches!(r.field, IntEnable(..)) {
                x += 1;
            }
            grid.draw_string(pm, x, r.y, label, white, dkblue);
        }

        self.info.draw_static(pm);
        grid
    }

    fn draw_values(pm: &mut Pixmap, grid: &Grid, p: &Profile, m: &Machine) {
        let (green, red, dkblue) = (pm.color(Color::Green), pm.color(Color::Red), pm.color(Color::DkBlue));
        for r in p.regs {
            let (w, digits) = match r.field {
                Byte(b) => (m.byte(b) as u16, 2),
                Word(w) => (m.word(w), 4),
                Flag(c, mask) => {
                    let fg = if m.byte(ByteReg::F) & mask != 0 { green } else { red };
                    grid.draw_char(pm, r.x, r.y, c, fg, dkblue);
                    continue;
                }
                IntEnable(c, mask) => {
                    let fg = if m.byte(ByteReg::Iff) & mask == mask { green } else { red };
                    grid.draw_char(pm, r.x, r.y, c, fg, dkblue);
                    continue;
                }
                AltFlags => (m.byte(ByteReg::F_) as u16, 2),
                Refresh => (((m.byte(ByteReg::R_) & 0x80) | (m.byte(ByteReg::R) & 0x7f)) as u16, 2),
            };
            for i in 0..digits {
                grid.draw_char(pm, r.x - i, r.y, hex_digit(w >> (4 * i)), green, dkblue);
            }
        }
    }
}

impl Screen for CpuRegs {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        let cpu = frame.machine.cpu();
        let first = first || self.cpu != Some(cpu);
        if self.cpu != Some(cpu) {
            tracing::debug!("register screen: redrawing for {:?}", cpu);
            self.cpu = Some(cpu);
        }
        let p = profile(cpu);

        if first {
            self.grid = Some(self.draw_static(frame.pixmap, p));
            return;
        }
        let Some(grid) = self.grid else { return };
        Self::draw_values(frame.pixmap, &grid, p, frame.machine);
        self.info.draw_dynamic(frame);
        if let Some(y) = p.hline_dynamic {
            let line = frame.pixmap.color(Color::DkYellow);
            grid.draw_hline(frame.pixmap, 0, y, grid.cols, line);
        }
    }
}
