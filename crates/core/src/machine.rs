//! Emulation state as seen by the display.
//!
//! The emulation thread writes registers, front-panel signals and memory;
//! the display task samples them once per frame. All fields are relaxed
//! atomics with no lock: a frame may show a register pair half way through
//! an update, which is fine for a diagnostic view and keeps the emulator's
//! hot path free of synchronization.

use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU8, Ordering};

/// Flag register bits.
pub const S_FLAG: u8 = 0x80;
pub const Z_FLAG: u8 = 0x40;
pub const H_FLAG: u8 = 0x10;
pub const P_FLAG: u8 = 0x04;
pub const N_FLAG: u8 = 0x02;
pub const C_FLAG: u8 = 0x01;

/// Size of the first memory bank in bytes.
pub const BANK0_SIZE: usize = 65536;
/// Size of the second memory bank in bytes.
pub const BANK1_SIZE: usize = 49152;

/// Which CPU the emulator is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuKind {
    Z80,
    I8080,
}

/// 8-bit registers, primed names are the Z80 alternate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteReg {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    F,
    A_,
    B_,
    C_,
    D_,
    E_,
    H_,
    L_,
    F_,
    I,
    /// Low 7 bits of the refresh counter
    R,
    /// Refresh counter bit 7, as last loaded
    R_,
    /// Interrupt flip-flops, IFF1 in bit 0 and IFF2 in bit 1
    Iff,
}

const BYTE_REGS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordReg {
    Sp,
    Pc,
    Ix,
    Iy,
}

/// Front-panel signal bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelByte {
    /// Output port latch, active low
    LedOutput,
    /// 1 while the CPU is running
    CpuState,
    Wait,
    BusRequest,
    /// Status bus (MEMR, INP, M1, OUT, HLTA, STACK, WO, INTA)
    CpuBus,
    LedData,
}

const PANEL_BYTES: usize = 6;

pub struct Machine {
    cpu: AtomicU8,
    bytes: [AtomicU8; BYTE_REGS],
    words: [AtomicU16; 4],
    panel: [AtomicU8; PANEL_BYTES],
    led_address: AtomicU16,
    led_color: AtomicU16,
    bank0: Box<[AtomicU32]>,
    bank1: Box<[AtomicU32]>,
}

fn bank(bytes: usize) -> Box<[AtomicU32]> {
    (0..bytes / 4).map(|_| AtomicU32::new(0)).collect()
}

impl Machine {
    pub fn new(cpu: CpuKind) -> Self {
        Machine {
            cpu: AtomicU8::new(cpu as u8),
            bytes: std::array::from_fn(|_| AtomicU8::new(0)),
            words: std::array::from_fn(|_| AtomicU16::new(0)),
            panel: std::array::from_fn(|_| AtomicU8::new(0)),
            led_address: AtomicU16::new(0),
            led_color: AtomicU16::new(0),
            bank0: bank(BANK0_SIZE),
            bank1: bank(BANK1_SIZE),
        }
    }

    pub fn cpu(&self) -> CpuKind {
        match self.cpu.load(Ordering::Relaxed) {
            x if x == CpuKind::I8080 as u8 => CpuKind::I8080,
            _ => CpuKind::Z80,
        }
    }

    pub fn set_cpu(&self, cpu: CpuKind) {
        self.cpu.store(cpu as u8, Ordering::Relaxed);
    }

    #[inline]
    pub fn byte(&self, r: ByteReg) -> u8 {
        self.bytes[r as usize].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_byte(&self, r: ByteReg, v: u8) {
        self.bytes[r as usize].store(v, Ordering::Relaxed);
    }

    #[inline]
    pub fn word(&self, r: WordReg) -> u16 {
        self.words[r as usize].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_word(&self, r: WordReg, v: u16) {
        self.words[r as usize].store(v, Ordering::Relaxed);
    }

    #[inline]
    pub fn panel(&self, p: PanelByte) -> u8 {
        self.panel[p as usize].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_panel(&self, p: PanelByte, v: u8) {
        self.panel[p as usize].store(v, Ordering::Relaxed);
    }

    pub fn led_address(&self) -> u16 {
        self.led_address.load(Ordering::Relaxed)
    }

    pub fn set_led_address(&self, v: u16) {
        self.led_address.store(v, Ordering::Relaxed);
    }

    /// Color of the board's RGB LED, already in the pixmap's raw format.
    pub fn led_color(&self) -> u16 {
        self.led_color.load(Ordering::Relaxed)
    }

    pub fn set_led_color(&self, v: u16) {
        self.led_color.store(v, Ordering::Relaxed);
    }

    /// First memory bank as 32-bit words.
    pub fn bank0(&self) -> &[AtomicU32] {
        &self.bank0
    }

    /// Second memory bank as 32-bit words.
    pub fn bank1(&self) -> &[AtomicU32] {
        &self.bank1
    }

    /// Store one byte into bank 0 or 1. Out-of-range addresses are ignored.
    pub fn write_byte(&self, bank: usize, addr: usize, v: u8) {
        let words = match bank {
            0 => &self.bank0,
            1 => &self.bank1,
            _ => return,
        };
        let Some(w) = words.get(addr / 4) else {
            return;
        };
        let shift = (addr % 4) * 8;
        let mask = !(0xffu32 << shift);
        // single writer, so load/store is enough
        let old = w.load(Ordering::Relaxed);
        w.store((old & mask) | ((v as u32) << shift), Ordering::Relaxed);
    }
}

impl Default for Machine {
    fn default() -> Self {
        Machine::new(CpuKind::Z80)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_sizes() {
        let m = Machine::default();
        assert_eq!(m.bank0().len(), 16384);
        assert_eq!(m.bank1().len(), 12288);
    }

    #[test]
    fn test_write_byte_little_endian() {
        let m = Machine::default();
        m.write_byte(0, 0x100, 0x11);
        m.write_byte(0, 0x101, 0x22);
        m.write_byte(0, 0x103, 0x44);
        assert_eq!(m.bank0()[0x40].load(Ordering::Relaxed), 0x4400_2211);
        m.write_byte(1, BANK1_SIZE, 0xff);
        m.write_byte(2, 0, 0xff);
        assert!(m.bank1().iter().all(|w| w.load(Ordering::Relaxed) == 0));
    }

    #[test]
    fn test_registers() {
        let m = Machine::new(CpuKind::I8080);
        assert_eq!(m.cpu(), CpuKind::I8080);
        m.set_cpu(CpuKind::Z80);
        assert_eq!(m.cpu(), CpuKind::Z80);
        m.set_byte(ByteReg::H_, 0x5a);
        m.set_word(WordReg::Iy, 0xbeef);
        m.set_panel(PanelByte::CpuBus, 0x81);
        assert_eq!(m.byte(ByteReg::H_), 0x5a);
        assert_eq!(m.byte(ByteReg::H), 0);
        assert_eq!(m.word(WordReg::Iy), 0xbeef);
        assert_eq!(m.panel(PanelByte::CpuBus), 0x81);
    }
}
