//! Stand-in for the emulator core: a thread that keeps changing the machine
//! state so the status screens have something to show.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use picosim_lcd_core::machine::{BANK0_SIZE, BANK1_SIZE};
use picosim_lcd_core::{ByteReg, Color, Depth, Machine, PanelByte, WordReg};

/// Instructions "executed" between sleeps.
const BURST: u32 = 200;

const REGS: [ByteReg; 18] = [
    ByteReg::A,
    ByteReg::B,
    ByteReg::C,
    ByteReg::D,
    ByteReg::E,
    ByteReg::H,
    ByteReg::L,
    ByteReg::F,
    ByteReg::A_,
    ByteReg::B_,
    ByteReg::C_,
    ByteReg::D_,
    ByteReg::E_,
    ByteReg::H_,
    ByteReg::L_,
    ByteReg::F_,
    ByteReg::I,
    ByteReg::Iff,
];

/// Colors the board's RGB LED cycles through.
const LED_COLORS: [Color; 8] = [
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::White,
];

struct Xorshift(u32);

impl Xorshift {
    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

pub struct Exerciser {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Exerciser {
    /// `depth` is the pixmap format the LED color is stored in.
    pub fn start(machine: Arc<Machine>, depth: Depth, seed: u32) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let thread = std::thread::Builder::new()
            .name("cpu".into())
            .spawn(move || {
                let mut rng = Xorshift(seed | 1);
                machine.set_panel(PanelByte::CpuState, 1);
                while !flag.load(Ordering::Relaxed) {
                    for _ in 0..BURST {
                        step(&machine, depth, &mut rng);
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
                machine.set_panel(PanelByte::CpuState, 0);
            })?;
        Ok(Exerciser { stop, thread: Some(thread) })
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

impl Drop for Exerciser {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One pseudo instruction: fetch, touch a register or memory, maybe I/O.
fn step(m: &Machine, depth: Depth, rng: &mut Xorshift) {
    let r = rng.next();
    let pc = m.word(WordReg::Pc).wrapping_add(1 + (r & 3) as u16);
    m.set_word(WordReg::Pc, pc);
    m.set_led_address(pc);

    let reg = REGS[(r >> 8) as usize % REGS.len()];
    m.set_byte(reg, (r >> 16) as u8);
    let refresh = m.byte(ByteReg::R).wrapping_add(1) & 0x7f;
    m.set_byte(ByteReg::R, refresh);

    match (r >> 24) & 7 {
        0 => {
            // push/pop
            let sp = m.word(WordReg::Sp).wrapping_sub(2);
            m.set_word(WordReg::Sp, sp);
            m.write_byte(0, sp as usize, pc as u8);
        }
        1 => {
            let addr = rng.next() as usize % BANK0_SIZE;
            m.write_byte(0, addr, (r >> 4) as u8);
            m.set_panel(PanelByte::LedData, (r >> 4) as u8);
        }
        2 => {
            let addr = rng.next() as usize % BANK1_SIZE;
            m.write_byte(1, addr, (r >> 12) as u8);
        }
        3 => m.set_panel(PanelByte::LedOutput, !(r as u8)),
        4 => m.set_word(WordReg::Ix, (r >> 3) as u16),
        5 => m.set_word(WordReg::Iy, (r >> 7) as u16),
        _ => m.set_led_color(depth.raw(LED_COLORS[(r >> 10) as usize % LED_COLORS.len()])),
    }
    m.set_panel(PanelByte::CpuBus, 1 << ((r >> 27) & 7));
    m.set_panel(PanelByte::Wait, (r & 0x100 != 0) as u8);
}
