//! Host stand-ins for the ST7789 panel.
//!
//! [`WindowDevice`] hands finished frames to the main thread, which owns the
//! minifb window. [`HeadlessDevice`] keeps the last frame for ASCII dumps.

use std::sync::{Arc, Mutex, PoisonError};

use picosim_lcd_core::{LcdDevice, Pixmap};

/// Panel state shared between the display task and the window.
pub struct PanelView {
    /// Last frame as 0x00RRGGBB, already dimmed and rotated
    pub pixels: Vec<u32>,
    pub last: Option<Pixmap>,
    pub brightness: u8,
    pub rotated: bool,
    pub on: bool,
    pub frames: u64,
}

pub type SharedView = Arc<Mutex<PanelView>>;

pub struct WindowDevice {
    view: SharedView,
}

impl WindowDevice {
    pub fn new(width: usize, height: usize) -> (Self, SharedView) {
        let view = Arc::new(Mutex::new(PanelView {
            pixels: vec![0; width * height],
            last: None,
            brightness: 0,
            rotated: false,
            on: false,
            frames: 0,
        }));
        (WindowDevice { view: view.clone() }, view)
    }

    fn with(&self, f: impl FnOnce(&mut PanelView)) {
        f(&mut self.view.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

/// Scale each channel of a `0x00RRGGBB` pixel by a backlight percentage.
fn dim(c: u32, percent: u8) -> u32 {
    let p = percent as u32;
    let ch = |shift: u32| (((c >> shift) & 0xff) * p / 100) << shift;
    ch(16) | ch(8) | ch(0)
}

fn render(view: &mut PanelView, pm: &Pixmap) {
    let (w, h) = (pm.width as usize, pm.height as usize);
    view.pixels.resize(w * h, 0);
    let level = if view.on { view.brightness } else { 0 };
    for y in 0..h {
        for x in 0..w {
            let c = dim(pm.depth.to_u32(pm.pixel(x as u16, y as u16)), level);
            let i = if view.rotated { (h - 1 - y) * w + (w - 1 - x) } else { y * w + x };
            view.pixels[i] = c;
        }
    }
}

impl LcdDevice for WindowDevice {
    fn init(&mut self) {
        self.with(|v| {
            v.on = true;
            v.brightness = 90;
        });
        tracing::info!("panel initialized");
    }

    fn exit(&mut self) {
        self.with(|v| {
            v.on = false;
            v.pixels.iter_mut().for_each(|p| *p = 0);
        });
        tracing::info!("panel off");
    }

    fn backlight(&mut self, percent: u8) {
        if percent > 100 {
            return;
        }
        self.with(|v| {
            v.brightness = percent;
            if let Some(pm) = v.last.take() {
                render(v, &pm);
                v.last = Some(pm);
            }
        });
    }

    fn rotate(&mut self, rotated: bool) {
        self.with(|v| {
            v.rotated = rotated;
            if let Some(pm) = v.last.take() {
                render(v, &pm);
                v.last = Some(pm);
            }
        });
    }

    fn send_frame(&mut self, pixmap: &Pixmap) {
        self.with(|v| {
            render(v, pixmap);
            v.last = Some(pixmap.clone());
            v.frames += 1;
        });
    }
}

/// Device for `--headless`: keeps the last frame and counts transfers.
#[derive(Clone, Default)]
pub struct HeadlessDevice {
    last: Arc<Mutex<Option<Pixmap>>>,
    frames: Arc<Mutex<u64>>,
}

impl HeadlessDevice {
    pub fn last_frame(&self) -> Option<Pixmap> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn frames(&self) -> u64 {
        *self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LcdDevice for HeadlessDevice {
    fn init(&mut self) {}

    fn exit(&mut self) {}

    fn backlight(&mut self, _percent: u8) {}

    fn rotate(&mut self, _rotated: bool) {}

    fn send_frame(&mut self, pixmap: &Pixmap) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(pixmap.clone());
        *self.frames.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }
}

/// Print a frame as half-block characters, two pixel rows per line and
/// every second column, lit where the pixel is brighter than half.
pub fn print_display(pm: &Pixmap) {
    let lit = |x: u16, y: u16| {
        if y >= pm.height {
            return false;
        }
        let (r, g, b) = pm.depth.to_rgb888(pm.pixel(x, y));
        (r as u32 + g as u32 + b as u32) / 3 > 128
    };
    let count = (0..pm.height)
        .flat_map(|y| (0..pm.width).map(move |x| (x, y)))
        .filter(|&(x, y)| lit(x, y))
        .count();
    println!("  ({} px lit)", count);
    for y in (0..pm.height).step_by(2) {
        let mut l = String::with_capacity(pm.width as usize / 2 + 4);
        l.push_str("  |");
        for x in (0..pm.width).step_by(2) {
            l.push(match (lit(x, y), lit(x, y + 1)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                _ => ' ',
            });
        }
        l.push('|');
        println!("{}", l);
    }
}
