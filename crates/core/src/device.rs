//! LCD controller boundary.
//!
//! The display task drives an [`LcdDevice`] and never looks behind it: on the
//! board that is the ST7789 over SPI/DMA with a PWM backlight, on the host a
//! window or a headless sink. Calls are assumed to succeed; a device that can
//! fail logs and carries on.

use std::sync::{Arc, Mutex, PoisonError};

use crate::pixmap::Pixmap;

pub trait LcdDevice: Send {
    /// Bring up the controller and the backlight.
    fn init(&mut self);
    /// Turn the backlight off and release the controller.
    fn exit(&mut self);
    /// Backlight level in percent; values above 100 are ignored.
    fn backlight(&mut self, percent: u8);
    /// Rotate the image by 180 degrees.
    fn rotate(&mut self, rotated: bool);
    /// Transfer a complete frame.
    fn send_frame(&mut self, pixmap: &Pixmap);
}

/// What a [`NullDevice`] has been asked to do.
#[derive(Debug, Default, Clone)]
pub struct DeviceLog {
    pub inits: usize,
    pub exits: usize,
    pub frames: usize,
    /// Frames sent after `exit`
    pub late_frames: usize,
    pub backlight: Option<u8>,
    pub rotated: bool,
    pub last_frame: Option<Pixmap>,
}

/// Device that only records the calls it receives. Clones share one log, so
/// a test can keep a handle after boxing the device into the task.
#[derive(Clone, Default)]
pub struct NullDevice {
    log: Arc<Mutex<DeviceLog>>,
}

impl NullDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> DeviceLog {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn with<R>(&self, f: impl FnOnce(&mut DeviceLog) -> R) -> R {
        f(&mut self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl LcdDevice for NullDevice {
    fn init(&mut self) {
        self.with(|l| l.inits += 1);
    }

    fn exit(&mut self) {
        self.with(|l| l.exits += 1);
    }

    fn backlight(&mut self, percent: u8) {
        if percent <= 100 {
            self.with(|l| l.backlight = Some(percent));
        }
    }

    fn rotate(&mut self, rotated: bool) {
        self.with(|l| l.rotated = rotated);
    }

    fn send_frame(&mut self, pixmap: &Pixmap) {
        self.with(|l| {
            l.frames += 1;
            if l.exits > 0 {
                l.late_frames += 1;
            }
            l.last_frame = Some(pixmap.clone());
        });
    }
}
