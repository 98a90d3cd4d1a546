//! The display task and its foreground handle.
//!
//! [`DisplayTask`] runs on its own thread, standing in for the board's second
//! core. Every frame it draws the selected screen into its pixmap and sends
//! the pixmap to the device. The foreground talks to it only through a
//! [`Display`] handle: selecting screens and touching the device both take
//! the shared mutex, which the task also holds while a frame is transferred.
//!
//! Shutdown is a handshake. The foreground clears the selection; at the top
//! of its next frame the task clears the screen, sends that last frame,
//! closes the device and raises `done`. The foreground polls `done` and then
//! joins the thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::color::Color;
use crate::config::DisplayConfig;
use crate::device::LcdDevice;
use crate::error::Result;
use crate::machine::Machine;
use crate::pixmap::Pixmap;
use crate::screens::{CpuRegs, Empty, Frame, MemoryMap, Panel, Screen, StatusScreen};
use crate::sensor::TemperatureSensor;
use crate::{LCD_HEIGHT, LCD_WIDTH};

/// Poll interval while waiting for the task to finish.
const SHUTDOWN_POLL: Duration = Duration::from_millis(20);

/// Screen the task should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selected {
    Empty,
    /// Installed custom screen, numbered so that installing a new one is
    /// always seen as a change
    Custom(u64),
    Status(StatusScreen),
}

struct Inner {
    device: Box<dyn LcdDevice>,
    /// `None` asks the task to shut down
    selected: Option<Selected>,
    status: StatusScreen,
    shows_status: bool,
    panel: bool,
    next_custom: u64,
    /// Custom screen waiting to be picked up by the task
    custom: Option<(u64, Box<dyn Screen>)>,
}

struct Shared {
    inner: Mutex<Inner>,
    done: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Result of one [`DisplayTask::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    Continue,
    Stopped,
}

/// The refresh loop and everything only it touches.
pub struct DisplayTask {
    shared: Arc<Shared>,
    pixmap: Pixmap,
    machine: Arc<Machine>,
    sensor: Box<dyn TemperatureSensor>,
    empty: Empty,
    regs: CpuRegs,
    panel: Panel,
    memory: MemoryMap,
    custom: Option<(u64, Box<dyn Screen>)>,
    /// Screen drawn on the previous frame
    current: Option<Selected>,
    first: bool,
    stopped: bool,
    interval: Duration,
    brightness: u8,
    rotated: bool,
}

impl DisplayTask {
    /// Draw and send one frame, or run the shutdown step if it was requested.
    pub fn tick(&mut self) -> TickState {
        if self.stopped {
            return TickState::Stopped;
        }

        let selected = {
            let mut inner = self.shared.lock();
            if let Some(custom) = inner.custom.take() {
                self.custom = Some(custom);
            }
            inner.selected
        };

        let Some(selected) = selected else {
            self.drain();
            return TickState::Stopped;
        };

        if self.current != Some(selected) {
            tracing::debug!("display: switching to {:?}", selected);
            self.current = Some(selected);
            self.first = true;
        }
        let first = std::mem::replace(&mut self.first, false);

        let mut frame = Frame {
            pixmap: &mut self.pixmap,
            machine: &self.machine,
            sensor: &mut *self.sensor,
        };
        let screen: &mut dyn Screen = match selected {
            Selected::Empty => &mut self.empty,
            Selected::Status(StatusScreen::Registers) => &mut self.regs,
            Selected::Status(StatusScreen::Panel) => &mut self.panel,
            Selected::Status(StatusScreen::Memory) => &mut self.memory,
            Selected::Custom(id) => match &mut self.custom {
                Some((cid, screen)) if *cid == id => screen.as_mut(),
                _ => &mut self.empty,
            },
        };
        screen.draw(&mut frame, first);

        self.shared.lock().device.send_frame(&self.pixmap);
        TickState::Continue
    }

    /// Final frame: blank the panel, send it once, close the device.
    fn drain(&mut self) {
        let black = self.pixmap.color(Color::Black);
        self.pixmap.clear(black);
        {
            let mut inner = self.shared.lock();
            inner.device.send_frame(&self.pixmap);
            inner.device.exit();
        }
        self.stopped = true;
        self.shared.done.store(true, Ordering::Release);
    }

    /// Initialize the device and apply the configured backlight and
    /// rotation. [`DisplayTask::run`] does this before its first frame; a
    /// caller driving [`DisplayTask::tick`] itself calls it once up front.
    pub fn bring_up(&mut self) {
        let mut inner = self.shared.lock();
        inner.device.init();
        inner.device.backlight(self.brightness);
        inner.device.rotate(self.rotated);
    }

    /// Run frames at the configured rate until shut down.
    ///
    /// A frame that takes longer than its slot is followed by the next one
    /// immediately; the effective rate drops but nothing else happens.
    pub fn run(mut self) {
        self.bring_up();
        tracing::info!("display task started, {:?} per frame", self.interval);

        loop {
            let start = Instant::now();
            if self.tick() == TickState::Stopped {
                break;
            }
            let elapsed = start.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            } else {
                tracing::trace!("display: frame overrun ({:?})", elapsed);
            }
        }
        tracing::info!("display task stopped");
    }
}

/// Foreground handle to the display task.
pub struct Display {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl Display {
    /// Create the task without starting it. The caller drives it with
    /// [`DisplayTask::tick`] or [`DisplayTask::run`].
    pub fn new(
        config: &DisplayConfig,
        device: Box<dyn LcdDevice>,
        machine: Arc<Machine>,
        sensor: Box<dyn TemperatureSensor>,
    ) -> (Display, DisplayTask) {
        let initial = match config.initial_status {
            StatusScreen::Panel if !config.panel => StatusScreen::Registers,
            s => s,
        };
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                device,
                selected: Some(Selected::Empty),
                status: initial,
                shows_status: false,
                panel: config.panel,
                next_custom: 0,
                custom: None,
            }),
            done: AtomicBool::new(false),
        });
        let rate = config.refresh_hz();
        let task = DisplayTask {
            shared: shared.clone(),
            pixmap: Pixmap::new(LCD_WIDTH, LCD_HEIGHT, config.depth),
            machine,
            sensor,
            empty: Empty,
            regs: CpuRegs::new(&config.product, rate),
            panel: Panel::new(&config.product, rate),
            memory: MemoryMap,
            custom: None,
            current: None,
            first: true,
            stopped: false,
            interval: Duration::from_micros(1_000_000 / rate as u64),
            brightness: config.brightness,
            rotated: config.rotated,
        };
        (Display { shared, thread: None }, task)
    }

    /// Start the display task on its own thread.
    pub fn init(
        config: &DisplayConfig,
        device: Box<dyn LcdDevice>,
        machine: Arc<Machine>,
        sensor: Box<dyn TemperatureSensor>,
    ) -> Result<Display> {
        let (mut display, task) = Display::new(config, device, machine, sensor);
        let handle = std::thread::Builder::new()
            .name("lcd".into())
            .spawn(move || task.run())?;
        display.thread = Some(handle);
        Ok(display)
    }

    /// Stop the task and wait for it. The last frame sent is blank.
    pub fn shutdown(&mut self) {
        self.shared.lock().selected = None;
        if let Some(handle) = self.thread.take() {
            while !self.shared.done.load(Ordering::Acquire) && !handle.is_finished() {
                std::thread::sleep(SHUTDOWN_POLL);
            }
            if handle.join().is_err() {
                tracing::error!("display task panicked");
            }
        }
    }

    /// Whether the task has completed its shutdown step.
    pub fn is_done(&self) -> bool {
        self.shared.done.load(Ordering::Acquire)
    }

    /// Show `screen` instead of the status screens. `None` stops the task,
    /// as [`Display::shutdown`] does, without waiting for it.
    pub fn set_custom(&self, screen: Option<Box<dyn Screen>>) {
        let mut inner = self.shared.lock();
        inner.shows_status = false;
        match screen {
            Some(screen) => {
                let id = inner.next_custom;
                inner.next_custom += 1;
                inner.custom = Some((id, screen));
                inner.selected = Some(Selected::Custom(id));
            }
            None => inner.selected = None,
        }
    }

    /// Show a status screen, or the current one for `None`. The panel screen
    /// is only selectable when it is enabled.
    pub fn show_status(&self, which: Option<StatusScreen>) {
        let mut inner = self.shared.lock();
        match which {
            Some(StatusScreen::Panel) if !inner.panel => {}
            Some(s) => inner.status = s,
            None => {}
        }
        let status = inner.status;
        inner.selected = Some(Selected::Status(status));
        inner.shows_status = true;
        tracing::info!("display: status screen {:?}", status);
    }

    /// Advance to the next status screen. It is only put on the display if
    /// a status screen is showing.
    pub fn next_status(&self) {
        let mut inner = self.shared.lock();
        inner.status = match inner.status {
            StatusScreen::Registers if inner.panel => StatusScreen::Panel,
            StatusScreen::Registers | StatusScreen::Panel => StatusScreen::Memory,
            StatusScreen::Memory => StatusScreen::Registers,
        };
        if inner.shows_status {
            inner.selected = Some(Selected::Status(inner.status));
        }
    }

    pub fn status(&self) -> StatusScreen {
        self.shared.lock().status
    }

    pub fn shows_status(&self) -> bool {
        self.shared.lock().shows_status
    }

    pub fn set_brightness(&self, percent: u8) {
        self.shared.lock().device.backlight(percent);
    }

    pub fn set_rotation(&self, rotated: bool) {
        self.shared.lock().device.rotate(rotated);
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.shutdown();
        }
    }
}
