//! # picosim-lcd-core
//!
//! Status display for a Z80/8080 emulator running on an RP2040/RP2350 board
//! with a 240x135 ST7789 LCD.
//!
//! A display task runs beside the emulator and redraws the panel at a fixed
//! rate. It samples emulator state without locking and shows one of several
//! screens: a blank screen, a banner, the CPU registers, a heatmap of memory
//! or the front-panel lamps.
//!
//! ## Architecture
//!
//! - [`Pixmap`]: frame buffer in the panel's 12- or 16-bit format, with the
//!   drawing primitives
//! - [`font`]: the three fixed-width fonts
//! - [`Grid`]: character-cell layout used by the register screen
//! - [`Machine`]: registers, front-panel signals and memory shared with the
//!   emulator
//! - [`screens`]: the two-phase [`Screen`] renderers
//! - [`Display`] / [`DisplayTask`]: the refresh loop and its foreground handle
//! - [`LcdDevice`]: the controller the frames are sent to
//! - [`DisplayConfig`]: settings, persisted with bincode
//! - [`png`]: screenshots

pub mod color;
pub mod config;
pub mod device;
pub mod error;
pub mod font;
pub mod grid;
pub mod machine;
pub mod pixmap;
pub mod png;
pub mod screens;
pub mod sensor;
pub mod task;

pub use color::{Color, Depth};
pub use config::DisplayConfig;
pub use device::{LcdDevice, NullDevice};
pub use error::{Error, Result};
pub use grid::Grid;
pub use machine::{ByteReg, CpuKind, Machine, PanelByte, WordReg};
pub use pixmap::Pixmap;
pub use screens::{Banner, Frame, Screen, StatusScreen};
pub use sensor::{SimulatedSensor, TemperatureSensor};
pub use task::{Display, DisplayTask, TickState};

/// LCD width in pixels
pub const LCD_WIDTH: u16 = 240;
/// LCD height in pixels
pub const LCD_HEIGHT: u16 = 135;
