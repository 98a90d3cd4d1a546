//! Display settings and their on-disk form.
//!
//! ## File format
//!
//! ```text
//! +------------------+
//! | Magic "PLCD"     |  4 bytes
//! +------------------+
//! | Format version   |  u32 little-endian (currently 1)
//! +------------------+
//! | Settings         |  bincode payload
//! +------------------+
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Depth;
use crate::error::{Error, Result};
use crate::screens::StatusScreen;

const MAGIC: &[u8; 4] = b"PLCD";
const FORMAT_VERSION: u32 = 1;

/// Highest supported refresh rate in frames per second.
pub const MAX_REFRESH_HZ: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Target frames per second
    pub refresh_hz: u32,
    pub depth: Depth,
    /// Backlight in percent
    pub brightness: u8,
    /// Panel mounted upside down
    pub rotated: bool,
    /// Status screen selected at start
    pub initial_status: StatusScreen,
    /// Include the front-panel screen in the status rotation
    pub panel: bool,
    /// Left part of the info line, up to 12 characters are shown
    pub product: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            refresh_hz: 30,
            depth: Depth::Rgb444,
            brightness: 90,
            rotated: false,
            initial_status: StatusScreen::Registers,
            panel: true,
            product: format!("Z80pack {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DisplayConfig {
    /// Refresh rate limited to 1..=60.
    pub fn refresh_hz(&self) -> u32 {
        self.refresh_hz.clamp(1, MAX_REFRESH_HZ)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        let mut out = Vec::with_capacity(8 + payload.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 8 || &data[0..4] != MAGIC {
            return Err(Error::BadMagic);
        }
        let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        Ok(bincode::deserialize(&data[8..])?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }
}
