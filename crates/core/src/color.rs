//! Pixel color depths and the named color set used by the status screens.
//!
//! The ST7789 controller is driven either with 12-bit (RGB444) or 16-bit
//! (RGB565) pixels. Colors travel through the drawing code as raw `u16`
//! values in the active depth's format; [`Depth::raw`] resolves a named
//! [`Color`] into that format.

use serde::{Deserialize, Serialize};

/// Bits per pixel of a [`crate::Pixmap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Depth {
    /// RGB444, two pixels packed into three bytes
    Rgb444,
    /// RGB565, two bytes per pixel, big-endian
    Rgb565,
}

/// Named colors available to the screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Yellow,
    White,
    DkRed,
    DkGreen,
    DkBlue,
    DkCyan,
    DkMagenta,
    DkYellow,
    Gray,
    Orange,
}

impl Depth {
    /// Number of bits per pixel (12 or 16).
    pub fn bits(self) -> u8 {
        match self {
            Depth::Rgb444 => 12,
            Depth::Rgb565 => 16,
        }
    }

    /// Depth from a bit count, as given on the command line.
    pub fn from_bits(bits: u8) -> Option<Depth> {
        match bits {
            12 => Some(Depth::Rgb444),
            16 => Some(Depth::Rgb565),
            _ => None,
        }
    }

    /// Bytes needed for one row of `width` pixels.
    pub fn stride(self, width: u16) -> u16 {
        match self {
            Depth::Rgb444 => ((width + 1) / 2) * 3,
            Depth::Rgb565 => width * 2,
        }
    }

    /// Raw pixel value of a named color in this depth.
    #[rustfmt::skip]
    pub fn raw(self, color: Color) -> u16 {
        match self {
            Depth::Rgb444 => match color {
                Color::Black     => 0x0000,
                Color::Red       => 0x0f00,
                Color::Green     => 0x00f0,
                Color::Blue      => 0x000f,
                Color::Cyan      => 0x00ff,
                Color::Magenta   => 0x0f0f,
                Color::Yellow    => 0x0ff0,
                Color::White     => 0x0fff,
                Color::DkRed     => 0x0800,
                Color::DkGreen   => 0x0080,
                Color::DkBlue    => 0x0008,
                Color::DkCyan    => 0x0088,
                Color::DkMagenta => 0x0808,
                Color::DkYellow  => 0x0880,
                Color::Gray      => 0x0888,
                Color::Orange    => 0x0fa0,
            },
            Depth::Rgb565 => match color {
                Color::Black     => 0x0000,
                Color::Red       => 0xf800,
                Color::Green     => 0x07e0,
                Color::Blue      => 0x001f,
                Color::Cyan      => 0x7fff,
                Color::Magenta   => 0xf81f,
                Color::Yellow    => 0xffe0,
                Color::White     => 0xffff,
                Color::DkRed     => 0x8800,
                Color::DkGreen   => 0x0440,
                Color::DkBlue    => 0x0011,
                Color::DkCyan    => 0x0451,
                Color::DkMagenta => 0x8811,
                Color::DkYellow  => 0x4c40,
                Color::Gray      => 0x8410,
                Color::Orange    => 0xfd20,
            },
        }
    }

    /// Expand a raw pixel value to 8-bit-per-channel RGB.
    ///
    /// Channel bits are replicated into the low bits so full intensity
    /// maps to 0xFF.
    pub fn to_rgb888(self, raw: u16) -> (u8, u8, u8) {
        match self {
            Depth::Rgb444 => {
                let r = ((raw >> 8) & 0x0f) as u8;
                let g = ((raw >> 4) & 0x0f) as u8;
                let b = (raw & 0x0f) as u8;
                ((r << 4) | r, (g << 4) | g, (b << 4) | b)
            }
            Depth::Rgb565 => {
                let r = ((raw >> 11) & 0x1f) as u8;
                let g = ((raw >> 5) & 0x3f) as u8;
                let b = (raw & 0x1f) as u8;
                ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
            }
        }
    }

    /// Expand a raw pixel value to `0x00RRGGBB`, the layout minifb expects.
    pub fn to_u32(self, raw: u16) -> u32 {
        let (r, g, b) = self.to_rgb888(raw);
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth::Rgb444
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride() {
        assert_eq!(Depth::Rgb444.stride(240), 360);
        assert_eq!(Depth::Rgb444.stride(3), 6);
        assert_eq!(Depth::Rgb565.stride(240), 480);
    }

    #[test]
    fn test_full_intensity_expands_to_ff() {
        assert_eq!(Depth::Rgb444.to_rgb888(Depth::Rgb444.raw(Color::White)), (0xff, 0xff, 0xff));
        assert_eq!(Depth::Rgb565.to_rgb888(Depth::Rgb565.raw(Color::White)), (0xff, 0xff, 0xff));
        assert_eq!(Depth::Rgb565.to_u32(Depth::Rgb565.raw(Color::Red)), 0x00ff_0000);
    }

    #[test]
    fn test_from_bits() {
        assert_eq!(Depth::from_bits(12), Some(Depth::Rgb444));
        assert_eq!(Depth::from_bits(16), Some(Depth::Rgb565));
        assert_eq!(Depth::from_bits(24), None);
        assert_eq!(Depth::Rgb565.bits(), 16);
    }
}
