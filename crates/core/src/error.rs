//! Errors for the file-facing parts of the crate (settings, screenshots).
//!
//! Drawing and the display task never fail; only operations that touch the
//! host filesystem return [`Error`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings encoding error: {0}")]
    Encode(#[from] bincode::Error),
    #[error("not a picosim-lcd settings file")]
    BadMagic,
    #[error("unsupported settings version {0}")]
    UnsupportedVersion(u32),
}
