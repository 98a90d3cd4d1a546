//! Blank screen shown while nothing else is selected.

use super::{Frame, Screen};
use crate::color::Color;

#[derive(Debug, Default, Clone, Copy)]
pub struct Empty;

impl Screen for Empty {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        if first {
            let black = frame.pixmap.color(Color::Black);
            frame.pixmap.clear(black);
        }
    }
}
