//! Static full-screen message, such as the startup logo or a prompt to
//! connect a terminal.

use super::{Frame, Screen};
use crate::color::Color;
use crate::font::Font;

pub struct Banner {
    /// Text and color of each line, top to bottom
    lines: Vec<(String, Color)>,
    font: &'static Font,
    frame: Color,
}

impl Banner {
    pub fn new<S: AsRef<str>>(lines: &[(S, Color)], font: &'static Font, frame: Color) -> Self {
        Banner {
            lines: lines.iter().map(|(l, c)| (l.as_ref().to_string(), *c)).collect(),
            font,
            frame,
        }
    }
}

impl Screen for Banner {
    fn draw(&mut self, frame: &mut Frame<'_>, first: bool) {
        if !first {
            return;
        }
        let pm = &mut *frame.pixmap;
        let lines: Vec<(&str, u16)> = self.lines.iter().map(|(l, c)| (l.as_str(), pm.color(*c))).collect();
        let border = pm.color(self.frame);
        pm.draw_banner(&lines, self.font, border);
    }
}
