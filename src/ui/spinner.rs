//! Loading indicator — a small spinner + label centred in a given area.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A "loading catalog…" indicator with a spinning icon.
pub struct LoadIndicator {
    /// Whether to show the indicator at all.
    pub visible: bool,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
}

impl LoadIndicator {
    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()]
    }
}

impl Widget for LoadIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label = format!(" {} loading catalog… ", self.frame());
        let label_width = label.chars().count() as u16;
        if !self.visible || area.width < label_width || area.height == 0 {
            return;
        }

        let x = area.x + (area.width - label_width) / 2;
        let y = area.y + area.height / 2;

        let line = Line::from(Span::styled(
            label,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

        buf.set_line(x, y, &line, label_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_cycle_with_tick() {
        let a = LoadIndicator { visible: true, tick: 0 };
        let b = LoadIndicator { visible: true, tick: SPINNER_FRAMES.len() as u64 };
        assert_eq!(a.frame(), b.frame());
        assert_ne!(a.frame(), LoadIndicator { visible: true, tick: 1 }.frame());
    }
}
