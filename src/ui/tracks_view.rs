//! Browser pane — the tracks loaded so far, one per line with a colour
//! swatch.  The designated track is starred.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::core::track::TrackConfig;

use super::theme::Theme;

pub struct TracksView<'a> {
    tracks: &'a [TrackConfig],
    preexisting: usize,
    block: Option<Block<'a>>,
}

impl<'a> TracksView<'a> {
    pub fn new(tracks: &'a [TrackConfig], preexisting: usize) -> Self {
        Self {
            tracks,
            preexisting,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a> Widget for TracksView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let mut lines = Vec::new();
        if self.preexisting > 0 {
            lines.push(Line::from(Span::styled(
                format!("  {} track(s) already in the browser", self.preexisting),
                Theme::hint_style(),
            )));
        }
        if self.tracks.is_empty() {
            lines.push(Line::from(Span::styled(
                "  No tracks loaded from the catalog yet",
                Theme::hint_style(),
            )));
        }

        // Newest at the bottom; keep the tail visible.
        let room = (inner.height as usize).saturating_sub(lines.len());
        let skip = self.tracks.len().saturating_sub(room);
        for track in self.tracks.iter().skip(skip) {
            let swatch = parse_rgb(&track.color).unwrap_or(Color::Gray);
            let star = if track.designated_track == Some(true) {
                Span::styled("★ ", Theme::designated_style())
            } else {
                Span::raw("  ")
            };
            lines.push(Line::from(vec![
                star,
                Span::styled("██ ", Style::default().fg(swatch)),
                Span::styled(track.name.clone(), Theme::track_name_style()),
                Span::styled(format!("  {}", track.url), Theme::track_url_style()),
            ]));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Parse a CSS `rgb(r, g, b)` colour.
pub fn parse_rgb(css: &str) -> Option<Color> {
    let body = css.trim().strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut parts = body.split(',').map(|p| p.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_rgb() {
        assert_eq!(parse_rgb("rgb(200, 0, 0)"), Some(Color::Rgb(200, 0, 0)));
        assert_eq!(parse_rgb(" rgb(0,150,0) "), Some(Color::Rgb(0, 150, 0)));
    }

    #[test]
    fn rejects_other_colour_forms() {
        assert_eq!(parse_rgb("#ff0000"), None);
        assert_eq!(parse_rgb("rgb(1, 2)"), None);
        assert_eq!(parse_rgb("rgb(1, 2, 3, 4)"), None);
        assert_eq!(parse_rgb("rgb(300, 0, 0)"), None);
    }
}
