//! Catalog dialog — the modal overlay that hosts the catalog table.
//!
//! Renders centred over the browser view with a close control in the top
//! border, the table, a hint line, and `Close` / `Load` buttons at the bottom.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, StatefulWidget, Widget},
};

use super::catalog_table::{CatalogTable, CatalogTableState};
use super::spinner::LoadIndicator;
use super::theme::Theme;

const CLOSE_GLYPH: &str = "[×]";
const CLOSE_LABEL: &str = "[ Close ]";
const LOAD_LABEL: &str = "[ Load ]";

/// What the dialog body shows.
pub enum ModalBody<'a> {
    Loading { tick: u64 },
    Failed { message: &'a str },
    Table,
}

/// The dialog widget.
pub struct CatalogModal<'a> {
    pub title: &'a str,
    pub body: ModalBody<'a>,
    pub hint: &'a str,
}

/// Clickable regions returned after rendering, for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalHitZones {
    pub dialog: Rect,
    pub top_close: Rect,
    pub bottom_close: Rect,
    pub load: Rect,
}

/// A button a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalButton {
    TopClose,
    BottomClose,
    Load,
}

impl ModalHitZones {
    pub fn button_at(&self, x: u16, y: u16) -> Option<ModalButton> {
        let pos = Position::new(x, y);
        if self.top_close.contains(pos) {
            Some(ModalButton::TopClose)
        } else if self.bottom_close.contains(pos) {
            Some(ModalButton::BottomClose)
        } else if self.load.contains(pos) {
            Some(ModalButton::Load)
        } else {
            None
        }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.dialog.contains(Position::new(x, y))
    }
}

impl<'a> CatalogModal<'a> {
    /// Compute the overlay area (centred, 90% of the terminal).
    pub fn overlay_area(terminal: Rect) -> Rect {
        let margin_x = terminal.width / 20;
        let margin_y = terminal.height / 20;
        Rect::new(
            terminal.x + margin_x,
            terminal.y + margin_y,
            terminal.width.saturating_sub(margin_x * 2).max(30),
            terminal.height.saturating_sub(margin_y * 2).max(8),
        )
        .intersection(terminal)
    }

    /// Render and return hit zones for mouse interaction.
    pub fn render_and_hit(
        self,
        terminal_area: Rect,
        buf: &mut Buffer,
        table: &mut CatalogTableState,
    ) -> ModalHitZones {
        let area = Self::overlay_area(terminal_area);
        Clear.render(area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border_style());
        let inner = block.inner(area);
        block.render(area, buf);

        // Close control sits on the top border, right-aligned.
        let glyph_width = CLOSE_GLYPH.chars().count() as u16;
        let top_close = Rect::new(
            area.right().saturating_sub(glyph_width + 2),
            area.y,
            glyph_width,
            1,
        );
        buf.set_stringn(
            top_close.x,
            top_close.y,
            CLOSE_GLYPH,
            glyph_width as usize,
            Theme::button_style(),
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(2),    // table
                Constraint::Length(1), // hint
                Constraint::Length(1), // buttons
            ])
            .split(inner);
        let (table_area, hint_area, button_area) = (chunks[0], chunks[1], chunks[2]);

        match self.body {
            ModalBody::Loading { tick } => {
                LoadIndicator {
                    visible: true,
                    tick,
                }
                .render(table_area, buf);
            }
            ModalBody::Failed { message } => {
                Paragraph::new(Line::from(Span::styled(
                    message,
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )))
                .render(table_area, buf);
            }
            ModalBody::Table => {
                CatalogTable::new().render(table_area, buf, table);
            }
        }

        Paragraph::new(Span::styled(self.hint, Theme::hint_style())).render(hint_area, buf);

        // Buttons, right-aligned: "[ Close ] [ Load ]".
        let close_width = CLOSE_LABEL.chars().count() as u16;
        let load_width = LOAD_LABEL.chars().count() as u16;
        let load = Rect::new(
            button_area.right().saturating_sub(load_width),
            button_area.y,
            load_width.min(button_area.width),
            1,
        );
        let bottom_close = Rect::new(
            load.x.saturating_sub(close_width + 1),
            button_area.y,
            close_width.min(button_area.width),
            1,
        );
        buf.set_stringn(
            bottom_close.x,
            bottom_close.y,
            CLOSE_LABEL,
            bottom_close.width as usize,
            Theme::button_style(),
        );
        buf.set_stringn(
            load.x,
            load.y,
            LOAD_LABEL,
            load.width as usize,
            Theme::primary_button_style(),
        );

        ModalHitZones {
            dialog: area,
            top_close,
            bottom_close,
            load,
        }
    }
}
