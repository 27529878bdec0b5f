//! The catalog table — a scrollable, sortable, multi-select grid.
//!
//! [`CatalogTableState`] owns everything that outlives a frame: the bound
//! rows, the set of selected row ids, cursor and scroll positions, and the
//! column layout.  [`CatalogTable`] is the widget, created fresh each frame.
//!
//! Row ids are indices into the bound catalog.  Sorting only changes the
//! display order, so a selection survives any number of re-sorts.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::catalog::{record_from_cells, ColumnHeading, Record};
use crate::core::source::CatalogSource;
use crate::core::track::{build_configurations, TrackConfig, TrackContext};

use super::theme::Theme;

/// Narrowest a column may get before the table scrolls horizontally.
const MIN_COLUMN_WIDTH: u16 = 4;

/// Gap between adjacent columns.
const COLUMN_GAP: u16 = 1;

/// Width of the selection marker gutter (`"● "`).
const MARKER_WIDTH: u16 = 2;

// ───────────────────────────────────────── sorting ───────────

/// Active sort: which column, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: usize,
    pub descending: bool,
}

/// Compare two cells numerically when both parse as numbers, otherwise
/// case-insensitively as text.
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

// ───────────────────────────────────────── state ─────────────

/// Horizontal span of one rendered column, used for header hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnSpan {
    column: usize,
    x: u16,
    width: u16,
}

/// Persistent table state.
#[derive(Debug, Default)]
pub struct CatalogTableState {
    /// Column names recorded at bind time.  Cell `i` of any row belongs to
    /// `columns[i]`.
    columns: Vec<String>,
    headings: Vec<ColumnHeading>,
    rows: Vec<Vec<String>>,
    /// Display position → row id.
    order: Vec<usize>,
    selected: BTreeSet<usize>,
    sort: Option<SortOrder>,

    /// Cursor position (display index).
    pub cursor: usize,
    /// First visible row (display index).
    pub offset: usize,
    /// First visible column.
    pub column_offset: usize,

    /// Character width per column for the current viewport.
    widths: Vec<u16>,
    /// Viewport width the widths were computed for; `None` forces a recompute.
    layout_width: Option<u16>,
    /// Where rows and the header were drawn last frame.
    rows_area: Rect,
    header_area: Rect,
    header_spans: Vec<ColumnSpan>,
}

impl CatalogTableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the source's rows and headings.  Any previous selection,
    /// scroll position or sort is discarded.
    pub fn bind(&mut self, source: &CatalogSource) {
        self.columns = source.columns().to_vec();
        self.headings = source.column_headings();
        self.rows = source.table_rows();
        self.order = (0..self.rows.len()).collect();
        self.selected.clear();
        self.sort = None;
        self.cursor = 0;
        self.offset = 0;
        self.column_offset = 0;
        self.layout_width = None;
        tracing::debug!(rows = self.rows.len(), "table bound");
    }

    #[cfg(test)]
    pub fn is_bound(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn sort(&self) -> Option<SortOrder> {
        self.sort
    }

    /// Row id shown at a display position.
    pub fn row_id_at(&self, display_index: usize) -> Option<usize> {
        self.order.get(display_index).copied()
    }

    // ── selection ───────────────────────────────────────────────

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, row_id: usize) -> bool {
        self.selected.contains(&row_id)
    }

    /// Flip one row between selected and unselected.
    pub fn toggle_row(&mut self, row_id: usize) {
        if row_id >= self.rows.len() {
            return;
        }
        if !self.selected.insert(row_id) {
            self.selected.remove(&row_id);
        }
    }

    /// Toggle the row under the cursor.
    pub fn toggle_current(&mut self) {
        if let Some(row_id) = self.row_id_at(self.cursor) {
            self.toggle_row(row_id);
        }
    }

    /// Toggle the row at a display position and move the cursor there.
    pub fn toggle_display_row(&mut self, display_index: usize) -> Option<usize> {
        let row_id = self.row_id_at(display_index)?;
        self.cursor = display_index;
        self.toggle_row(row_id);
        Some(row_id)
    }

    /// Drop every selection.  Used when the dialog is dismissed.
    pub fn clear_selection(&mut self) {
        if !self.selected.is_empty() {
            tracing::debug!(count = self.selected.len(), "selection cleared");
        }
        self.selected.clear();
    }

    /// Consume the selection and turn it into track configurations.
    ///
    /// With nothing selected this returns an empty list and changes nothing.
    /// Otherwise the selection is cleared and each selected row is rebuilt
    /// into a record from its cells, in display order.
    pub fn confirm(&mut self, ctx: &TrackContext) -> Vec<TrackConfig> {
        if self.selected.is_empty() {
            return Vec::new();
        }
        let picked = std::mem::take(&mut self.selected);

        let records: Vec<Record> = self
            .order
            .iter()
            .filter(|&&id| picked.contains(&id))
            .filter_map(|&id| self.rows.get(id))
            .map(|cells| record_from_cells(&self.columns, cells))
            .collect();

        build_configurations(&records, &self.columns, ctx)
    }

    // ── navigation ──────────────────────────────────────────────

    pub fn select_next(&mut self) {
        let len = self.order.len();
        if len > 0 && self.cursor < len - 1 {
            self.cursor += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.cursor = 0;
    }

    pub fn select_last(&mut self) {
        self.cursor = self.order.len().saturating_sub(1);
    }

    pub fn page_down(&mut self) {
        let page = self.page_size();
        self.cursor = (self.cursor + page).min(self.order.len().saturating_sub(1));
    }

    pub fn page_up(&mut self) {
        let page = self.page_size();
        self.cursor = self.cursor.saturating_sub(page);
    }

    pub fn scroll_left(&mut self) {
        self.column_offset = self.column_offset.saturating_sub(1);
    }

    pub fn scroll_right(&mut self) {
        if self.column_offset + 1 < self.columns.len() {
            self.column_offset += 1;
        }
    }

    fn page_size(&self) -> usize {
        (self.rows_area.height as usize).max(1)
    }

    /// Ensure the cursor row is visible within `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor - height + 1;
        }
    }

    // ── sorting ─────────────────────────────────────────────────

    /// Cycle a column through ascending → descending → file order.
    pub fn cycle_sort(&mut self, column: usize) {
        if column >= self.columns.len() {
            return;
        }
        self.sort = match self.sort {
            Some(SortOrder {
                column: c,
                descending: false,
            }) if c == column => Some(SortOrder {
                column,
                descending: true,
            }),
            Some(SortOrder {
                column: c,
                descending: true,
            }) if c == column => None,
            _ => Some(SortOrder {
                column,
                descending: false,
            }),
        };
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        let current = self.row_id_at(self.cursor);

        self.order = (0..self.rows.len()).collect();
        if let Some(SortOrder { column, descending }) = self.sort {
            let rows = &self.rows;
            self.order.sort_by(|&a, &b| {
                let ord = compare_cells(&rows[a][column], &rows[b][column]);
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        // Keep the cursor on the same row.
        if let Some(id) = current {
            self.cursor = self.order.iter().position(|&r| r == id).unwrap_or(0);
        }
    }

    // ── layout ──────────────────────────────────────────────────

    /// Recompute column widths for a viewport `width` cells wide.  Called
    /// when the dialog becomes visible, since nothing can be measured while
    /// it is hidden.
    pub fn on_shown(&mut self, width: u16) {
        let usable = width.saturating_sub(MARKER_WIDTH) as u32;
        let gaps = (self.headings.len() as u32).saturating_sub(1) * COLUMN_GAP as u32;
        let budget = usable.saturating_sub(gaps);

        self.widths = self
            .headings
            .iter()
            .map(|h| {
                let share = (budget * h.percent() as u32 / 100) as u16;
                share.max(MIN_COLUMN_WIDTH)
            })
            .collect();
        self.layout_width = Some(width);
    }

    /// Force [`on_shown`](Self::on_shown) on the next render.
    pub fn request_layout(&mut self) {
        self.layout_width = None;
    }

    #[cfg(test)]
    pub fn column_widths(&self) -> &[u16] {
        &self.widths
    }

    /// Columns (index, x offset, width) that fit in `width` cells starting
    /// at `column_offset`.  At least one column is always included.
    fn visible_columns(&self, width: u16) -> Vec<ColumnSpan> {
        let mut spans = Vec::new();
        let mut x = MARKER_WIDTH;
        for (column, &w) in self.widths.iter().enumerate().skip(self.column_offset) {
            if !spans.is_empty() && x + w > width {
                break;
            }
            let w = w.min(width.saturating_sub(x));
            spans.push(ColumnSpan { column, x, width: w });
            x = x.saturating_add(w + COLUMN_GAP);
        }
        spans
    }

    // ── hit testing ─────────────────────────────────────────────

    /// Display index of the row drawn at `(x, y)` last frame.
    pub fn display_row_at(&self, x: u16, y: u16) -> Option<usize> {
        if !self.rows_area.contains(Position::new(x, y)) {
            return None;
        }
        let index = self.offset + (y - self.rows_area.y) as usize;
        (index < self.order.len()).then_some(index)
    }

    /// Column whose header was drawn at `(x, y)` last frame.
    pub fn header_column_at(&self, x: u16, y: u16) -> Option<usize> {
        if !self.header_area.contains(Position::new(x, y)) {
            return None;
        }
        let rel = x - self.header_area.x;
        self.header_spans
            .iter()
            .find(|s| rel >= s.x && rel < s.x + s.width)
            .map(|s| s.column)
    }
}

// ───────────────────────────────────────── widget ────────────

/// The table widget itself — created fresh each frame.
#[derive(Default)]
pub struct CatalogTable<'a> {
    block: Option<Block<'a>>,
}

impl<'a> CatalogTable<'a> {
    pub fn new() -> Self {
        Self { block: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a> StatefulWidget for CatalogTable<'a> {
    type State = CatalogTableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };
        if inner.height < 2 || inner.width <= MARKER_WIDTH {
            return;
        }

        if state.layout_width != Some(inner.width) {
            state.on_shown(inner.width);
        }

        let columns = state.visible_columns(inner.width);

        // ── header ──────────────────────────────────────────────
        state.header_area = Rect::new(inner.x, inner.y, inner.width, 1);
        buf.set_style(state.header_area, Theme::table_header_style());
        for span in &columns {
            let title = &state.headings[span.column].title;
            let indicator = match state.sort {
                Some(SortOrder { column, descending }) if column == span.column => {
                    if descending {
                        " ▼"
                    } else {
                        " ▲"
                    }
                }
                _ => "",
            };
            buf.set_stringn(
                inner.x + span.x,
                inner.y,
                format!("{title}{indicator}"),
                span.width as usize,
                Theme::table_header_style(),
            );
        }
        state.header_spans = columns.clone();

        // ── rows ────────────────────────────────────────────────
        state.rows_area = Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 1);
        let height = state.rows_area.height as usize;
        state.clamp_scroll(height);

        let window = state
            .order
            .iter()
            .enumerate()
            .skip(state.offset)
            .take(height);

        for (i, (display_index, &row_id)) in window.enumerate() {
            let y = state.rows_area.y + i as u16;
            let selected = state.is_selected(row_id);
            let is_cursor = display_index == state.cursor;

            let style = match (is_cursor, selected) {
                (true, true) => Theme::cursor_selected_style(),
                (true, false) => Theme::cursor_style(),
                (false, true) => Theme::row_selected_style(),
                (false, false) => Theme::row_style(),
            };
            buf.set_style(Rect::new(inner.x, y, inner.width, 1), style);

            if selected {
                buf.set_stringn(inner.x, y, "● ", MARKER_WIDTH as usize, style);
            }

            let cells = &state.rows[row_id];
            for span in &columns {
                let text = cells.get(span.column).map(String::as_str).unwrap_or("");
                buf.set_stringn(inner.x + span.x, y, text, span.width as usize, style);
            }
        }
    }
}
