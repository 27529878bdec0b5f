//! Input handling — maps key/mouse events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::config::Action;
use crate::core::track::TrackLoader;
use crate::ui::modal::ModalButton;

use super::state::{ActiveView, AppState, LoadStatus};

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.table.clear_selection();
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Browser => handle_browser_key(state, key),
        ActiveView::CatalogDialog => handle_dialog_key(state, key),
    }
}

// ── Browser view ────────────────────────────────────────────────

fn handle_browser_key(state: &mut AppState, key: KeyEvent) {
    match state.config.match_key(key) {
        Some(Action::OpenCatalog) => open_dialog(state),
        Some(Action::Quit) => state.should_quit = true,
        _ => {}
    }
}

// ── Catalog dialog ──────────────────────────────────────────────

fn handle_dialog_key(state: &mut AppState, key: KeyEvent) {
    let action = state.config.match_key(key);

    // Dismissal works whether or not the catalog has arrived.
    match action {
        Some(Action::CloseDialog) => {
            close_dialog(state);
            return;
        }
        Some(Action::Quit) => {
            close_dialog(state);
            state.should_quit = true;
            return;
        }
        _ => {}
    }

    if state.load_status != LoadStatus::Ready {
        return;
    }

    // Digits sort by column number unless the user bound them to something.
    let Some(action) = action else {
        if let KeyCode::Char(c @ '1'..='9') = key.code {
            if key.modifiers.is_empty() {
                state.table.cycle_sort(c as usize - '1' as usize);
            }
        }
        return;
    };

    match action {
        Action::MoveUp => state.table.select_prev(),
        Action::MoveDown => state.table.select_next(),
        Action::PageUp => state.table.page_up(),
        Action::PageDown => state.table.page_down(),
        Action::JumpFirst => state.table.select_first(),
        Action::JumpLast => state.table.select_last(),
        Action::ScrollLeft => state.table.scroll_left(),
        Action::ScrollRight => state.table.scroll_right(),
        Action::ToggleSelect => {
            state.table.toggle_current();
            state.table.select_next();
        }
        Action::LoadSelected => load_selected(state),
        Action::OpenCatalog | Action::CloseDialog | Action::Quit => {}
    }
}

/// Process a mouse event.  Only the dialog reacts to the mouse.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.active_view != ActiveView::CatalogDialog {
        return;
    }
    let Some(hits) = state.modal_hits else {
        return;
    };
    let (x, y) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            match hits.button_at(x, y) {
                Some(ModalButton::TopClose) | Some(ModalButton::BottomClose) => {
                    close_dialog(state);
                    return;
                }
                Some(ModalButton::Load) => {
                    if state.load_status == LoadStatus::Ready {
                        load_selected(state);
                    }
                    return;
                }
                None => {}
            }
            if state.load_status != LoadStatus::Ready {
                return;
            }
            if let Some(column) = state.table.header_column_at(x, y) {
                state.table.cycle_sort(column);
            } else if let Some(display_index) = state.table.display_row_at(x, y) {
                state.table.toggle_display_row(display_index);
            }
        }
        MouseEventKind::ScrollDown if hits.contains(x, y) => state.table.select_next(),
        MouseEventKind::ScrollUp if hits.contains(x, y) => state.table.select_prev(),
        _ => {}
    }
}

// ── Dialog lifecycle ────────────────────────────────────────────

/// Show the catalog dialog.  Column layout is redone once it is visible.
pub fn open_dialog(state: &mut AppState) {
    state.active_view = ActiveView::CatalogDialog;
    state.status_message = None;
    state.table.request_layout();
    tracing::debug!("catalog dialog shown");
}

/// Dismiss the dialog.  Any selection is discarded so the next session
/// starts clean.
pub fn close_dialog(state: &mut AppState) {
    state.table.clear_selection();
    state.active_view = ActiveView::Browser;
    state.modal_hits = None;
}

/// Turn the selection into track configurations and hand them to the
/// browser in one batch.  With nothing selected the dialog stays open.
fn load_selected(state: &mut AppState) {
    let ctx = state.track_context();
    let configs = state.table.confirm(&ctx);
    if configs.is_empty() {
        state.status_message = Some("Nothing selected".to_string());
        return;
    }

    let count = configs.len();
    state.tracks.load_tracks(configs);
    state.active_view = ActiveView::Browser;
    state.modal_hits = None;
    state.status_message = Some(format!("Loaded {count} track(s)"));
}
