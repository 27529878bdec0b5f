//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use crate::config::AppConfig;
use crate::core::error::CatalogError;
use crate::core::source::CatalogSource;
use crate::core::track::{SessionTracks, TrackContext, TrackLoader};
use crate::ui::catalog_table::CatalogTableState;
use crate::ui::modal::ModalHitZones;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Browser,
    CatalogDialog,
}

/// Progress of the one catalog load per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Top-level application state.
pub struct AppState {
    /// User-configurable keybindings and default colour.
    pub config: AppConfig,
    /// Shown in the dialog title.
    pub source_label: String,
    /// Table state: bound rows, selection, scroll, sort.
    pub table: CatalogTableState,
    /// Tracks handed to the browser so far.
    pub tracks: SessionTracks,
    pub load_status: LoadStatus,
    /// The load error, kept so `main` can return it once the terminal is restored.
    pub load_error: Option<CatalogError>,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// Dialog hit zones from the last frame.
    pub modal_hits: Option<ModalHitZones>,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Tick counter for the spinner.
    pub tick: u64,
    /// Controls the main event loop.
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: AppConfig, source_label: String, preexisting_tracks: usize) -> Self {
        Self {
            config,
            source_label,
            table: CatalogTableState::new(),
            tracks: SessionTracks::new(preexisting_tracks),
            load_status: LoadStatus::Loading,
            load_error: None,
            active_view: ActiveView::default(),
            modal_hits: None,
            status_message: None,
            tick: 0,
            should_quit: false,
        }
    }

    /// Context for turning the current selection into track configurations.
    pub fn track_context(&self) -> TrackContext {
        TrackContext {
            default_color: self.config.default_color.clone(),
            loaded_track_count: self.tracks.loaded_track_count(),
        }
    }

    /// Bind a freshly loaded catalog to the table.
    pub fn catalog_ready(&mut self, source: &CatalogSource) {
        self.table.bind(source);
        self.load_status = LoadStatus::Ready;
        if self.active_view == ActiveView::CatalogDialog {
            self.table.request_layout();
        }
    }

    /// Record a failed load and stop the session; the error goes back to the caller.
    pub fn catalog_failed(&mut self, err: CatalogError) {
        tracing::error!(%err, "catalog load failed");
        self.load_status = LoadStatus::Failed(err.to_string());
        self.load_error = Some(err);
        self.should_quit = true;
    }
}
