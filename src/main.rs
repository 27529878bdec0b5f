//! Browse an ENCODE track index in the terminal and pick tracks to load.
//!
//! Run the binary with a catalog file to open the picker.  Tracks loaded
//! during the session are printed as a JSON array on stdout when it ends.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    loader::{spawn_catalog_load, LoadUpdate},
    state::{ActiveView, AppState, LoadStatus},
};
use crate::core::source::{catalog_from_json, CatalogSource, SourceConfig};
use crate::ui::{
    layout::AppLayout,
    modal::{CatalogModal, ModalBody},
    theme::Theme,
    tracks_view::TracksView,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "ENCODE track picker")]
struct Cli {
    /// Tab-separated track index to browse.
    path: Option<PathBuf>,

    /// Pre-built catalog as JSON (`{"columns": [...], "rows": [...]}`).
    /// Ignored when a track index path is given.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Colour for tracks without a known antibody (overrides the config file).
    #[arg(long)]
    default_color: Option<String>,

    /// Number of tracks the browser already shows.
    #[arg(long, default_value_t = 0)]
    existing_tracks: usize,

    /// Write the current configuration to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

/// Resolve the CLI inputs into a source.  The positional path wins.
fn source_config(cli: &Cli) -> Result<SourceConfig> {
    let prebuilt = match (&cli.path, &cli.json) {
        (None, Some(json_path)) => {
            let text = std::fs::read_to_string(json_path)
                .with_context(|| format!("reading {}", json_path.display()))?;
            Some(catalog_from_json(&text)?)
        }
        _ => None,
    };
    match SourceConfig::pick(cli.path.clone(), prebuilt) {
        Some(config) => Ok(config),
        None => bail!("no catalog given: pass a track index path or --json <file>"),
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only emits when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();

    let mut user_config = config::AppConfig::load();
    if let Some(color) = cli.default_color.clone() {
        user_config.default_color = color;
    }

    if cli.write_config {
        let path = user_config.save()?;
        eprintln!("wrote {}", path.display());
        return Ok(());
    }

    let source_config = source_config(&cli)?;
    let source_label = source_config.describe();
    tracing::info!(source = %source_label, "starting");

    let mut state = AppState::new(user_config, source_label, cli.existing_tracks);
    handler::open_dialog(&mut state);

    // ── async channels ────────────────────────────────────────
    let (load_tx, mut load_rx) = tokio::sync::mpsc::unbounded_channel::<LoadUpdate>();
    spawn_catalog_load(load_tx, CatalogSource::new(source_config));

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let mut events = spawn_event_reader(Duration::from_millis(100));

    let run_result = run(&mut terminal, &mut state, &mut events, &mut load_rx).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    run_result?;
    if let Some(err) = state.load_error.take() {
        return Err(err.into());
    }

    if !state.tracks.tracks().is_empty() {
        println!("{}", state.tracks.to_json()?);
    }

    Ok(())
}

/// Draw, then wait for the next terminal event or load update, until quit.
async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
    state: &mut AppState,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<AppEvent>,
    load_rx: &mut tokio::sync::mpsc::UnboundedReceiver<LoadUpdate>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, state))?;

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(state, m),
                    AppEvent::Resize(_, _) => state.table.request_layout(),
                    AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
                }
            }

            Some(LoadUpdate::Finished(result)) = load_rx.recv() => {
                match result {
                    Ok(source) => state.catalog_ready(&source),
                    Err(err) => state.catalog_failed(err),
                }
            }

            else => return Ok(()),
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

fn draw(frame: &mut ratatui::Frame, state: &mut AppState) {
    let layout = AppLayout::from_area(frame.area());

    let tracks_block = Block::default()
        .title(" Tracks ")
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());
    let tracks_view = TracksView::new(state.tracks.tracks(), state.tracks.preexisting())
        .block(tracks_block);
    frame.render_widget(tracks_view, layout.tracks_area);

    let hint = state.config.status_bar_hint();
    let status_text = state.status_message.as_deref().unwrap_or(&hint);
    let status = Paragraph::new(status_text).style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);

    if state.active_view != ActiveView::CatalogDialog {
        return;
    }

    let mut title = format!(
        "ENCODE · {} · {} of {} selected",
        state.source_label,
        state.table.selected_count(),
        state.table.row_count()
    );
    if let Some(sort) = state.table.sort() {
        let arrow = if sort.descending { "▼" } else { "▲" };
        title.push_str(&format!(" · sort {}{arrow}", sort.column + 1));
    }
    let hint = state.config.dialog_hint();
    let body = match &state.load_status {
        LoadStatus::Loading => ModalBody::Loading { tick: state.tick },
        LoadStatus::Failed(message) => ModalBody::Failed {
            message: message.as_str(),
        },
        LoadStatus::Ready => ModalBody::Table,
    };
    let area = frame.area();
    let hits = CatalogModal {
        title: &title,
        body,
        hint: &hint,
    }
    .render_and_hit(area, frame.buffer_mut(), &mut state.table);
    state.modal_hits = Some(hits);
}
