//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  No file I/O happens here.

pub mod catalog_table;
pub mod layout;
pub mod modal;
pub mod spinner;
pub mod theme;
pub mod tracks_view;
