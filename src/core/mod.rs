//! Core logic – catalog parsing, loading, and track derivation.
//!
//! Nothing in this module depends on any TUI or rendering crate.
//! Every type is `Send + Sync` so it can be shared across async tasks.

pub mod catalog;
pub mod error;
pub mod source;
pub mod track;
