//! Error type shared by the catalog parser and loader.

use std::path::PathBuf;

/// Everything that can go wrong while producing a [`Catalog`](super::catalog::Catalog).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The text does not have the shape of an ENCODE track index.
    #[error("malformed catalog (line {line}): {reason}")]
    Malformed { line: usize, reason: String },

    /// The loader could not deliver the raw text.
    #[error("catalog load failed for {}: {source}", locator.display())]
    LoadFailed {
        locator: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A pre-built catalog could not be decoded.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }
}
