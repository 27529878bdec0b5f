//! Background catalog load to keep the UI thread responsive.
//!
//! The loaded source (or the reason it failed) arrives on the channel
//! exactly once.

use tokio::sync::mpsc;

use crate::core::error::CatalogError;
use crate::core::source::CatalogSource;

pub enum LoadUpdate {
    Finished(Result<CatalogSource, CatalogError>),
}

pub fn spawn_catalog_load(tx: mpsc::UnboundedSender<LoadUpdate>, mut source: CatalogSource) {
    tokio::spawn(async move {
        let described = source.config().describe();
        tracing::debug!(source = %described, "catalog load started");

        let result = source.load().await.map(|()| source);
        let _ = tx.send(LoadUpdate::Finished(result));
    });
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::catalog::Catalog;
    use crate::core::source::SourceConfig;

    #[tokio::test]
    async fn failure_is_delivered_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let source = CatalogSource::new(SourceConfig::FilePath(PathBuf::from(
            "/definitely/not/here/encode.txt",
        )));
        spawn_catalog_load(tx, source);

        let LoadUpdate::Finished(result) = rx.recv().await.unwrap();
        assert!(matches!(result, Err(CatalogError::LoadFailed { .. })));
        // Sender is gone after the single message.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn prebuilt_catalog_arrives() {
        let catalog = Catalog::parse(
            "path\tcell\tdataType\tantibody\tview\treplicate\ttype\tlab\thub\n\
             /a.bed\tK562\tChipSeq\tH3K4me3\tPeaks\t1\tbed\tlabX\th\n",
        )
        .unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_catalog_load(tx, CatalogSource::new(SourceConfig::Catalog(catalog.clone())));

        let LoadUpdate::Finished(result) = rx.recv().await.unwrap();
        let source = result.unwrap();
        assert!(source.is_loaded());
        assert_eq!(source.into_catalog(), Some(catalog));
    }
}
