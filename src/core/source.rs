//! Catalog source — where the catalog comes from and how it gets loaded.

use std::path::{Path, PathBuf};

use super::catalog::{Catalog, ColumnHeading};
use super::error::CatalogError;

/// Either a file to read or a catalog that is already in memory.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    FilePath(PathBuf),
    Catalog(Catalog),
}

impl SourceConfig {
    /// Pick a source from optional inputs.  A file path takes priority over
    /// a pre-built catalog.
    pub fn pick(file_path: Option<PathBuf>, catalog: Option<Catalog>) -> Option<Self> {
        file_path
            .map(SourceConfig::FilePath)
            .or_else(|| catalog.map(SourceConfig::Catalog))
    }

    /// Short human-readable description for titles and logs.
    pub fn describe(&self) -> String {
        match self {
            SourceConfig::FilePath(path) => path.display().to_string(),
            SourceConfig::Catalog(_) => "in-memory catalog".to_string(),
        }
    }
}

/// Produces a [`Catalog`] once and then exposes it to the table.
#[derive(Debug)]
pub struct CatalogSource {
    config: SourceConfig,
    catalog: Option<Catalog>,
}

impl CatalogSource {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            catalog: None,
        }
    }

    /// A source whose catalog is already in place.
    #[cfg(test)]
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            config: SourceConfig::Catalog(catalog.clone()),
            catalog: Some(catalog),
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Load the catalog.  A file is read and parsed; a pre-built catalog is
    /// normalized and stored without any I/O.
    ///
    /// The future resolves exactly once.  Read failures come back as
    /// [`CatalogError::LoadFailed`] and are never retried.
    pub async fn load(&mut self) -> Result<(), CatalogError> {
        let catalog = match &self.config {
            SourceConfig::FilePath(path) => {
                let text = fetch_text(path).await?;
                Catalog::parse(&text)?
            }
            SourceConfig::Catalog(catalog) => catalog.clone().normalized()?,
        };
        tracing::info!(
            source = %self.config.describe(),
            rows = catalog.len(),
            "catalog loaded"
        );
        if catalog.is_empty() {
            tracing::warn!("catalog has no data rows");
        }
        self.catalog = Some(catalog);
        Ok(())
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some()
    }

    /// Column names in display order; empty until loaded.
    pub fn columns(&self) -> &[String] {
        self.catalog()
            .map(|c| c.columns.as_slice())
            .unwrap_or(&[])
    }

    #[cfg(test)]
    pub fn into_catalog(self) -> Option<Catalog> {
        self.catalog
    }

    /// Cell grid for the table; empty until loaded.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.catalog().map(Catalog::table_rows).unwrap_or_default()
    }

    /// Column titles and widths; empty until loaded.
    pub fn column_headings(&self) -> Vec<ColumnHeading> {
        self.catalog().map(Catalog::column_headings).unwrap_or_default()
    }
}

/// Read the raw bytes at `path` and decode them as text.  Invalid UTF-8 is
/// replaced rather than rejected.
async fn fetch_text(path: &Path) -> Result<String, CatalogError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CatalogError::LoadFailed {
            locator: path.to_path_buf(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode a pre-built catalog from its JSON form.
pub fn catalog_from_json(text: &str) -> Result<Catalog, CatalogError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const TSV: &str = "path\tcell\tdataType\tantibody\tview\treplicate\ttype\tlab\thub\n\
                       /data/a.bed\tK562\tChipSeq\tH3K4me3\tPeaks\t1\tbed\tlabX\thubY\n";

    #[tokio::test]
    async fn loads_and_parses_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TSV.as_bytes()).unwrap();

        let mut source = CatalogSource::new(SourceConfig::FilePath(file.path().to_path_buf()));
        assert!(source.catalog().is_none());
        assert!(source.table_rows().is_empty());

        source.load().await.unwrap();
        let catalog = source.catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.rows[0]["path"], "/data/a.bed");
        assert_eq!(source.column_headings().len(), 8);
    }

    #[tokio::test]
    async fn missing_file_is_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let mut source = CatalogSource::new(SourceConfig::FilePath(path.clone()));

        match source.load().await {
            Err(CatalogError::LoadFailed { locator, .. }) => assert_eq!(locator, path),
            other => panic!("expected LoadFailed, got {other:?}"),
        }
        assert!(source.catalog().is_none());
    }

    #[tokio::test]
    async fn prebuilt_catalog_is_stored_directly() {
        let parsed = Catalog::parse(TSV).unwrap();
        let mut source = CatalogSource::new(SourceConfig::Catalog(parsed.clone()));
        source.load().await.unwrap();
        assert_eq!(source.into_catalog(), Some(parsed));
    }

    #[test]
    fn file_path_takes_priority() {
        let catalog = Catalog::parse(TSV).unwrap();
        let picked = SourceConfig::pick(Some(PathBuf::from("x.txt")), Some(catalog.clone()));
        assert!(matches!(picked, Some(SourceConfig::FilePath(_))));
        let picked = SourceConfig::pick(None, Some(catalog));
        assert!(matches!(picked, Some(SourceConfig::Catalog(_))));
        assert!(SourceConfig::pick(None, None).is_none());
    }

    #[test]
    fn catalog_json_round_trips_through_serde() {
        let catalog = Catalog::parse(TSV).unwrap();
        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(catalog_from_json(&json).unwrap(), catalog);
        assert!(matches!(catalog_from_json("{"), Err(CatalogError::Json(_))));
    }
}
