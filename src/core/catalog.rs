//! The ENCODE track index — parsed columns and rows.
//!
//! The source file is tab-separated with a header line.  Raw field order is
//!
//! ```text
//! path | cell | dataType | antibody | view | replicate | type | lab | hub
//! ```
//!
//! The trailing `hub` field is discarded and the leading locator is moved to
//! the end, so the display order becomes
//! `cell | dataType | antibody | view | replicate | type | lab | path`.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::CatalogError;

/// Shown in place of an empty or missing value.
pub const PLACEHOLDER: &str = "-";

/// Display width of each column, in percent of the table width.
pub const COLUMN_WIDTHS: [u16; 8] = [5, 5, 10, 10, 5, 10, 10, 45];

/// One catalog row, keyed by column name.
pub type Row = BTreeMap<String, String>;

/// A row rebuilt from rendered cells.  Same shape as [`Row`].
pub type Record = Row;

/// Parsed catalog: ordered column names plus rows in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub columns: Vec<String>,
    /// JSON rows may carry numbers or `null`; they are read as text.
    #[serde(deserialize_with = "rows_as_text")]
    pub rows: Vec<Row>,
}

/// Title and width for one table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeading {
    pub title: String,
    /// Percentage string, e.g. `"45%"`.
    pub width: String,
}

impl ColumnHeading {
    /// Numeric part of [`width`](Self::width).
    pub fn percent(&self) -> u16 {
        self.width.trim_end_matches('%').parse().unwrap_or(0)
    }
}

impl Catalog {
    /// Parse the raw text of a track index.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut lines = text.lines().enumerate();

        let header = match lines.next() {
            Some((_, line)) if !line.trim().is_empty() => line,
            _ => return Err(CatalogError::malformed(1, "missing header line")),
        };
        let header_tokens: Vec<&str> = header.split('\t').collect();
        if header_tokens.len() < 2 {
            return Err(CatalogError::malformed(
                1,
                format!("header has {} field(s), need at least 2", header_tokens.len()),
            ));
        }

        let columns: Vec<String> = reorder_fields(&header_tokens)
            .into_iter()
            .map(str::to_string)
            .collect();
        check_columns(&columns)?;

        let mut rows = Vec::new();
        for (idx, line) in lines {
            // Only a truly empty line is a terminator; a line of bare tabs
            // is a row of empty fields.
            if line.is_empty() {
                continue;
            }
            let tokens: Vec<&str> = line.split('\t').collect();
            if tokens.len() != header_tokens.len() {
                return Err(CatalogError::malformed(
                    idx + 1,
                    format!(
                        "expected {} fields, found {}",
                        header_tokens.len(),
                        tokens.len()
                    ),
                ));
            }

            let row: Row = columns
                .iter()
                .zip(reorder_fields(&tokens))
                .map(|(key, value)| (key.clone(), normalize(Some(value))))
                .collect();
            rows.push(row);
        }

        tracing::debug!(columns = columns.len(), rows = rows.len(), "parsed catalog");
        Ok(Self { columns, rows })
    }

    /// Bring a pre-built catalog in line with what [`parse`](Self::parse)
    /// produces: every row carries exactly `columns`, blanks become
    /// [`PLACEHOLDER`].
    pub fn normalized(self) -> Result<Self, CatalogError> {
        check_columns(&self.columns)?;

        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|key| (key.clone(), normalize(row.get(key).map(String::as_str))))
                    .collect()
            })
            .collect();

        Ok(Self {
            columns: self.columns,
            rows,
        })
    }

    /// Rectangular cell grid: one `Vec` per row, values in `columns` order.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|heading| {
                        row.get(heading)
                            .cloned()
                            .unwrap_or_else(|| PLACEHOLDER.to_string())
                    })
                    .collect()
            })
            .collect()
    }

    /// `{title, width}` for each column, widths taken from [`COLUMN_WIDTHS`].
    pub fn column_headings(&self) -> Vec<ColumnHeading> {
        self.columns
            .iter()
            .zip(COLUMN_WIDTHS)
            .map(|(title, width)| ColumnHeading {
                title: title.clone(),
                width: format!("{width}%"),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rebuild a key → value record from rendered cells.  Cell `i` belongs to
/// column `i`; surplus cells on either side are ignored.
pub fn record_from_cells(columns: &[String], cells: &[String]) -> Record {
    columns
        .iter()
        .zip(cells)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Drop the last field and move the first one to the end.
pub(crate) fn reorder_fields<'a>(tokens: &[&'a str]) -> Vec<&'a str> {
    let kept = &tokens[..tokens.len().saturating_sub(1)];
    match kept.split_first() {
        Some((first, rest)) => rest.iter().copied().chain(std::iter::once(*first)).collect(),
        None => Vec::new(),
    }
}

fn normalize(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn rows_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Row>, D::Error> {
    let raw = Vec::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|row| row.into_iter().map(|(key, value)| (key, cell_text(value))).collect())
        .collect())
}

/// `null` becomes empty (and so the placeholder once normalized); other
/// scalars keep their JSON spelling.
fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn check_columns(columns: &[String]) -> Result<(), CatalogError> {
    if columns.len() != COLUMN_WIDTHS.len() {
        return Err(CatalogError::malformed(
            1,
            format!(
                "expected {} display columns, found {}",
                COLUMN_WIDTHS.len(),
                columns.len()
            ),
        ));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
        return Err(CatalogError::malformed(1, format!("duplicate column {dup:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "path\tcell\tdataType\tantibody\tview\treplicate\ttype\tlab\thub";

    fn sample() -> String {
        format!(
            "{HEADER}\n\
             /data/a.bed\tK562\tChipSeq\tH3K4me3\tPeaks\t1\tbed\tlabX\thub1\n\
             /data/b.bed\tGM12878\tDnaseSeq\t\tHotspots\t2\tbed\t\thub1\n"
        )
    }

    #[test]
    fn reorder_drops_last_and_rotates_first() {
        assert_eq!(reorder_fields(&["A", "B", "C", "D"]), vec!["B", "C", "A"]);
        assert_eq!(reorder_fields(&["A", "B"]), vec!["A"]);
        assert!(reorder_fields(&["A"]).is_empty());
        assert!(reorder_fields(&[]).is_empty());
    }

    #[test]
    fn parse_reorders_header_into_display_order() {
        let catalog = Catalog::parse(&sample()).unwrap();
        assert_eq!(
            catalog.columns,
            vec!["cell", "dataType", "antibody", "view", "replicate", "type", "lab", "path"]
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.rows[0]["path"], "/data/a.bed");
        assert_eq!(catalog.rows[0]["cell"], "K562");
        assert!(!catalog.rows[0].contains_key("hub"));
    }

    #[test]
    fn every_row_has_exactly_the_columns() {
        let catalog = Catalog::parse(&sample()).unwrap();
        for row in &catalog.rows {
            let keys: Vec<&String> = row.keys().collect();
            let mut expected: Vec<&String> = catalog.columns.iter().collect();
            expected.sort();
            assert_eq!(keys, expected);
        }
    }

    #[test]
    fn empty_values_become_placeholder() {
        let catalog = Catalog::parse(&sample()).unwrap();
        assert_eq!(catalog.rows[1]["antibody"], PLACEHOLDER);
        assert_eq!(catalog.rows[1]["lab"], PLACEHOLDER);
    }

    #[test]
    fn tab_only_line_is_a_row_of_placeholders() {
        let text = format!(
            "{HEADER}\n\t\t\t\t\t\t\t\t\n\
             /data/a.bed\tK562\tChipSeq\tH3K4me3\tPeaks\t1\tbed\tlabX\thub1\n"
        );
        let catalog = Catalog::parse(&text).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.rows[0].len(), 8);
        assert!(catalog.rows[0].values().all(|v| v == PLACEHOLDER));
        assert_eq!(catalog.rows[1]["cell"], "K562");
    }

    #[test]
    fn json_rows_accept_numbers_and_nulls() {
        let json = r#"{
            "columns": ["cell", "dataType", "antibody", "view", "replicate", "type", "lab", "path"],
            "rows": [{"cell": "K562", "replicate": 1, "antibody": null, "path": "/a.bed"}]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        let catalog = catalog.normalized().unwrap();
        let row = &catalog.rows[0];
        assert_eq!(row["replicate"], "1");
        assert_eq!(row["antibody"], PLACEHOLDER);
        assert_eq!(row["path"], "/a.bed");
    }

    #[test]
    fn parsing_is_deterministic() {
        let text = sample();
        assert_eq!(Catalog::parse(&text).unwrap(), Catalog::parse(&text).unwrap());
    }

    #[test]
    fn tolerates_crlf_and_missing_terminator() {
        let text = sample().replace('\n', "\r\n");
        let crlf = Catalog::parse(&text).unwrap();
        let trimmed = Catalog::parse(sample().trim_end()).unwrap();
        assert_eq!(crlf, trimmed);
        assert_eq!(trimmed.len(), 2);
    }

    #[test]
    fn table_rows_follow_column_order() {
        let catalog = Catalog::parse(&sample()).unwrap();
        let grid = catalog.table_rows();
        assert_eq!(grid.len(), 2);
        assert_eq!(
            grid[0],
            vec!["K562", "ChipSeq", "H3K4me3", "Peaks", "1", "bed", "labX", "/data/a.bed"]
        );
    }

    #[test]
    fn column_headings_carry_fixed_widths() {
        let catalog = Catalog::parse(&sample()).unwrap();
        let headings = catalog.column_headings();
        let widths: Vec<&str> = headings.iter().map(|h| h.width.as_str()).collect();
        assert_eq!(widths, vec!["5%", "5%", "10%", "10%", "5%", "10%", "10%", "45%"]);
        assert_eq!(headings[7].title, "path");
        assert_eq!(headings[7].percent(), 45);
    }

    #[test]
    fn wrong_column_count_is_malformed() {
        let err = Catalog::parse("A\tB\tC\tD\nx\ty\tz\tw\n").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { line: 1, .. }));
    }

    #[test]
    fn short_data_line_is_malformed() {
        let text = format!("{HEADER}\n/data/a.bed\tK562\tChipSeq\n");
        let err = Catalog::parse(&text).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { line: 2, .. }));
    }

    #[test]
    fn empty_input_is_malformed() {
        assert!(matches!(
            Catalog::parse(""),
            Err(CatalogError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn normalized_fills_missing_and_drops_unknown_keys() {
        let columns: Vec<String> =
            ["cell", "dataType", "antibody", "view", "replicate", "type", "lab", "path"]
                .iter()
                .map(|s| s.to_string())
                .collect();
        let mut row = Row::new();
        row.insert("cell".into(), "K562".into());
        row.insert("antibody".into(), String::new());
        row.insert("hub".into(), "hubY".into());

        let catalog = Catalog { columns, rows: vec![row] }.normalized().unwrap();
        let row = &catalog.rows[0];
        assert_eq!(row.len(), 8);
        assert_eq!(row["cell"], "K562");
        assert_eq!(row["antibody"], PLACEHOLDER);
        assert_eq!(row["path"], PLACEHOLDER);
        assert!(!row.contains_key("hub"));
    }

    #[test]
    fn record_from_cells_maps_by_position() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let cells = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let record = record_from_cells(&columns, &cells);
        assert_eq!(record.len(), 2);
        assert_eq!(record["a"], "1");
        assert_eq!(record["b"], "2");
    }
}
