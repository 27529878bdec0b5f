//! Track configurations — what the host browser needs to load one track.
//!
//! A configuration is derived from one catalog record: the label and colour
//! come from the assay fields, the url from the locator column.

use serde::Serialize;

use super::catalog::Record;

/// Known histone-mark antibodies and their display colour.
pub const ANTIBODY_COLORS: &[(&str, &str)] = &[
    ("H3K27AC", "rgb(200, 0, 0)"),
    ("H3K27ME3", "rgb(130, 0, 4)"),
    ("H3K36ME3", "rgb(0, 0, 150)"),
    ("H3K4ME1", "rgb(0, 150, 0)"),
    ("H3K4ME2", "rgb(0, 150, 0)"),
    ("H3K4ME3", "rgb(0, 150, 0)"),
    ("H3K9AC", "rgb(100, 0, 0)"),
    ("H3K9ME1", "rgb(100, 0, 0)"),
];

/// Every catalog entry is loaded as a BED track.
pub const TRACK_TYPE: &str = "bed";

/// Column holding the resource locator.
const PATH_COLUMN: &str = "path";

/// One track for the host browser to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackConfig {
    #[serde(rename = "type")]
    pub track_type: String,
    pub url: String,
    pub name: String,
    pub color: String,
    /// Only ever `Some(true)`, and only on the first track of a batch loaded
    /// into an empty browser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designated_track: Option<bool>,
}

/// Values that used to be ambient browser state, passed in explicitly.
#[derive(Debug, Clone)]
pub struct TrackContext {
    pub default_color: String,
    pub loaded_track_count: usize,
}

/// The host side that accepts configurations.
pub trait TrackLoader {
    /// Number of tracks the host currently shows.
    fn loaded_track_count(&self) -> usize;

    /// Load a whole batch in one call.
    fn load_tracks(&mut self, configs: Vec<TrackConfig>);
}

/// Tracks loaded during this session, on top of any the host already had.
#[derive(Debug, Default)]
pub struct SessionTracks {
    preexisting: usize,
    tracks: Vec<TrackConfig>,
}

impl SessionTracks {
    pub fn new(preexisting: usize) -> Self {
        Self {
            preexisting,
            tracks: Vec::new(),
        }
    }

    /// Tracks the browser had before this session.
    pub fn preexisting(&self) -> usize {
        self.preexisting
    }

    pub fn tracks(&self) -> &[TrackConfig] {
        &self.tracks
    }

    /// Pretty JSON array of the tracks loaded this session.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.tracks)
    }
}

impl TrackLoader for SessionTracks {
    fn loaded_track_count(&self) -> usize {
        self.preexisting + self.tracks.len()
    }

    fn load_tracks(&mut self, configs: Vec<TrackConfig>) {
        tracing::info!(count = configs.len(), "loading tracks");
        self.tracks.extend(configs);
    }
}

/// Display name for a record.
///
/// With an antibody: `"<antibody> <cell> <replicate>"`.  Without one:
/// `"<cell><dataType> <view> <replicate>"`; cell and dataType are joined
/// without a space, which existing sessions rely on.
pub fn track_label(record: &Record) -> String {
    let field = |key: &str| record.get(key).map(String::as_str).unwrap_or("");
    match antibody_of(record) {
        Some(antibody) => format!("{} {} {}", antibody, field("cell"), field("replicate")),
        None => format!(
            "{}{} {} {}",
            field("cell"),
            field("dataType"),
            field("view"),
            field("replicate")
        ),
    }
}

/// Colour for an antibody, falling back to `default_color` when the
/// antibody is absent, empty or unknown.
pub fn antibody_color(antibody: Option<&str>, default_color: &str) -> String {
    let Some(antibody) = antibody.filter(|a| !a.is_empty()) else {
        return default_color.to_string();
    };
    let key = antibody.to_uppercase();
    ANTIBODY_COLORS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, color)| (*color).to_string())
        .unwrap_or_else(|| default_color.to_string())
}

/// The record's locator: the `path` column, or the trailing column when the
/// catalog names its locator differently.
pub fn track_url(record: &Record, columns: &[String]) -> String {
    record
        .get(PATH_COLUMN)
        .or_else(|| columns.last().and_then(|last| record.get(last)))
        .cloned()
        .unwrap_or_default()
}

/// Turn records into configurations, in order.  The first configuration is
/// designated only when the browser has no tracks yet.
pub fn build_configurations(
    records: &[Record],
    columns: &[String],
    ctx: &TrackContext,
) -> Vec<TrackConfig> {
    let mut configs: Vec<TrackConfig> = records
        .iter()
        .map(|record| TrackConfig {
            track_type: TRACK_TYPE.to_string(),
            url: track_url(record, columns),
            name: track_label(record),
            color: antibody_color(antibody_of(record), &ctx.default_color),
            designated_track: None,
        })
        .collect();

    if ctx.loaded_track_count == 0 {
        if let Some(first) = configs.first_mut() {
            first.designated_track = Some(true);
        }
    }
    configs
}

fn antibody_of(record: &Record) -> Option<&str> {
    record
        .get("antibody")
        .map(String::as_str)
        .filter(|a| !a.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "rgb(0, 0, 150)";

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ctx(loaded: usize) -> TrackContext {
        TrackContext {
            default_color: DEFAULT.to_string(),
            loaded_track_count: loaded,
        }
    }

    #[test]
    fn label_with_antibody() {
        let r = record(&[("antibody", "H3K4me3"), ("cell", "K562"), ("replicate", "1")]);
        assert_eq!(track_label(&r), "H3K4me3 K562 1");
    }

    #[test]
    fn label_without_antibody_joins_cell_and_data_type() {
        let r = record(&[
            ("antibody", ""),
            ("cell", "K562"),
            ("dataType", "ChipSeq"),
            ("view", "Peaks"),
            ("replicate", "2"),
        ]);
        assert_eq!(track_label(&r), "K562ChipSeq Peaks 2");
    }

    #[test]
    fn placeholder_antibody_is_a_value() {
        let r = record(&[
            ("antibody", "-"),
            ("cell", "GM12878"),
            ("dataType", "DnaseSeq"),
            ("view", "Hotspots"),
            ("replicate", "1"),
        ]);
        assert_eq!(track_label(&r), "- GM12878 1");

        let configs = build_configurations(&[r], &["path".to_string()], &ctx(0));
        assert_eq!(configs[0].name, "- GM12878 1");
        assert_eq!(configs[0].color, DEFAULT);
    }

    #[test]
    fn color_lookup_is_case_insensitive() {
        assert_eq!(antibody_color(Some("h3k27ac"), DEFAULT), "rgb(200, 0, 0)");
        assert_eq!(antibody_color(Some("H3K27me3"), DEFAULT), "rgb(130, 0, 4)");
        assert_eq!(antibody_color(Some("H3K9me1"), DEFAULT), "rgb(100, 0, 0)");
    }

    #[test]
    fn unknown_or_absent_antibody_uses_default_color() {
        assert_eq!(antibody_color(Some("XYZ"), DEFAULT), DEFAULT);
        assert_eq!(antibody_color(Some(""), DEFAULT), DEFAULT);
        assert_eq!(antibody_color(Some("-"), DEFAULT), DEFAULT);
        assert_eq!(antibody_color(None, DEFAULT), DEFAULT);
    }

    #[test]
    fn url_prefers_path_then_trailing_column() {
        let columns = vec!["cell".to_string(), "id".to_string()];
        let with_path = record(&[("path", "/a.bed"), ("id", "x")]);
        assert_eq!(track_url(&with_path, &columns), "/a.bed");
        let without = record(&[("cell", "K562"), ("id", "rowid1")]);
        assert_eq!(track_url(&without, &columns), "rowid1");
    }

    #[test]
    fn first_track_designated_only_when_browser_empty() {
        let records = vec![
            record(&[("path", "/a.bed"), ("antibody", "H3K4me3")]),
            record(&[("path", "/b.bed"), ("antibody", "H3K9ac")]),
        ];
        let columns = vec!["path".to_string()];

        let fresh = build_configurations(&records, &columns, &ctx(0));
        assert_eq!(fresh[0].designated_track, Some(true));
        assert_eq!(fresh[1].designated_track, None);

        let busy = build_configurations(&records, &columns, &ctx(3));
        assert!(busy.iter().all(|c| c.designated_track.is_none()));
    }

    #[test]
    fn empty_batch_builds_nothing() {
        assert!(build_configurations(&[], &[], &ctx(0)).is_empty());
    }

    #[test]
    fn serializes_with_host_field_names() {
        let config = TrackConfig {
            track_type: TRACK_TYPE.to_string(),
            url: "/a.bed".to_string(),
            name: "H3K4me3 K562 1".to_string(),
            color: "rgb(0, 150, 0)".to_string(),
            designated_track: Some(true),
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["type"], "bed");
        assert_eq!(value["designatedTrack"], true);

        let plain = TrackConfig {
            designated_track: None,
            ..config
        };
        let value = serde_json::to_value(&plain).unwrap();
        assert!(value.get("designatedTrack").is_none());
    }

    #[test]
    fn session_counts_preexisting_tracks() {
        let mut session = SessionTracks::new(2);
        assert_eq!(session.loaded_track_count(), 2);
        session.load_tracks(build_configurations(
            &[record(&[("path", "/a.bed")])],
            &["path".to_string()],
            &ctx(0),
        ));
        assert_eq!(session.loaded_track_count(), 3);
        assert_eq!(session.tracks().len(), 1);
        assert!(session.to_json().unwrap().contains("/a.bed"));
    }
}
