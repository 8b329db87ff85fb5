//! Static reference data: tracks, weather conditions, race lengths and query
//! kinds.
//!
//! Tracks ship as an embedded CSV (`tracks.csv`) parsed once on first use;
//! the shorter option lists are plain static tables. Nothing here is ever
//! mutated after load.

use log::{error, info};
use once_cell::sync::Lazy;
use serde::Deserialize;

const TRACKS_CSV: &str = include_str!("tracks.csv");

/// A selectable track.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackOption {
    pub id: String,
    pub label: String,
    pub image_url: Option<String>,
}

/// A plain `(id, label)` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionEntry {
    pub id: &'static str,
    pub label: &'static str,
}

/// Which reference table to look in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Track,
    Weather,
    RaceLength,
    QueryKind,
}

pub const WEATHER_CONDITIONS: &[OptionEntry] = &[
    OptionEntry { id: "Dry", label: "Dry" },
    OptionEntry { id: "Light Rain", label: "Light Rain / Intermediate" },
    OptionEntry { id: "Heavy Rain", label: "Heavy Rain / Wet" },
    OptionEntry { id: "Dynamic", label: "Dynamic / Mixed" },
];

pub const RACE_LENGTHS: &[OptionEntry] = &[
    OptionEntry { id: "5 Laps", label: "5 Laps (Sprint)" },
    OptionEntry { id: "25%", label: "25% Race" },
    OptionEntry { id: "35%", label: "35% Race" },
    OptionEntry { id: "50%", label: "50% Race" },
    OptionEntry { id: "100%", label: "100% Race" },
];

pub const QUERY_KINDS: &[OptionEntry] = &[
    OptionEntry { id: "Car Setup", label: "Car Setup" },
    OptionEntry { id: "Race Strategy", label: "Race Strategy" },
];

static TRACKS: Lazy<Vec<TrackOption>> = Lazy::new(|| {
    read_tracks_from_csv_string(TRACKS_CSV).unwrap_or_else(|err| {
        error!("Failed to load embedded track catalog: {}", err);
        Vec::new()
    })
});

/// Parse a `id,label,image_url` CSV with a header row.
///
/// Empty image cells become `None`; duplicate ids keep the first row.
pub fn read_tracks_from_csv_string(csv_content: &str) -> Result<Vec<TrackOption>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_content.as_bytes());

    let mut tracks: Vec<TrackOption> = Vec::new();
    for row in reader.deserialize::<TrackOption>() {
        let mut track = row?;
        if track.image_url.as_deref().is_some_and(str::is_empty) {
            track.image_url = None;
        }
        if tracks.iter().any(|t| t.id == track.id) {
            continue;
        }
        tracks.push(track);
    }

    info!("Loaded {} tracks into the catalog", tracks.len());
    Ok(tracks)
}

pub fn tracks() -> &'static [TrackOption] {
    &TRACKS
}

pub fn lookup_track(id: &str) -> Option<&'static TrackOption> {
    tracks().iter().find(|track| track.id == id)
}

/// Display label for `id` in the given table.
pub fn lookup_label(kind: CatalogKind, id: &str) -> Option<&'static str> {
    match kind {
        CatalogKind::Track => lookup_track(id).map(|track| track.label.as_str()),
        CatalogKind::Weather => find_entry(WEATHER_CONDITIONS, id),
        CatalogKind::RaceLength => find_entry(RACE_LENGTHS, id),
        CatalogKind::QueryKind => find_entry(QUERY_KINDS, id),
    }
}

/// `(id, label)` pairs in display order, for select inputs.
pub fn options(kind: CatalogKind) -> Vec<(&'static str, &'static str)> {
    let entries = |table: &'static [OptionEntry]| -> Vec<(&'static str, &'static str)> {
        table.iter().map(|e| (e.id, e.label)).collect()
    };
    match kind {
        CatalogKind::Track => tracks()
            .iter()
            .map(|t| (t.id.as_str(), t.label.as_str()))
            .collect(),
        CatalogKind::Weather => entries(WEATHER_CONDITIONS),
        CatalogKind::RaceLength => entries(RACE_LENGTHS),
        CatalogKind::QueryKind => entries(QUERY_KINDS),
    }
}

fn find_entry(table: &'static [OptionEntry], id: &str) -> Option<&'static str> {
    table.iter().find(|e| e.id == id).map(|e| e.label)
}
