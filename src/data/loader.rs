use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

use super::model::{HistoryDataset, Play};

/// Columns the source file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "ts",
    "artist_name",
    "album_name",
    "track_name",
    "ms_played",
    "platform",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal load failures. Row-level timestamp problems are not errors: those
/// rows are dropped and the load succeeds with a smaller dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("history file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("could not parse {} as delimited text", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// One raw CSV row. `ms_played` is read as a float because exports write it
/// both as an integer and as `1234.0`.
#[derive(Debug, Deserialize)]
struct RawRow {
    ts: String,
    artist_name: String,
    album_name: String,
    track_name: String,
    ms_played: f64,
    platform: String,
}

/// Load a listening history from a delimited-text file.
///
/// Rows whose timestamp does not parse, or whose `ms_played` is not a
/// non-negative number, are dropped rather than failing the load. An empty
/// result (header-only file, or every row dropped) is valid.
pub fn load(path: &Path) -> Result<HistoryDataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let parse_err = |source: csv::Error| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(parse_err)?;
    let headers = reader.headers().map_err(parse_err)?.clone();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::Schema { missing });
    }

    let mut plays = Vec::new();
    let mut dropped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(parse_err)?;

        let raw: RawRow = match record.deserialize(Some(&headers)) {
            Ok(raw) => raw,
            Err(err) => {
                log::debug!("row {row_no}: unreadable fields, dropping ({err})");
                dropped += 1;
                continue;
            }
        };

        let Some(ts) = parse_timestamp(&raw.ts) else {
            log::debug!("row {row_no}: unparseable timestamp {:?}, dropping", raw.ts);
            dropped += 1;
            continue;
        };

        if !raw.ms_played.is_finite() || raw.ms_played < 0.0 {
            log::debug!("row {row_no}: invalid ms_played {}, dropping", raw.ms_played);
            dropped += 1;
            continue;
        }

        let ms_played = raw.ms_played as u64;
        plays.push(Play {
            ts,
            artist_name: raw.artist_name,
            album_name: raw.album_name,
            track_name: raw.track_name,
            platform: raw.platform,
            ms_played,
            playtime_s: ms_played as f64 / 1000.0,
        });
    }

    if dropped > 0 {
        log::info!("dropped {dropped} rows with unusable timestamps or playtimes");
    }
    log::info!("loaded {} plays from {}", plays.len(), path.display());

    Ok(HistoryDataset::from_plays(plays))
}

/// Lenient timestamp parsing. The source is inconsistent about zone
/// suffixes and sub-second precision, so several shapes are accepted; any
/// zone offset is stripped and the written wall-clock time is kept.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    // Bare dates count as midnight.
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ---------------------------------------------------------------------------
// Memoized loader
// ---------------------------------------------------------------------------

/// Change-detection signature for a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceSignature {
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceSignature {
    fn probe(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(SourceSignature {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Memoizes the last parsed dataset keyed by source path and signature, so
/// repeated loads of an unchanged file skip the parse. Invalidated when the
/// file's length or mtime changes.
#[derive(Debug, Default)]
pub struct CachedLoader {
    cached: Option<(PathBuf, SourceSignature, Arc<HistoryDataset>)>,
}

impl CachedLoader {
    pub fn load(&mut self, path: &Path) -> Result<Arc<HistoryDataset>, LoadError> {
        let signature = SourceSignature::probe(path);

        if let (Some(sig), Some((cached_path, cached_sig, dataset))) = (signature, &self.cached) {
            if cached_path == path && *cached_sig == sig {
                log::debug!("reusing cached dataset for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(load(path)?);
        if let Some(sig) = signature {
            self.cached = Some((path.to_path_buf(), sig, Arc::clone(&dataset)));
        }
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
