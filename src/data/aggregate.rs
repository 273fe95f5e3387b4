use std::collections::HashMap;

use chrono::Timelike;

use super::model::{HistoryDataset, Play};

/// Rows kept in the ranked artist / track tables.
pub const TOP_N: usize = 10;
/// Number of equal-width bins in the playtime-duration histogram.
pub const DURATION_BINS: usize = 50;
/// Plays shorter than this are treated as skips by the duration histogram.
pub const SKIP_THRESHOLD_S: f64 = 5.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One row of a ranked table: group name and summed listening hours.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub name: String,
    pub hours: f64,
}

/// One bin of the playtime-duration histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationBin {
    pub lo_s: f64,
    pub hi_s: f64,
    pub count: u64,
}

/// Everything the dashboard renders, derived from one filtered view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    /// Summed `ms_played` over the view.
    pub total_ms: u64,
    pub top_artists: Vec<RankedEntry>,
    pub top_tracks: Vec<RankedEntry>,
    /// Play counts per hour of day, dense over 0..24.
    pub hourly: [u64; 24],
    pub duration_bins: Vec<DurationBin>,
    /// Play counts per platform, every distinct platform included.
    pub platform_counts: Vec<(String, u64)>,
}

impl AggregateResult {
    /// Total listening time in hours. Display rounds to one decimal.
    pub fn total_hours(&self) -> f64 {
        self.total_ms as f64 / MS_PER_HOUR
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Compute every derived view over the plays selected by `indices`.
///
/// Total on any input: an empty view produces zeros and empty tables.
pub fn aggregate(dataset: &HistoryDataset, indices: &[usize]) -> AggregateResult {
    let view: Vec<&Play> = indices.iter().map(|&i| &dataset.plays[i]).collect();

    let total_ms = view.iter().map(|play| play.ms_played).sum();

    let mut hourly = [0u64; 24];
    for play in &view {
        hourly[play.ts.hour() as usize] += 1;
    }

    AggregateResult {
        total_ms,
        top_artists: top_groups(&view, |play| &play.artist_name, TOP_N),
        top_tracks: top_groups(&view, |play| &play.track_name, TOP_N),
        hourly,
        duration_bins: duration_histogram(&view),
        platform_counts: platform_counts(&view),
    }
}

/// Group plays by `key`, sum `ms_played`, rank by hours descending, keep the
/// first `n` groups. Groups are accumulated in first-appearance order and
/// ranked with a stable sort, so equal sums keep that order.
fn top_groups<'a>(
    view: &[&'a Play],
    key: impl Fn(&'a Play) -> &'a str,
    n: usize,
) -> Vec<RankedEntry> {
    let mut order: Vec<(&str, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for &play in view {
        let k = key(play);
        match index.get(k) {
            Some(&i) => order[i].1 += play.ms_played,
            None => {
                index.insert(k, order.len());
                order.push((k, play.ms_played));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .take(n)
        .map(|(name, ms)| RankedEntry {
            name: name.to_string(),
            hours: ms as f64 / MS_PER_HOUR,
        })
        .collect()
}

/// Histogram of play durations with skips excluded. Equal-width bins across
/// the observed range; a degenerate range collapses to a single bin so an
/// all-identical subset still renders.
fn duration_histogram(view: &[&Play]) -> Vec<DurationBin> {
    let durations: Vec<f64> = view
        .iter()
        .map(|play| play.playtime_s)
        .filter(|&s| s >= SKIP_THRESHOLD_S)
        .collect();

    if durations.is_empty() {
        return Vec::new();
    }

    let min = durations.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = durations.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range <= f64::EPSILON {
        return vec![DurationBin {
            lo_s: min,
            hi_s: max,
            count: durations.len() as u64,
        }];
    }

    let width = range / DURATION_BINS as f64;
    let mut counts = vec![0u64; DURATION_BINS];
    for &s in &durations {
        // The max value would index one past the end; clamp it into the last bin.
        let idx = (((s - min) / width) as usize).min(DURATION_BINS - 1);
        counts[idx] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| DurationBin {
            lo_s: min + i as f64 * width,
            hi_s: min + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

/// Play counts per platform, stable-sorted descending, no truncation.
fn platform_counts(view: &[&Play]) -> Vec<(String, u64)> {
    let mut order: Vec<(&str, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for &play in view {
        match index.get(play.platform.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(&play.platform, order.len());
                order.push((&play.platform, 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn play_at(artist: &str, track: &str, platform: &str, ms: u64, ts: &str) -> Play {
        let ts = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S").unwrap();
        Play {
            ts,
            artist_name: artist.to_string(),
            album_name: format!("{artist} album"),
            track_name: track.to_string(),
            platform: platform.to_string(),
            ms_played: ms,
            playtime_s: ms as f64 / 1000.0,
        }
    }

    fn full_view(dataset: &HistoryDataset) -> Vec<usize> {
        (0..dataset.len()).collect()
    }

    #[test]
    fn two_play_scenario() {
        let ds = HistoryDataset::from_plays(vec![
            play_at("A", "T1", "android", 180_000, "2024-01-01T10:00:00"),
            play_at("B", "T2", "android", 60_000, "2024-01-01T10:30:00"),
        ]);
        let agg = aggregate(&ds, &full_view(&ds));

        assert_eq!(agg.total_ms, 240_000);
        assert!((agg.total_hours() - 0.0667).abs() < 1e-3);
        assert_eq!(format!("{:.1}", agg.total_hours()), "0.1");
        assert_eq!(agg.top_artists[0].name, "A");
        assert_eq!(agg.hourly[10], 2);
        assert_eq!(agg.hourly.iter().sum::<u64>(), 2);
    }

    #[test]
    fn equal_sums_keep_first_appearance_order() {
        let ds = HistoryDataset::from_plays(vec![
            play_at("Z", "Tz", "android", 120_000, "2024-01-01T09:00:00"),
            play_at("Y", "Ty", "android", 120_000, "2024-01-01T09:05:00"),
        ]);
        let agg = aggregate(&ds, &full_view(&ds));

        assert_eq!(agg.top_artists[0].name, "Z");
        assert_eq!(agg.top_artists[1].name, "Y");
    }

    #[test]
    fn top_tables_truncate_to_ten() {
        let plays: Vec<Play> = (0..12u64)
            .map(|i| {
                play_at(
                    &format!("artist-{i:02}"),
                    &format!("track-{i:02}"),
                    "android",
                    (12 - i) * 10_000,
                    "2024-01-01T09:00:00",
                )
            })
            .collect();
        let ds = HistoryDataset::from_plays(plays);
        let agg = aggregate(&ds, &full_view(&ds));

        assert_eq!(agg.top_artists.len(), TOP_N);
        assert_eq!(agg.top_artists[0].name, "artist-00");
        assert!(agg
            .top_artists
            .windows(2)
            .all(|w| w[0].hours >= w[1].hours));
    }

    #[test]
    fn group_sums_conserve_total() {
        let ds = HistoryDataset::from_plays(vec![
            play_at("A", "T1", "android", 90_000, "2024-01-01T08:00:00"),
            play_at("B", "T2", "ios", 30_000, "2024-01-01T09:00:00"),
            play_at("A", "T1", "android", 60_000, "2024-01-01T10:00:00"),
        ]);
        let agg = aggregate(&ds, &full_view(&ds));

        let grouped: f64 = agg.top_artists.iter().map(|e| e.hours).sum();
        assert!((grouped - agg.total_hours()).abs() < 1e-9);
    }

    #[test]
    fn empty_view_aggregates_to_zero() {
        let ds = HistoryDataset::default();
        let agg = aggregate(&ds, &[]);

        assert_eq!(agg.total_ms, 0);
        assert_eq!(agg.total_hours(), 0.0);
        assert!(agg.top_artists.is_empty());
        assert!(agg.top_tracks.is_empty());
        assert_eq!(agg.hourly, [0u64; 24]);
        assert!(agg.duration_bins.is_empty());
        assert!(agg.platform_counts.is_empty());
    }

    #[test]
    fn aggregate_is_deterministic() {
        let ds = HistoryDataset::from_plays(vec![
            play_at("A", "T1", "android", 90_000, "2024-01-01T08:00:00"),
            play_at("B", "T2", "ios", 30_000, "2024-01-01T21:00:00"),
        ]);
        let indices = full_view(&ds);
        assert_eq!(aggregate(&ds, &indices), aggregate(&ds, &indices));
    }

    #[test]
    fn short_plays_are_excluded_from_duration_histogram() {
        let ds = HistoryDataset::from_plays(vec![
            play_at("A", "T1", "android", 3_000, "2024-01-01T08:00:00"),
            play_at("A", "T1", "android", 60_000, "2024-01-01T09:00:00"),
            play_at("A", "T1", "android", 120_000, "2024-01-01T10:00:00"),
        ]);
        let agg = aggregate(&ds, &full_view(&ds));

        let total: u64 = agg.duration_bins.iter().map(|b| b.count).sum();
        assert_eq!(total, 2);
        assert_eq!(agg.duration_bins.len(), DURATION_BINS);
        // The skip still counts everywhere else.
        assert_eq!(agg.hourly.iter().sum::<u64>(), 3);
        assert_eq!(agg.total_ms, 183_000);
    }

    #[test]
    fn degenerate_duration_range_collapses_to_one_bin() {
        let ds = HistoryDataset::from_plays(vec![
            play_at("A", "T1", "android", 60_000, "2024-01-01T08:00:00"),
            play_at("A", "T1", "android", 60_000, "2024-01-01T09:00:00"),
        ]);
        let agg = aggregate(&ds, &full_view(&ds));

        assert_eq!(agg.duration_bins.len(), 1);
        let bin = &agg.duration_bins[0];
        assert_eq!(bin.count, 2);
        assert_eq!(bin.lo_s, 60.0);
        assert_eq!(bin.hi_s, 60.0);
    }

    #[test]
    fn all_plays_short_yields_no_duration_bins() {
        let ds = HistoryDataset::from_plays(vec![play_at(
            "A",
            "T1",
            "android",
            2_000,
            "2024-01-01T08:00:00",
        )]);
        let agg = aggregate(&ds, &full_view(&ds));
        assert!(agg.duration_bins.is_empty());
    }

    #[test]
    fn max_duration_lands_in_last_bin() {
        let ds = HistoryDataset::from_plays(vec![
            play_at("A", "T1", "android", 10_000, "2024-01-01T08:00:00"),
            play_at("A", "T1", "android", 310_000, "2024-01-01T09:00:00"),
        ]);
        let agg = aggregate(&ds, &full_view(&ds));

        assert_eq!(agg.duration_bins.len(), DURATION_BINS);
        assert_eq!(agg.duration_bins.first().unwrap().count, 1);
        assert_eq!(agg.duration_bins.last().unwrap().count, 1);
        let counted: u64 = agg.duration_bins.iter().map(|b| b.count).sum();
        assert_eq!(counted, 2);
    }

    #[test]
    fn platform_counts_rank_every_platform() {
        let ds = HistoryDataset::from_plays(vec![
            play_at("A", "T1", "web player", 10_000, "2024-01-01T08:00:00"),
            play_at("A", "T1", "android", 10_000, "2024-01-01T09:00:00"),
            play_at("A", "T1", "android", 10_000, "2024-01-01T10:00:00"),
            play_at("A", "T1", "ios", 10_000, "2024-01-01T11:00:00"),
            play_at("A", "T1", "android", 10_000, "2024-01-01T12:00:00"),
        ]);
        let agg = aggregate(&ds, &full_view(&ds));

        assert_eq!(agg.platform_counts.len(), 3);
        assert_eq!(agg.platform_counts[0], ("android".to_string(), 3));
        // Tied platforms keep first-appearance order.
        assert_eq!(agg.platform_counts[1].0, "web player");
        assert_eq!(agg.platform_counts[2].0, "ios");
    }

    #[test]
    fn aggregation_respects_the_view() {
        let ds = HistoryDataset::from_plays(vec![
            play_at("A", "T1", "android", 90_000, "2024-01-01T08:00:00"),
            play_at("B", "T2", "ios", 30_000, "2024-01-01T09:00:00"),
        ]);
        let agg = aggregate(&ds, &[1]);

        assert_eq!(agg.total_ms, 30_000);
        assert_eq!(agg.top_artists.len(), 1);
        assert_eq!(agg.top_artists[0].name, "B");
        assert_eq!(agg.platform_counts, vec![("ios".to_string(), 1)]);
    }
}
