use std::collections::BTreeSet;

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// Facet – the three categorical columns a user can filter on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Artist,
    Album,
    Platform,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Artist, Facet::Album, Facet::Platform];

    pub fn label(self) -> &'static str {
        match self {
            Facet::Artist => "Artists",
            Facet::Album => "Albums",
            Facet::Platform => "Platforms",
        }
    }
}

// ---------------------------------------------------------------------------
// Play – one listening event (one row of the source file)
// ---------------------------------------------------------------------------

/// A single listening event.
#[derive(Debug, Clone, PartialEq)]
pub struct Play {
    /// Event timestamp. The source carries no reliable zone info, so this
    /// is kept naive.
    pub ts: NaiveDateTime,
    pub artist_name: String,
    pub album_name: String,
    pub track_name: String,
    pub platform: String,
    /// Milliseconds of playback reported by the source.
    pub ms_played: u64,
    /// Seconds of playback, derived once at load.
    pub playtime_s: f64,
}

impl Play {
    pub fn facet_value(&self, facet: Facet) -> &str {
        match facet {
            Facet::Artist => &self.artist_name,
            Facet::Album => &self.album_name,
            Facet::Platform => &self.platform,
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed history with pre-computed distinct facet values.
/// Immutable once built; every downstream view is derived from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryDataset {
    /// All plays, in source row order.
    pub plays: Vec<Play>,
    /// Distinct artist names, sorted lexicographically.
    pub artists: Vec<String>,
    /// Distinct album names, sorted lexicographically.
    pub albums: Vec<String>,
    /// Distinct platform names, sorted lexicographically.
    pub platforms: Vec<String>,
}

impl HistoryDataset {
    /// Build the facet indices from loaded plays.
    pub fn from_plays(plays: Vec<Play>) -> Self {
        let mut artists: BTreeSet<String> = BTreeSet::new();
        let mut albums: BTreeSet<String> = BTreeSet::new();
        let mut platforms: BTreeSet<String> = BTreeSet::new();

        for play in &plays {
            artists.insert(play.artist_name.clone());
            albums.insert(play.album_name.clone());
            platforms.insert(play.platform.clone());
        }

        HistoryDataset {
            plays,
            artists: artists.into_iter().collect(),
            albums: albums.into_iter().collect(),
            platforms: platforms.into_iter().collect(),
        }
    }

    /// Sorted distinct values for one facet (populates the filter widgets).
    pub fn distinct(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Artist => &self.artists,
            Facet::Album => &self.albums,
            Facet::Platform => &self.platforms,
        }
    }

    /// Number of plays.
    pub fn len(&self) -> usize {
        self.plays.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }
}
