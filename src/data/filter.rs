use std::collections::BTreeSet;

use super::model::{Facet, HistoryDataset};

// ---------------------------------------------------------------------------
// Selection: which facet values are allowed through the filter
// ---------------------------------------------------------------------------

/// The active filter state: the allowed values for each facet.
///
/// A play must match on all three facets to pass. An empty set lets nothing
/// through; [`Selection::all`] is the "no filtering" state a fresh load
/// starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub artists: BTreeSet<String>,
    pub albums: BTreeSet<String>,
    pub platforms: BTreeSet<String>,
}

impl Selection {
    /// Every distinct value selected.
    pub fn all(dataset: &HistoryDataset) -> Self {
        Selection {
            artists: dataset.artists.iter().cloned().collect(),
            albums: dataset.albums.iter().cloned().collect(),
            platforms: dataset.platforms.iter().cloned().collect(),
        }
    }

    pub fn values(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Artist => &self.artists,
            Facet::Album => &self.albums,
            Facet::Platform => &self.platforms,
        }
    }

    pub fn values_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Artist => &mut self.artists,
            Facet::Album => &mut self.albums,
            Facet::Platform => &mut self.platforms,
        }
    }
}

/// Return indices of plays that pass the current selection, in source order.
///
/// A play passes when its artist, album and platform are each contained in
/// the corresponding set. Deselecting everything in one facet therefore
/// hides all plays rather than silently showing them.
pub fn filtered_indices(dataset: &HistoryDataset, selection: &Selection) -> Vec<usize> {
    dataset
        .plays
        .iter()
        .enumerate()
        .filter(|(_, play)| {
            Facet::ALL
                .iter()
                .all(|&facet| selection.values(facet).contains(play.facet_value(facet)))
        })
        .map(|(i, _)| i)
        .collect()
}
