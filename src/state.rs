use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::aggregate::{aggregate, AggregateResult};
use crate::data::filter::{filtered_indices, Selection};
use crate::data::loader::CachedLoader;
use crate::data::model::{Facet, HistoryDataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Memoized loader; re-parses only when the source file changes.
    pub loader: CachedLoader,

    /// Loaded history (None until the user opens a file).
    pub dataset: Option<Arc<HistoryDataset>>,

    /// Active facet filters.
    pub selection: Selection,

    /// Indices of plays passing the current selection (cached).
    pub visible: Vec<usize>,

    /// Derived views over the visible plays (cached).
    pub aggregates: AggregateResult,

    /// Per-platform chart colours.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load (or reload) a history file through the memoized loader.
    pub fn load_history(&mut self, path: &Path) {
        match self.loader.load(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(err) => {
                log::error!("failed to load {}: {err}", path.display());
                self.status_message = Some(format!("Error: {err}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the selection to everything.
    /// The selection resets only here; filter changes never touch it
    /// implicitly.
    pub fn set_dataset(&mut self, dataset: Arc<HistoryDataset>) {
        self.selection = Selection::all(&dataset);
        self.visible = (0..dataset.len()).collect();
        self.aggregates = aggregate(&dataset, &self.visible);
        self.color_map = ColorMap::new(&dataset.platforms);
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute the filtered view and all derived aggregates. One selection
    /// change triggers one full synchronous recomputation; aggregation is
    /// skipped outright when the view is empty.
    pub fn refilter(&mut self) {
        let Some(dataset) = &self.dataset else { return };
        self.visible = filtered_indices(dataset, &self.selection);
        self.aggregates = if self.visible.is_empty() {
            AggregateResult::default()
        } else {
            aggregate(dataset, &self.visible)
        };
    }

    /// Toggle a single value in one facet's selection.
    pub fn toggle_value(&mut self, facet: Facet, value: &str) {
        let selected = self.selection.values_mut(facet);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every value of one facet.
    pub fn select_all(&mut self, facet: Facet) {
        let Some(dataset) = self.dataset.clone() else { return };
        *self.selection.values_mut(facet) = dataset.distinct(facet).iter().cloned().collect();
        self.refilter();
    }

    /// Deselect every value of one facet.
    pub fn select_none(&mut self, facet: Facet) {
        self.selection.values_mut(facet).clear();
        self.refilter();
    }
}
