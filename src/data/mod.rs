/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///   spotify_history.csv
///         │
///         ▼
///    ┌──────────┐
///    │  loader   │  parse + validate → HistoryDataset
///    └──────────┘
///         │
///         ▼
///    ┌───────────────┐
///    │ HistoryDataset │  Vec<Play>, distinct facet values
///    └───────────────┘
///         │
///         ▼
///    ┌──────────┐
///    │  filter   │  apply Selection → visible indices
///    └──────────┘
///         │
///         ▼
///    ┌───────────┐
///    │ aggregate  │  metrics, rankings, histograms
///    └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
