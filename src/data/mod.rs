/// Data layer: core types, loading, filtering, and summary statistics.
///
/// Architecture:
/// ```text
///  insurance.csv / insurance_preprocessed.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV → Dataset (memoized on path + mtime)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, schema variant, observed bounds
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterCriteria → new Dataset (order preserved)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  histograms + categorical frequencies for the pages
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
