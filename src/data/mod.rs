/// Data layer: core types, loading, cleaning and filtering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  coerce TotalCharges, drop bad rows, binarize services
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, control options, churn palette
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterSelection → FilteredView
///   └──────────┘
/// ```

pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;
