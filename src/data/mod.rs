/// Data layer: core types, loading, and statistics.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  ordered named columns, one row count
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  median, relative tolerance
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod stats;
