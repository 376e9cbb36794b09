/// Data layer: core types, loading, and location selection.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, keep 2003–2021 → SpendingTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SpendingTable │  Vec<SpendingRecord>, column presence, location index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  name or ordinal → LocationDataset
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
