/// Data layer: core types, loading, and calendar-day selection.
///
/// Architecture:
/// ```text
///  .csv (station export) / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode, skip preamble, parse → HistoricalSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ HistoricalSeries │  Vec<Observation>, sorted by date
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  same month/day across years, exact-date lookup
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
