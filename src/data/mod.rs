/// Data layer: station records, loading, filtering and the wire formats
/// of the prediction and geocoding endpoints.
///
/// Architecture:
/// ```text
///  /station_data  or  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → StationDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ StationDataset │  Arc<[StationRecord]>, never mutated
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  viewport + cutoff → filtered indices
///   └──────────┘
///        │
///        ├──▶ markers (display)
///        └──▶ prediction payload (submission) ──▶ /run_model
/// ```

pub mod filter;
pub mod geocode;
pub mod loader;
pub mod model;
pub mod prediction;
