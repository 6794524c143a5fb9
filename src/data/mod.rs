/// Data layer: bands, core types, loading, and quality cuts.
///
/// Architecture:
/// ```text
///  .parquet / .csv / .dat         iso_<name>_<age>.txt  (×5)
///        │                                │
///        ▼                                ▼
///   ┌──────────┐                   ┌────────────┐
///   │  loader   │ → Catalog         │ isochrone   │ → IsochroneTable
///   └──────────┘                   └────────────┘
///        │                                │
///        ▼                                │
///   ┌──────────┐                          │
///   │  filter   │  quality cuts → kept / removed indices
///   └──────────┘                          │
///        └──────────────┬─────────────────┘
///                       ▼
///                  crate::cmd  (plot-ready frame)
/// ```

pub mod band;
pub mod filter;
pub mod isochrone;
pub mod loader;
pub mod model;
