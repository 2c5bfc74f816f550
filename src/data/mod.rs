/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset   (cache: once per source)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  grouping column + numeric columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  selected grouping values → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌────────────────────┐
///   │ aggregate/describe  │  means, ranks, correlation, summary
///   └────────────────────┘
/// ```
/// `pipeline::compute` runs the last two stages for one request.

pub mod aggregate;
pub mod cache;
pub mod describe;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod schema;
