//! Data layer: core types, loading, caching, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse rows, apply row policy + price threshold
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  cache    │  one Arc<Dataset> per source path
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterCriteria → matching indices
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────────┐
//!   │ view / aggregate │  summary, grouped means, ranking, correlation
//!   └──────────────────┘
//! ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
pub mod view;

pub use cache::DatasetCache;
pub use error::{LoadError, ParseError, PipelineError};
pub use filter::{Bounds, FilterCriteria};
pub use loader::{load_file, LoadOptions, RowPolicy};
pub use model::{Dataset, Record, YearMonth};
pub use view::{apply, FilteredView, Summary, ViewOptions};
