//! Timestamp-Keyed Sensor Table
//!
//! Provides the columnar table shared by all pipeline stages and the
//! indexer that re-keys it by its timestamp column.

mod error;
mod indexer;
mod table;

pub use error::TableError;
pub use indexer::TimeIndexer;
pub use table::TimeSeriesTable;
