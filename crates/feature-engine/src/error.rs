//! Feature Engineering Error Types

use thiserror::Error;
use time_series::TableError;

/// Errors from structural misuse of the pipeline.
///
/// Data-quality degradation (missing channels, unmatched lookbacks,
/// excessive missingness) is never an error; those paths warn and
/// substitute defaults.
#[derive(Debug, Clone, Error)]
pub enum FeatureError {
    /// Underlying table invariant violated
    #[error(transparent)]
    Table(#[from] TableError),

    /// A curated feature name does not exist in the table
    #[error("curated feature '{0}' is not present in the table")]
    MissingColumn(String),
}
