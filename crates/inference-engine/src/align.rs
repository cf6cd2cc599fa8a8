//! Feature Alignment
//!
//! The curated feature list is the contract between the pipeline and the
//! model: the model's expected features may drift from what a given run
//! actually produced (pruning is data-dependent). Alignment tolerates
//! both directions: expected-but-missing features become zero columns,
//! produced-but-unexpected features are omitted.

use feature_engine::ModelInputMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Model input aligned to the model's own feature order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedInput {
    /// Feature names in model order
    pub feature_names: Vec<String>,
    /// Millisecond timestamp per row, carried from the matrix
    pub timestamps_ms: Vec<i64>,
    /// Row-major values, one row per matrix row
    pub rows: Vec<Vec<f64>>,
    /// Expected by the model but not produced this run (zero-substituted)
    pub missing_from_features: Vec<String>,
    /// Produced this run but not expected by the model (omitted)
    pub omitted_features: Vec<String>,
}

impl AlignedInput {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

/// Aligns a produced matrix against a model's expected feature list
#[derive(Debug, Clone, Default)]
pub struct FeatureAlignment;

impl FeatureAlignment {
    pub fn new() -> Self {
        Self
    }

    pub fn align(&self, model_features: &[String], matrix: &ModelInputMatrix) -> AlignedInput {
        let positions: Vec<Option<usize>> = model_features
            .iter()
            .map(|name| matrix.feature_index(name))
            .collect();

        let missing_from_features: Vec<String> = model_features
            .iter()
            .zip(&positions)
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| name.clone())
            .collect();
        if !missing_from_features.is_empty() {
            warn!(
                count = missing_from_features.len(),
                "model features absent from this run; substituting zeros"
            );
        }

        let omitted_features: Vec<String> = matrix
            .feature_names
            .iter()
            .filter(|name| !model_features.iter().any(|m| m == *name))
            .cloned()
            .collect();
        if !omitted_features.is_empty() {
            debug!(
                count = omitted_features.len(),
                "produced features not expected by the model; omitting"
            );
        }

        let rows: Vec<Vec<f64>> = matrix
            .rows
            .iter()
            .map(|row| {
                positions
                    .iter()
                    .map(|pos| pos.map_or(0.0, |i| row[i]))
                    .collect()
            })
            .collect();

        AlignedInput {
            feature_names: model_features.to_vec(),
            timestamps_ms: matrix.timestamps_ms.clone(),
            rows,
            missing_from_features,
            omitted_features,
        }
    }
}
