//! NOx Predictor Implementation

use crate::align::AlignedInput;
use crate::InferenceError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One predicted emission value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted NOx concentration
    pub nox: f64,
    /// Timestamp of the feature row this prediction belongs to
    pub timestamp_ms: i64,
}

/// NOx regression predictor (mock implementation until a model artifact
/// is wired in).
pub struct NoxPredictor {
    /// Model artifact path
    model_path: String,
    /// Whether the model is loaded
    loaded: bool,
    /// Enable mock mode (no actual model)
    mock_mode: bool,
}

impl NoxPredictor {
    /// Create a predictor for a model artifact
    pub fn new(model_path: &str) -> Result<Self, InferenceError> {
        info!("Creating NOx predictor with model: {}", model_path);
        Ok(Self {
            model_path: model_path.to_string(),
            loaded: false,
            mock_mode: true, // Mock until artifact loading lands
        })
    }

    /// Create a mock predictor for testing
    pub fn mock() -> Self {
        info!("Creating mock NOx predictor");
        Self {
            model_path: "mock".to_string(),
            loaded: true,
            mock_mode: true,
        }
    }

    /// Load the model artifact
    pub fn load(&mut self) -> Result<(), InferenceError> {
        if self.mock_mode {
            debug!("Mock mode: skipping model load");
            self.loaded = true;
            return Ok(());
        }
        Err(InferenceError::ModelLoadError(format!(
            "no loader for artifact '{}'",
            self.model_path
        )))
    }

    /// Predict one NOx value per aligned input row
    pub async fn predict(&self, input: &AlignedInput) -> Result<Vec<Prediction>, InferenceError> {
        if !self.loaded {
            return Err(InferenceError::NotLoaded);
        }
        let width = input.n_features();
        for row in &input.rows {
            if row.len() != width {
                return Err(InferenceError::InvalidInputWidth {
                    expected: width,
                    actual: row.len(),
                });
            }
        }

        let predictions = input
            .rows
            .iter()
            .zip(&input.timestamps_ms)
            .map(|(row, &timestamp_ms)| Prediction {
                nox: self.mock_predict(input, row),
                timestamp_ms,
            })
            .collect();
        debug!(rows = input.n_rows(), "prediction complete");
        Ok(predictions)
    }

    /// Deterministic rule-based estimate: lean on the analyzer's trailing
    /// minute mean when it was produced, otherwise a plant baseline.
    fn mock_predict(&self, input: &AlignedInput, row: &[f64]) -> f64 {
        const BASELINE: f64 = 45.0;
        input
            .feature_names
            .iter()
            .position(|name| name == "icf_tms_nox_a_mean_60s")
            .map_or(BASELINE, |idx| 0.9 * row[idx] + 0.1 * BASELINE)
    }

    /// Check if the model is loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Get the model artifact path
    pub fn model_path(&self) -> &str {
        &self.model_path
    }
}
