//! NOx Model Serving Boundary
//!
//! Aligns the pipeline's produced features against a trained model's
//! expected feature list and exposes the prediction interface. Model
//! artifact storage is external; a mock mode keeps the pipeline
//! exercisable end to end without one.

mod align;
mod engine;

pub use align::{AlignedInput, FeatureAlignment};
pub use engine::{NoxPredictor, Prediction};

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Model is not loaded")]
    NotLoaded,
    #[error("Invalid input width: model expects {expected} features, got {actual}")]
    InvalidInputWidth { expected: usize, actual: usize },
}
