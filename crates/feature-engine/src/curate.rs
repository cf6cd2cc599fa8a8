//! Feature Curation and Model Input Assembly

use crate::config::PipelineConfig;
use crate::error::FeatureError;
use crate::rolling::timeline;
use crate::spike::IS_SPIKE;
use serde::{Deserialize, Serialize};
use time_series::TimeSeriesTable;
use tracing::{debug, info};

/// Assembles the candidate feature list and prunes columns with excessive
/// missingness.
///
/// The threshold is an absolute missing-sample count, not a fraction, so
/// pruning behavior depends on total row count by design.
#[derive(Debug, Clone)]
pub struct FeatureCurator {
    channels: Vec<String>,
    max_missing: usize,
}

impl FeatureCurator {
    pub fn new(channels: Vec<String>, max_missing: usize) -> Self {
        Self {
            channels,
            max_missing,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.channels.clone(), config.max_missing_per_feature)
    }

    /// Candidate list: spike flag, then raw channels present in the table,
    /// then the generated statistic columns, in stable order.
    pub fn candidates(&self, table: &TimeSeriesTable, generated: &[String]) -> Vec<String> {
        let mut candidates = Vec::with_capacity(1 + self.channels.len() + generated.len());
        candidates.push(IS_SPIKE.to_string());
        for channel in &self.channels {
            if table.has_column(channel) {
                candidates.push(channel.clone());
            }
        }
        candidates.extend(generated.iter().cloned());
        candidates
    }

    /// Return the ordered curated feature list.
    ///
    /// The list is a plain return value: it is valid for this table only
    /// and is never stored on the pipeline.
    pub fn curate(&self, table: &TimeSeriesTable, generated: &[String]) -> Vec<String> {
        let candidates = self.candidates(table, generated);
        let before = candidates.len();

        let curated: Vec<String> = candidates
            .into_iter()
            .filter(|name| {
                let missing = table.missing_count(name).unwrap_or(table.len());
                let keep = missing <= self.max_missing;
                if !keep {
                    debug!(feature = %name, missing, "pruned for excessive missingness");
                }
                keep
            })
            .collect();

        info!(
            kept = curated.len(),
            pruned = before - curated.len(),
            "feature curation complete"
        );
        curated
    }
}

/// Final model-ready matrix: curated columns only, gaps zero-filled,
/// row-aligned with the table's timestamp index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInputMatrix {
    /// Ordered curated feature names; the contract with the serving layer
    pub feature_names: Vec<String>,
    /// Millisecond timestamp per row
    pub timestamps_ms: Vec<i64>,
    /// Row-major feature values, one row per table row
    pub rows: Vec<Vec<f64>>,
}

impl ModelInputMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Position of a feature in each row, if produced
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|f| f == name)
    }

    /// Extract one feature column by name
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.feature_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }
}

/// Projects the table onto the curated feature list and zero-fills the
/// remaining gaps. Rows are never dropped, preserving alignment with the
/// original timestamp sequence even where lookback windows were
/// incomplete.
#[derive(Debug, Clone, Default)]
pub struct ModelInputBuilder;

impl ModelInputBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        table: &TimeSeriesTable,
        features: Vec<String>,
    ) -> Result<ModelInputMatrix, FeatureError> {
        let columns: Vec<&[Option<f64>]> = features
            .iter()
            .map(|name| {
                table
                    .column(name)
                    .ok_or_else(|| FeatureError::MissingColumn(name.clone()))
            })
            .collect::<Result<_, _>>()?;

        let rows: Vec<Vec<f64>> = (0..table.len())
            .map(|i| columns.iter().map(|col| col[i].unwrap_or(0.0)).collect())
            .collect();

        info!(
            rows = rows.len(),
            features = features.len(),
            "model input assembled"
        );
        Ok(ModelInputMatrix {
            feature_names: features,
            timestamps_ms: timeline(table),
            rows,
        })
    }
}
