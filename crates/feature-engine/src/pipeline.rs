//! Sequential Feature Pipeline
//!
//! Runs the six stages in dependency order over one table: time indexing,
//! material-drop detection, interval statistics, spike detection,
//! curation, and model input assembly. Each stage adds columns; no stage
//! removes rows.

use crate::config::PipelineConfig;
use crate::curate::{FeatureCurator, ModelInputBuilder, ModelInputMatrix};
use crate::error::FeatureError;
use crate::interval::IntervalStatisticsEngine;
use crate::spike::SpikeDetector;
use crate::trash_drop::TrashDropDetector;
use time_series::{TimeIndexer, TimeSeriesTable};
use tracing::info;

/// One-shot feature pipeline for a NOx inference batch.
///
/// Holds configuration only; the curated feature list is threaded through
/// each run as a value, so one instance is safe to reuse across
/// concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    config: PipelineConfig,
}

impl FeaturePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Consume one acquired table and produce the model input matrix with
    /// its ordered feature-name list.
    pub fn run(&self, mut table: TimeSeriesTable) -> Result<ModelInputMatrix, FeatureError> {
        info!(rows = table.len(), "starting NOx feature pipeline");

        TimeIndexer::new().index(&mut table);
        TrashDropDetector::from_config(&self.config).run(&mut table)?;
        let generated = IntervalStatisticsEngine::from_config(&self.config).run(&mut table)?;
        SpikeDetector::from_config(&self.config).run(&mut table)?;
        let features = FeatureCurator::from_config(&self.config).curate(&table, &generated);
        let matrix = ModelInputBuilder::new().build(&table, features)?;

        info!(
            rows = matrix.n_rows(),
            features = matrix.n_features(),
            "feature pipeline complete"
        );
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::StatKind;
    use crate::spike::IS_SPIKE;
    use crate::trash_drop::TRASH_DROP;

    /// Two-hour 1 Hz table: a sinusoidal furnace temperature, one crane
    /// weight-drop event at t = 3600 s, and one target step-change at
    /// t = 5400 s.
    fn synthetic_two_hours() -> TimeSeriesTable {
        let n = 7200;
        let mut table = TimeSeriesTable::new(n);
        let times: Vec<String> = (0..n as i64)
            .map(|i| {
                chrono::DateTime::from_timestamp(1_700_000_000 + i, 0)
                    .unwrap()
                    .to_rfc3339()
            })
            .collect();
        table.set_time_column(times).unwrap();

        let furnace: Vec<Option<f64>> = (0..n)
            .map(|i| Some(850.0 + 30.0 * (i as f64 / 120.0).sin()))
            .collect();
        table.insert_column("bft_eo_fg_t", furnace).unwrap();

        let weight: Vec<Option<f64>> = (0..n)
            .map(|i| Some(if i < 3600 { 500.0 } else { 200.0 }))
            .collect();
        table.insert_column("icf_cra_wt_k", weight).unwrap();

        let nox: Vec<Option<f64>> = (0..n)
            .map(|i| Some(if i < 5400 { 50.0 } else { 70.0 }))
            .collect();
        table.insert_column("nox_value", nox).unwrap();

        table
    }

    fn name_matches_scheme(name: &str, config: &PipelineConfig) -> bool {
        config.channels.iter().any(|channel| {
            config.window_secs.iter().any(|&w| {
                StatKind::ALL
                    .iter()
                    .any(|kind| kind.column_name(channel, w) == name)
            })
        })
    }

    #[test]
    fn test_end_to_end_scenario() {
        let pipeline = FeaturePipeline::default();
        let matrix = pipeline.run(synthetic_two_hours()).unwrap();

        assert_eq!(matrix.n_rows(), 7200);
        // is_spike + 4 present channels + 4 x 5 windows x 8 statistics.
        assert_eq!(matrix.n_features(), 1 + 4 + 4 * 5 * 8);

        // The weight drop fires the detector exactly once, when the
        // pre-drop peak has left the 10-sample trailing-max window.
        let drops = matrix.column(TRASH_DROP).unwrap();
        let fired: Vec<usize> = drops
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 1.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(fired, vec![3609]);

        // The spike flag fires only inside the step-change's active minute.
        let spikes = matrix.column(IS_SPIKE).unwrap();
        let flagged: Vec<usize> = spikes
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 1.0)
            .map(|(i, _)| i)
            .collect();
        assert!(!flagged.is_empty());
        assert!(flagged.iter().all(|&i| (5400..5460).contains(&i)));

        // Every generated column name follows the documented scheme.
        let config = pipeline.config();
        let raw: [&str; 5] = [
            IS_SPIKE,
            "bft_eo_fg_t",
            "icf_cra_wt_k",
            TRASH_DROP,
            "trash_drop_count_30min",
        ];
        for name in &matrix.feature_names {
            if raw.contains(&name.as_str()) {
                continue;
            }
            assert!(name_matches_scheme(name, config), "unexpected column {name}");
        }
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let table = synthetic_two_hours();
        let pipeline = FeaturePipeline::default();

        let first = pipeline.run(table.clone()).unwrap();
        let second = pipeline.run(table).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_degraded_input_still_produces_matrix() {
        // No timestamp column, no sensor channels at all: every stage
        // degrades to zero substitutes and the shape stays well-defined.
        let table = TimeSeriesTable::new(100);
        let matrix = FeaturePipeline::default().run(table).unwrap();

        assert_eq!(matrix.n_rows(), 100);
        // is_spike + the two substituted drop channels + their statistics.
        assert_eq!(matrix.n_features(), 1 + 2 + 2 * 5 * 8);
        assert!(matrix.column(IS_SPIKE).unwrap().iter().all(|&v| v == 0.0));
    }
}
