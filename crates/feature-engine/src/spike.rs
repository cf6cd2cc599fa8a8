//! Emission-Spike Detection
//!
//! Flags short step-changes in the NOx target signal. A large range
//! combined with low variance over the trailing minute indicates a fast,
//! sustained level shift rather than high-frequency noise.

use crate::config::{PipelineConfig, SpikeConfig};
use crate::error::FeatureError;
use crate::rolling::{timeline, TrailingWindow};
use time_series::TimeSeriesTable;
use tracing::{info, warn};

/// Column holding the per-row spike flag (0/1)
pub const IS_SPIKE: &str = "is_spike";
/// Trailing 1-minute range of the target channel
pub const NOX_RANGE_1MIN: &str = "nox_range_1min";
/// Trailing 1-minute sample standard deviation of the target channel
pub const NOX_STD_1MIN: &str = "nox_std_1min";

/// Detects step-changes in the emission target channel
#[derive(Debug, Clone)]
pub struct SpikeDetector {
    target_channel: String,
    config: SpikeConfig,
}

impl SpikeDetector {
    pub fn new(target_channel: impl Into<String>, config: SpikeConfig) -> Self {
        Self {
            target_channel: target_channel.into(),
            config,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.target_channel, config.spike.clone())
    }

    /// Add `nox_range_1min`, `nox_std_1min`, and `is_spike` to the table
    pub fn run(&self, table: &mut TimeSeriesTable) -> Result<(), FeatureError> {
        let n = table.len();
        let Some(target) = table.column(&self.target_channel).map(<[_]>::to_vec) else {
            warn!(
                channel = %self.target_channel,
                "target channel missing; substituting zero spike features"
            );
            table.insert_column(NOX_RANGE_1MIN, vec![Some(0.0); n])?;
            table.insert_column(NOX_STD_1MIN, vec![Some(0.0); n])?;
            table.insert_column(IS_SPIKE, vec![Some(0.0); n])?;
            return Ok(());
        };

        let timestamps = timeline(table);
        let window_ms = i64::from(self.config.window_secs) * 1000;
        let mut win = TrailingWindow::new(&timestamps, &target, window_ms);

        let mut range_col = Vec::with_capacity(n);
        let mut std_col = Vec::with_capacity(n);
        let mut flags = Vec::with_capacity(n);
        for _ in 0..n {
            let stats = win.step();
            let range = stats.max.zip(stats.min).map(|(max, min)| max - min);
            let spiking = matches!(
                (range, stats.std),
                (Some(r), Some(s)) if r > self.config.range_threshold && s < self.config.std_threshold
            );
            range_col.push(range);
            std_col.push(stats.std);
            flags.push(Some(if spiking { 1.0 } else { 0.0 }));
        }

        let fired = flags.iter().filter(|f| **f == Some(1.0)).count();
        info!(
            rows = n,
            flagged = fired,
            "spike detection complete"
        );

        table.insert_column(NOX_RANGE_1MIN, range_col)?;
        table.insert_column(NOX_STD_1MIN, std_col)?;
        table.insert_column(IS_SPIKE, flags)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The window at row 2 holds exactly {0, x, 2x}: trailing sample std
    /// is exactly x and range exactly 2x, which pins both thresholds.
    fn staircase_table(x: f64) -> TimeSeriesTable {
        let mut table = TimeSeriesTable::new(3);
        table
            .insert_column("nox_value", vec![Some(0.0), Some(x), Some(2.0 * x)])
            .unwrap();
        table
    }

    fn run_default(table: &mut TimeSeriesTable) {
        SpikeDetector::new("nox_value", SpikeConfig::default())
            .run(table)
            .unwrap();
    }

    #[test]
    fn test_range_exactly_eight_not_flagged() {
        // x = 4: range 8 (not > 8), std 4 (< 6).
        let mut table = staircase_table(4.0);
        run_default(&mut table);
        assert_eq!(table.column(NOX_RANGE_1MIN).unwrap()[2], Some(8.0));
        assert!(table
            .column(IS_SPIKE)
            .unwrap()
            .iter()
            .all(|f| *f == Some(0.0)));
    }

    #[test]
    fn test_std_exactly_six_not_flagged() {
        // x = 6: range 12 (> 8) but std exactly 6 (not < 6).
        let mut table = staircase_table(6.0);
        run_default(&mut table);
        assert_eq!(table.column(NOX_STD_1MIN).unwrap()[2], Some(6.0));
        assert!(table
            .column(IS_SPIKE)
            .unwrap()
            .iter()
            .all(|f| *f == Some(0.0)));
    }

    #[test]
    fn test_range_nine_std_under_six_flagged() {
        // x = 4.5: range 9 (> 8), std 4.5 (< 6).
        let mut table = staircase_table(4.5);
        run_default(&mut table);
        let flags = table.column(IS_SPIKE).unwrap();
        assert_eq!(flags[2], Some(1.0));
        // First row has a single sample: no std, so no flag.
        assert_eq!(flags[0], Some(0.0));
    }

    #[test]
    fn test_missing_target_substitutes_zeros() {
        let mut table = TimeSeriesTable::new(4);
        table.insert_column("other", vec![Some(1.0); 4]).unwrap();
        run_default(&mut table);
        assert_eq!(table.column(IS_SPIKE).unwrap(), &[Some(0.0); 4]);
        assert_eq!(table.column(NOX_RANGE_1MIN).unwrap(), &[Some(0.0); 4]);
        assert_eq!(table.column(NOX_STD_1MIN).unwrap(), &[Some(0.0); 4]);
    }
}
