//! Material-Drop Detection
//!
//! Flags discrete waste-feed events from the crane weight channel. The
//! instantaneous weight reading falls sharply right after a load is
//! dumped into the hopper, so a sharp drop in the short trailing maximum
//! marks the event.

use crate::config::{PipelineConfig, TrashDropConfig};
use crate::error::FeatureError;
use crate::rolling::{forward_fill, timeline, trailing_sample_max, trailing_time_sum};
use time_series::TimeSeriesTable;
use tracing::{info, warn};

/// Column holding the per-row drop flag (0/1)
pub const TRASH_DROP: &str = "trash_drop";
/// Column holding the trailing 30-minute drop count
pub const TRASH_DROP_COUNT_30MIN: &str = "trash_drop_count_30min";

/// Detects material-feed events from the crane weight channel.
///
/// The trailing maximum uses a sample-count window (a short denoising
/// filter), while the drop count uses a time-based window (a meaningful
/// real-time rate). The mix is intentional.
#[derive(Debug, Clone)]
pub struct TrashDropDetector {
    weight_channel: String,
    config: TrashDropConfig,
}

impl TrashDropDetector {
    pub fn new(weight_channel: impl Into<String>, config: TrashDropConfig) -> Self {
        Self {
            weight_channel: weight_channel.into(),
            config,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.weight_channel, config.trash_drop.clone())
    }

    /// Add `trash_drop` and `trash_drop_count_30min` to the table
    pub fn run(&self, table: &mut TimeSeriesTable) -> Result<(), FeatureError> {
        let n = table.len();
        let Some(weight) = table.column(&self.weight_channel).map(<[_]>::to_vec) else {
            warn!(
                channel = %self.weight_channel,
                "weight channel missing; substituting zero drop features"
            );
            table.insert_column(TRASH_DROP, vec![Some(0.0); n])?;
            table.insert_column(TRASH_DROP_COUNT_30MIN, vec![Some(0.0); n])?;
            return Ok(());
        };

        let filled = forward_fill(&weight);
        let peak = trailing_sample_max(&filled, self.config.peak_window_samples);

        let mut flags = vec![Some(0.0); n];
        for i in 1..n {
            if let (Some(prev), Some(cur)) = (peak[i - 1], peak[i]) {
                if cur - prev < self.config.drop_threshold {
                    flags[i] = Some(1.0);
                }
            }
        }

        let timestamps = timeline(table);
        let window_ms = i64::from(self.config.count_window_secs) * 1000;
        let counts: Vec<Option<f64>> = trailing_time_sum(&timestamps, &flags, window_ms)
            .into_iter()
            .map(Some)
            .collect();

        let fired = flags.iter().filter(|f| **f == Some(1.0)).count();
        info!(events = fired, "material-drop detection complete");

        table.insert_column(TRASH_DROP, flags)?;
        table.insert_column(TRASH_DROP_COUNT_30MIN, counts)?;
        Ok(())
    }
}
