//! Interval Summary Statistics
//!
//! The computational core: for every configured channel and every lookback
//! window, eight trailing statistics are derived in one amortized sweep
//! per (channel, window) pair. Channels are independent; a channel is
//! either fully processed or fully skipped.

use crate::columns::StatKind;
use crate::config::PipelineConfig;
use crate::error::FeatureError;
use crate::rolling::{
    asof_exact, safe_denominator, timeline, TrailingWindow, ZERO_DENOMINATOR_EPSILON,
};
use time_series::TimeSeriesTable;
use tracing::{debug, info, warn};

/// Derives trailing mean/std, time-anchored rate and range change,
/// momentum extremes, and start-relative extremes per (channel, window).
///
/// The anchor value "at `t - w`" comes from a zero-tolerance exact-time
/// match against the table's own index; on irregularly sampled data this
/// intentionally yields a missing value rather than the nearest sample.
#[derive(Debug, Clone)]
pub struct IntervalStatisticsEngine {
    channels: Vec<String>,
    window_secs: Vec<u32>,
}

impl IntervalStatisticsEngine {
    pub fn new(channels: Vec<String>, window_secs: Vec<u32>) -> Self {
        Self {
            channels,
            window_secs,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.channels.clone(), config.window_secs.clone())
    }

    /// Add all statistic columns to the table; returns the generated
    /// column names in candidate-feature order.
    pub fn run(&self, table: &mut TimeSeriesTable) -> Result<Vec<String>, FeatureError> {
        let timestamps = timeline(table);
        let n = table.len();
        let mut generated = Vec::new();

        for channel in &self.channels {
            let Some(values) = table.column(channel).map(<[_]>::to_vec) else {
                warn!(channel = %channel, "channel missing; skipping interval statistics");
                continue;
            };
            debug!(channel = %channel, "computing interval statistics");

            // One instantaneous-rate series per channel, shared by every
            // window's momentum aggregation.
            let inst_rate = instantaneous_rate(&timestamps, &values);

            for &window in &self.window_secs {
                let window_ms = i64::from(window) * 1000;
                let mut value_win = TrailingWindow::new(&timestamps, &values, window_ms);
                let mut rate_win = TrailingWindow::new(&timestamps, &inst_rate, window_ms);

                let mut cols: [Vec<Option<f64>>; 8] =
                    std::array::from_fn(|_| Vec::with_capacity(n));

                for i in 0..n {
                    let stats = value_win.step();
                    let momentum = rate_win.step();
                    let end = values[i];
                    let start = asof_exact(&timestamps, &values, timestamps[i] - window_ms);

                    cols[0].push(stats.mean);
                    cols[1].push(stats.std);
                    cols[2].push(match (end, start) {
                        (Some(e), Some(s)) => Some((e - s) / safe_denominator(s)),
                        _ => None,
                    });
                    cols[3].push(end.zip(start).map(|(e, s)| e - s));
                    cols[4].push(momentum.max);
                    cols[5].push(momentum.min);
                    cols[6].push(stats.max.zip(start).map(|(m, s)| m - s));
                    cols[7].push(stats.min.zip(start).map(|(m, s)| m - s));
                }

                for (kind, col) in StatKind::ALL.into_iter().zip(cols) {
                    let name = kind.column_name(channel, window);
                    table.insert_column(&name, col)?;
                    generated.push(name);
                }
            }
        }

        info!(columns = generated.len(), "interval statistics complete");
        Ok(generated)
    }
}

/// Per-sample rate of change: value delta over elapsed seconds since the
/// previous sample, zero elapsed time replaced by the safety epsilon.
fn instantaneous_rate(timestamps: &[i64], values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 {
            out.push(None);
            continue;
        }
        out.push(match (values[i], values[i - 1]) {
            (Some(cur), Some(prev)) => {
                let mut dt = (timestamps[i] - timestamps[i - 1]) as f64 / 1000.0;
                if dt == 0.0 {
                    dt = ZERO_DENOMINATOR_EPSILON;
                }
                Some((cur - prev) / dt)
            }
            _ => None,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time_series::TimeIndexer;

    const ALL_WINDOWS: [u32; 5] = [60, 180, 300, 600, 1800];

    /// Dense 1 Hz table with RFC 3339 timestamps starting at epoch
    fn dense_table(values: Vec<Option<f64>>) -> TimeSeriesTable {
        let n = values.len();
        let mut table = TimeSeriesTable::new(n);
        let times: Vec<String> = (0..n as i64)
            .map(|i| {
                chrono::DateTime::from_timestamp(i, 0)
                    .unwrap()
                    .to_rfc3339()
            })
            .collect();
        table.set_time_column(times).unwrap();
        table.insert_column("br1_eo_o2_a", values).unwrap();
        TimeIndexer::new().index(&mut table);
        table
    }

    fn engine(windows: &[u32]) -> IntervalStatisticsEngine {
        IntervalStatisticsEngine::new(vec!["br1_eo_o2_a".to_string()], windows.to_vec())
    }

    #[test]
    fn test_trailing_stats_match_naive_for_all_windows() {
        let n = 2000;
        let values: Vec<Option<f64>> =
            (0..n).map(|i| Some((i as f64 * 0.37).sin() * 10.0 + 50.0)).collect();
        let mut table = dense_table(values.clone());
        engine(&ALL_WINDOWS).run(&mut table).unwrap();

        for &w in &ALL_WINDOWS {
            let mean_col = table
                .column(&StatKind::Mean.column_name("br1_eo_o2_a", w))
                .unwrap();
            let std_col = table
                .column(&StatKind::Std.column_name("br1_eo_o2_a", w))
                .unwrap();
            for &i in &[5usize, 100, 777, 1999] {
                let lo = i.saturating_sub(w as usize - 1);
                let samples: Vec<f64> = (lo..=i).map(|j| values[j].unwrap()).collect();
                let m = samples.iter().sum::<f64>() / samples.len() as f64;
                assert!((mean_col[i].unwrap() - m).abs() < 1e-9, "mean w={w} i={i}");
                if samples.len() >= 2 {
                    let var = samples.iter().map(|v| (v - m).powi(2)).sum::<f64>()
                        / (samples.len() - 1) as f64;
                    assert!(
                        (std_col[i].unwrap() - var.sqrt()).abs() < 1e-9,
                        "std w={w} i={i}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_exact_match_rate_of_change_dense() {
        let n = 200;
        let values: Vec<Option<f64>> = (0..n).map(|i| Some(10.0 + i as f64)).collect();
        let mut table = dense_table(values.clone());
        engine(&[60]).run(&mut table).unwrap();

        let rate = table
            .column(&StatKind::MeanRateChange.column_name("br1_eo_o2_a", 60))
            .unwrap();
        let range = table
            .column(&StatKind::RangeChange.column_name("br1_eo_o2_a", 60))
            .unwrap();

        // Before one full window there is no sample at t - 60s.
        assert!(rate[59].is_none());
        for i in 60..n {
            let start = values[i - 60].unwrap();
            let end = values[i].unwrap();
            assert!((rate[i].unwrap() - (end - start) / start).abs() < 1e-12);
            assert!((range[i].unwrap() - 60.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rate_of_change_zero_start_uses_epsilon() {
        let mut values: Vec<Option<f64>> = (0..130).map(|i| Some(i as f64)).collect();
        values[0] = Some(0.0);
        let mut table = dense_table(values);
        engine(&[60]).run(&mut table).unwrap();

        let rate = table
            .column(&StatKind::MeanRateChange.column_name("br1_eo_o2_a", 60))
            .unwrap();
        // Start value at row 0 is exactly zero: denominator is 1e-10.
        assert!((rate[60].unwrap() - 60.0 / 1e-10).abs() / (60.0 / 1e-10) < 1e-12);
        assert!(rate[60].unwrap().is_finite());
    }

    #[test]
    fn test_irregular_sampling_yields_missing_not_nearest() {
        // 0s, 1s, then a gap: 61s lands exactly 60s after 1s, but 62.5s
        // has no sample at 2.5s, so the anchor is missing.
        let mut table = TimeSeriesTable::new(4);
        table
            .set_time_column(
                [0.0, 1.0, 61.0, 62.5]
                    .iter()
                    .map(|s| {
                        chrono::DateTime::from_timestamp_millis((s * 1000.0) as i64)
                            .unwrap()
                            .to_rfc3339()
                    })
                    .collect(),
            )
            .unwrap();
        table
            .insert_column(
                "br1_eo_o2_a",
                vec![Some(5.0), Some(10.0), Some(20.0), Some(40.0)],
            )
            .unwrap();
        TimeIndexer::new().index(&mut table);
        engine(&[60]).run(&mut table).unwrap();

        let rate = table
            .column(&StatKind::MeanRateChange.column_name("br1_eo_o2_a", 60))
            .unwrap();
        assert!((rate[2].unwrap() - (20.0 - 10.0) / 10.0).abs() < 1e-12);
        assert!(rate[3].is_none());
    }

    #[test]
    fn test_momentum_and_start_relative_extremes() {
        // Piecewise series: rises by 2/s for 100 s, falls by 1/s after.
        let n = 200;
        let values: Vec<Option<f64>> = (0..n)
            .map(|i| {
                Some(if i < 100 {
                    2.0 * i as f64
                } else {
                    200.0 - (i as f64 - 100.0)
                })
            })
            .collect();
        let mut table = dense_table(values.clone());
        engine(&[60]).run(&mut table).unwrap();

        let up = table
            .column(&StatKind::MomentumMaxUp.column_name("br1_eo_o2_a", 60))
            .unwrap();
        let down = table
            .column(&StatKind::MomentumMaxDown.column_name("br1_eo_o2_a", 60))
            .unwrap();
        // Window straddling the peak sees both slopes.
        assert_eq!(up[130], Some(2.0));
        assert_eq!(down[130], Some(-1.0));
        // Deep in the falling leg only -1/s remains.
        assert_eq!(up[199], Some(-1.0));
        assert_eq!(down[199], Some(-1.0));

        let max_inc = table
            .column(&StatKind::MaxIncreaseFromStart.column_name("br1_eo_o2_a", 60))
            .unwrap();
        let max_dec = table
            .column(&StatKind::MaxDecreaseFromStart.column_name("br1_eo_o2_a", 60))
            .unwrap();
        // Rising leg, window (t-60, t]: max = v[i], min = v[i-59], start = v[i-60].
        let i = 90;
        assert!((max_inc[i].unwrap() - (values[i].unwrap() - values[i - 60].unwrap())).abs() < 1e-12);
        assert!(
            (max_dec[i].unwrap() - (values[i - 59].unwrap() - values[i - 60].unwrap())).abs()
                < 1e-12
        );
    }

    #[test]
    fn test_missing_channel_skipped() {
        let mut table = dense_table(vec![Some(1.0); 10]);
        let generated = IntervalStatisticsEngine::new(
            vec!["br1_eo_o2_a".to_string(), "absent_channel".to_string()],
            vec![60],
        )
        .run(&mut table)
        .unwrap();

        assert_eq!(generated.len(), StatKind::ALL.len());
        assert!(generated.iter().all(|name| name.starts_with("br1_eo_o2_a")));
    }
}
