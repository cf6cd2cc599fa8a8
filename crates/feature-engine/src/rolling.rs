//! Trailing-Window Kernels
//!
//! Amortized linear-time building blocks shared by the detectors and the
//! interval statistics engine: a running sum / sum-of-squares accumulator
//! for mean and std, monotonic deques for max and min, a two-pointer sweep
//! over time-based windows, and the zero-tolerance asof lookup.
//!
//! Time windows are left-open, right-closed: a window of length `w` ending
//! at `t` covers samples with timestamps in `(t - w, t]`. Missing samples
//! never enter a window.

use std::collections::VecDeque;
use time_series::TimeSeriesTable;
use tracing::debug;

/// Substituted for zero denominators in rate computations
pub(crate) const ZERO_DENOMINATOR_EPSILON: f64 = 1e-10;

/// Millisecond timeline for a table, with a positional fallback for tables
/// that were never indexed (stage used standalone).
pub(crate) fn timeline(table: &TimeSeriesTable) -> Vec<i64> {
    match table.index_ms() {
        Some(index) => index.to_vec(),
        None => {
            debug!("table has no index; using positional timeline");
            (0..table.len() as i64).map(|i| i * 1000).collect()
        }
    }
}

/// Replace a zero denominator with the division-safety epsilon
pub(crate) fn safe_denominator(value: f64) -> f64 {
    if value == 0.0 {
        ZERO_DENOMINATOR_EPSILON
    } else {
        value
    }
}

/// Backward asof lookup with zero tolerance: the value whose timestamp is
/// exactly `target`, or `None`. Duplicate timestamps resolve to the last
/// occurrence.
pub(crate) fn asof_exact(
    timestamps: &[i64],
    values: &[Option<f64>],
    target: i64,
) -> Option<f64> {
    let idx = timestamps.partition_point(|&t| t <= target);
    if idx > 0 && timestamps[idx - 1] == target {
        values[idx - 1]
    } else {
        None
    }
}

/// Running first and second moments of the samples inside a window
#[derive(Debug, Clone, Default)]
struct Moments {
    count: usize,
    sum: f64,
    sumsq: f64,
}

impl Moments {
    fn add(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        self.sumsq += x * x;
    }

    fn remove(&mut self, x: f64) {
        self.count -= 1;
        self.sum -= x;
        self.sumsq -= x * x;
    }

    fn mean(&self) -> Option<f64> {
        (self.count >= 1).then(|| self.sum / self.count as f64)
    }

    /// Sample standard deviation; needs at least two samples
    fn sample_std(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as f64;
        let var = (self.sumsq - self.sum * self.sum / n) / (n - 1.0);
        // Cancellation can push a tiny variance below zero.
        Some(var.max(0.0).sqrt())
    }
}

/// Monotonic deque tracking the max or min of a sliding range
#[derive(Debug, Clone)]
pub(crate) struct MonotonicExtreme {
    entries: VecDeque<(usize, f64)>,
    take_max: bool,
}

impl MonotonicExtreme {
    pub(crate) fn new_max() -> Self {
        Self {
            entries: VecDeque::new(),
            take_max: true,
        }
    }

    pub(crate) fn new_min() -> Self {
        Self {
            entries: VecDeque::new(),
            take_max: false,
        }
    }

    pub(crate) fn push(&mut self, idx: usize, value: f64) {
        while let Some(&(_, back)) = self.entries.back() {
            let dominated = if self.take_max {
                back <= value
            } else {
                back >= value
            };
            if dominated {
                self.entries.pop_back();
            } else {
                break;
            }
        }
        self.entries.push_back((idx, value));
    }

    /// Drop entries whose row index precedes `start`
    pub(crate) fn evict_before(&mut self, start: usize) {
        while self.entries.front().is_some_and(|&(i, _)| i < start) {
            self.entries.pop_front();
        }
    }

    pub(crate) fn current(&self) -> Option<f64> {
        self.entries.front().map(|&(_, v)| v)
    }
}

/// Statistics of one trailing window position
#[derive(Debug, Clone, Copy)]
pub(crate) struct WindowStats {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

/// Two-pointer sweep producing trailing time-window statistics row by row
pub(crate) struct TrailingWindow<'a> {
    timestamps: &'a [i64],
    values: &'a [Option<f64>],
    window_ms: i64,
    pos: usize,
    start: usize,
    moments: Moments,
    maxima: MonotonicExtreme,
    minima: MonotonicExtreme,
}

impl<'a> TrailingWindow<'a> {
    pub(crate) fn new(timestamps: &'a [i64], values: &'a [Option<f64>], window_ms: i64) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        Self {
            timestamps,
            values,
            window_ms,
            pos: 0,
            start: 0,
            moments: Moments::default(),
            maxima: MonotonicExtreme::new_max(),
            minima: MonotonicExtreme::new_min(),
        }
    }

    /// Advance one row and return the stats of the window ending at it
    pub(crate) fn step(&mut self) -> WindowStats {
        let i = self.pos;
        self.pos += 1;

        if let Some(v) = self.values[i] {
            self.moments.add(v);
            self.maxima.push(i, v);
            self.minima.push(i, v);
        }

        // Evict rows at or before t - w (window is left-open).
        let cutoff = self.timestamps[i] - self.window_ms;
        while self.start < i && self.timestamps[self.start] <= cutoff {
            if let Some(v) = self.values[self.start] {
                self.moments.remove(v);
            }
            self.start += 1;
        }
        self.maxima.evict_before(self.start);
        self.minima.evict_before(self.start);

        WindowStats {
            mean: self.moments.mean(),
            std: self.moments.sample_std(),
            max: self.maxima.current(),
            min: self.minima.current(),
        }
    }
}

/// Trailing maximum over a fixed sample-count window.
///
/// The result is present only where the window holds `window` filled
/// samples, so head rows (and any row whose window still contains a gap)
/// stay missing.
pub(crate) fn trailing_sample_max(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut maxima = MonotonicExtreme::new_max();
    let mut present = 0usize;
    let mut out = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        if let Some(v) = *value {
            present += 1;
            maxima.push(i, v);
        }
        if i >= window {
            let leaving = i - window;
            if values[leaving].is_some() {
                present -= 1;
            }
            maxima.evict_before(leaving + 1);
        }
        out.push(if present >= window { maxima.current() } else { None });
    }
    out
}

/// Trailing sum over a time-based window; start-of-series gaps count as 0
pub(crate) fn trailing_time_sum(
    timestamps: &[i64],
    values: &[Option<f64>],
    window_ms: i64,
) -> Vec<f64> {
    let mut start = 0usize;
    let mut sum = 0.0;
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if let Some(v) = values[i] {
            sum += v;
        }
        let cutoff = timestamps[i] - window_ms;
        while start < i && timestamps[start] <= cutoff {
            if let Some(v) = values[start] {
                sum -= v;
            }
            start += 1;
        }
        out.push(sum);
    }
    out
}

/// Forward-fill: each missing sample takes the last seen value
pub(crate) fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}
