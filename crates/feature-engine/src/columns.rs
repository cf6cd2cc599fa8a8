//! Feature Column Enumeration
//!
//! Generated columns are enumerated as a structured (channel x window x
//! statistic) cross product rather than built ad hoc, so the candidate
//! feature set is testable in isolation.

use serde::{Deserialize, Serialize};

/// One of the eight trailing statistics derived per (channel, window)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatKind {
    /// Trailing mean over the window
    Mean,
    /// Trailing sample standard deviation
    Std,
    /// (current - start) / start, with the value at exactly `t - w` as start
    MeanRateChange,
    /// current - start, unscaled
    RangeChange,
    /// Maximum per-sample instantaneous rate in the window
    MomentumMaxUp,
    /// Minimum per-sample instantaneous rate in the window
    MomentumMaxDown,
    /// Trailing maximum minus the start value
    MaxIncreaseFromStart,
    /// Trailing minimum minus the start value
    MaxDecreaseFromStart,
}

impl StatKind {
    /// All statistics, in generated-column order
    pub const ALL: [StatKind; 8] = [
        StatKind::Mean,
        StatKind::Std,
        StatKind::MeanRateChange,
        StatKind::RangeChange,
        StatKind::MomentumMaxUp,
        StatKind::MomentumMaxDown,
        StatKind::MaxIncreaseFromStart,
        StatKind::MaxDecreaseFromStart,
    ];

    /// Column-name suffix for this statistic
    pub fn suffix(&self) -> &'static str {
        match self {
            StatKind::Mean => "mean",
            StatKind::Std => "std",
            StatKind::MeanRateChange => "mean_rate_change",
            StatKind::RangeChange => "range_change",
            StatKind::MomentumMaxUp => "momentum_max_up",
            StatKind::MomentumMaxDown => "momentum_max_down",
            StatKind::MaxIncreaseFromStart => "max_increase_from_start",
            StatKind::MaxDecreaseFromStart => "max_decrease_from_start",
        }
    }

    /// Materialized column name for a (channel, window) pair
    pub fn column_name(&self, channel: &str, window_secs: u32) -> String {
        format!("{channel}_{}_{window_secs}s", self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names_match_scheme() {
        assert_eq!(
            StatKind::Mean.column_name("br1_eo_o2_a", 60),
            "br1_eo_o2_a_mean_60s"
        );
        assert_eq!(
            StatKind::MaxDecreaseFromStart.column_name("icf_cra_wt_k", 1800),
            "icf_cra_wt_k_max_decrease_from_start_1800s"
        );
    }

    #[test]
    fn test_cross_product_size() {
        // 17 channels x 5 windows x 8 statistics = 680 generated columns
        let per_channel = 5 * StatKind::ALL.len();
        assert_eq!(17 * per_channel, 680);
    }
}
