//! Pipeline Configuration

use serde::{Deserialize, Serialize};

/// Name of the timestamp column, normalized by the acquisition layer
pub const TIME_COLUMN: &str = "_time_gateway";

/// Full pipeline configuration.
///
/// All values are fixed plant constants; `Default` carries the production
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sensor channels fed to the interval statistics engine, in feature order
    pub channels: Vec<String>,
    /// Lookback window lengths in seconds
    pub window_secs: Vec<u32>,
    /// Crane weight channel used for material-drop detection
    pub weight_channel: String,
    /// Emission target channel used for spike detection
    pub target_channel: String,
    /// Material-drop detection parameters
    pub trash_drop: TrashDropConfig,
    /// Emission-spike detection parameters
    pub spike: SpikeConfig,
    /// Absolute missing-sample count above which a feature is pruned
    pub max_missing_per_feature: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channels: [
                "bft_eo_fg_t",
                "br1_eo_fg_t",
                "br1_eo_o2_a",
                "br1_eo_st_t",
                "dr1_eq_bw_c",
                "icf_ccs_fg_t_1",
                "icf_cra_wt_k",
                "icf_ff1_ar_f_1",
                "icf_ff1_ss_s_1",
                "icf_ff1_ss_s_2",
                "icf_ff2_ss_s_1",
                "icf_idf_ss_s_1",
                "icf_scs_fg_t_1",
                "icf_tms_nox_a",
                "sdr_htr_fg_t",
                "trash_drop",
                "trash_drop_count_30min",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            window_secs: vec![60, 180, 300, 600, 1800],
            weight_channel: "icf_cra_wt_k".to_string(),
            target_channel: "nox_value".to_string(),
            trash_drop: TrashDropConfig::default(),
            spike: SpikeConfig::default(),
            max_missing_per_feature: 10_000,
        }
    }
}

/// Material-drop detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashDropConfig {
    /// Sample-count window for the denoising trailing maximum
    pub peak_window_samples: usize,
    /// A trailing-max first difference below this flags a drop
    pub drop_threshold: f64,
    /// Time window for the drop-rate count, in seconds
    pub count_window_secs: u32,
}

impl Default for TrashDropConfig {
    fn default() -> Self {
        Self {
            peak_window_samples: 10,
            drop_threshold: -10.0,
            count_window_secs: 1800,
        }
    }
}

/// Emission-spike detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeConfig {
    /// Trailing window over the target channel, in seconds
    pub window_secs: u32,
    /// Range must strictly exceed this
    pub range_threshold: f64,
    /// Standard deviation must be strictly below this
    pub std_threshold: f64,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            range_threshold: 8.0,
            std_threshold: 6.0,
        }
    }
}
