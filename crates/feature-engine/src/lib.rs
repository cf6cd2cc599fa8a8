//! NOx Feature Engineering Pipeline
//!
//! Converts an irregularly sampled combustion sensor table into a
//! fixed-width, model-ready feature matrix: trailing interval statistics
//! over five lookback windows, material-drop and emission-spike event
//! detection, missingness-based curation, and final zero-filled assembly.

mod columns;
mod config;
mod curate;
mod error;
mod interval;
mod pipeline;
mod rolling;
mod spike;
mod trash_drop;

pub use columns::StatKind;
pub use config::{PipelineConfig, SpikeConfig, TrashDropConfig, TIME_COLUMN};
pub use curate::{FeatureCurator, ModelInputBuilder, ModelInputMatrix};
pub use error::FeatureError;
pub use interval::IntervalStatisticsEngine;
pub use pipeline::FeaturePipeline;
pub use spike::{SpikeDetector, IS_SPIKE, NOX_RANGE_1MIN, NOX_STD_1MIN};
pub use trash_drop::{TrashDropDetector, TRASH_DROP, TRASH_DROP_COUNT_30MIN};
