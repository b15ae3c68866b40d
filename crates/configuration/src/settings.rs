use crate::error::ConfigError;
use core_types::{GroupingParam, PeriodType, RecordType};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub logging: LoggingSettings,
    pub store: StoreSettings,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()
    }
}

/// Selection and binning parameters for one analytics pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Periods to extract; the result is the union of each period's records.
    pub periods: Vec<PeriodType>,
    pub record_type: RecordType,
    pub group_by: GroupingParam,
    /// Histogram bin width in percentage points. Must be positive.
    pub bin_size_pct: f64,
    /// Materialize empty bins between the lowest and highest observed floor.
    pub fill_empty_bins: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            periods: vec![PeriodType::Test],
            record_type: RecordType::Top,
            group_by: GroupingParam::None,
            bin_size_pct: 5.0,
            fill_empty_bins: false,
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bin_size_pct.is_finite() || self.bin_size_pct <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "analysis.bin_size_pct must be a positive number, got {}",
                self.bin_size_pct
            )));
        }
        if self.periods.is_empty() {
            return Err(ConfigError::ValidationError(
                "analysis.periods must name at least one period".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "optiscope.log".to_string(),
        }
    }
}

/// Location of saved optimization result files.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub results_dir: Option<PathBuf>,
}
