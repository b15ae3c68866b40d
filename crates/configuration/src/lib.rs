use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{AnalysisSettings, Config, LoggingSettings, StoreSettings};
pub use telemetry::init_tracing;

/// The configuration file read when the caller does not name one.
pub const DEFAULT_CONFIG_FILE: &str = "optiscope.toml";

/// Loads the application configuration.
///
/// The TOML file is optional; every section falls back to its defaults. Environment
/// variables prefixed with `OPTISCOPE__` override file values, e.g.
/// `OPTISCOPE__ANALYSIS__BIN_SIZE_PCT=2` or `OPTISCOPE__ANALYSIS__PERIODS=test,train`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    let builder = config::Config::builder()
        .add_source(config::File::from(file).required(path.is_some()))
        .add_source(
            config::Environment::with_prefix("OPTISCOPE")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("analysis.periods")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{GroupingParam, PeriodType, RecordType};
    use std::io::Write;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[analysis]
periods = ["train", "simulation"]
record_type = "all"
group_by = "n_tickers"
bin_size_pct = 2.0

[logging]
level = "debug"
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.analysis.periods, vec![PeriodType::Train, PeriodType::Simulation]);
        assert_eq!(config.analysis.record_type, RecordType::All);
        assert_eq!(config.analysis.group_by, GroupingParam::NTickers);
        assert_eq!(config.analysis.bin_size_pct, 2.0);
        assert!(!config.analysis.fill_empty_bins);
        assert_eq!(config.logging.level, "debug");
        assert!(config.store.results_dir.is_none());
    }

    #[test]
    fn an_invalid_bin_size_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[analysis]\nbin_size_pct = -1.0").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn a_named_file_must_exist() {
        let err = load_config(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
