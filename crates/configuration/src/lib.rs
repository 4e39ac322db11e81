use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod scenario;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use scenario::{ScenarioConfig, SynthesisParams};
pub use settings::{Config, HealthSettings, MAX_PERCENTAGE_SCALE, ReportSettings};

/// Prefix for environment overrides, e.g. `STAFFING_AUDIT_HEALTH__MINOR_DRIFT_THRESHOLD=5`.
pub const ENV_PREFIX: &str = "STAFFING_AUDIT";

/// Loads the application configuration from `path` (typically `validation.toml`).
///
/// The file is optional: when it does not exist every section falls back to its
/// defaults. Environment variables with the [`ENV_PREFIX`] override file values.
/// The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        path = %path.display(),
        scenarios = config.scenarios.len(),
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.health, HealthSettings::default());
        assert_eq!(config.report.percentage_scale, 1);
        assert!(config.scenarios.is_empty());
    }

    #[test]
    fn reads_thresholds_and_scenarios() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validation.toml");
        fs::write(
            &path,
            r#"
[health]
minor_drift_threshold = 5

[report]
percentage_scale = 2

[[scenarios]]
name = "baseline"
description = "Reference chart"
synthesis = { copies = 3, include_aggregation = true }

[[scenarios]]
name = "from-file"
page_data = "fixtures/pages.json"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.health.minor_drift_threshold, 5);
        assert_eq!(config.report.percentage_scale, 2);
        assert_eq!(config.scenarios.len(), 2);

        let synthesis = config.scenarios[0].synthesis.as_ref().unwrap();
        assert_eq!(synthesis.copies, 3);
        assert!(synthesis.include_aggregation);
        assert!(!synthesis.inject_inconsistency);
        assert_eq!(
            config.scenarios[1].page_data.as_deref(),
            Some(Path::new("fixtures/pages.json"))
        );
    }

    #[test]
    fn rejects_out_of_range_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validation.toml");
        fs::write(&path, "[report]\npercentage_scale = 9\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::ValidationError(_))));
    }
}
