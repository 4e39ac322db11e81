use crate::error::ConfigError;
use crate::scenario::ScenarioConfig;
use serde::Deserialize;

/// Highest number of decimal places allowed for distribution percentages.
pub const MAX_PERCENTAGE_SCALE: u32 = 4;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub health: HealthSettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub scenarios: Vec<ScenarioConfig>,
}

/// Thresholds that decide between `warning` and `critical`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthSettings {
    /// Aggregation count drift at or below this absolute value is a warning;
    /// anything larger is a critical `aggregation_mismatch`.
    #[serde(default = "default_minor_drift_threshold")]
    pub minor_drift_threshold: u64,
}

/// Presentation of the distribution section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportSettings {
    /// Decimal places kept on each category percentage.
    #[serde(default = "default_percentage_scale")]
    pub percentage_scale: u32,
}

fn default_minor_drift_threshold() -> u64 {
    2
}

fn default_percentage_scale() -> u32 {
    1
}

// --- Default Implementations ---
// This allows a user to omit whole sections from their toml and still have it
// work with sensible defaults.

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            minor_drift_threshold: default_minor_drift_threshold(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            percentage_scale: default_percentage_scale(),
        }
    }
}

impl Config {
    /// Checks the settings that cannot be expressed in the type system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.percentage_scale > MAX_PERCENTAGE_SCALE {
            return Err(ConfigError::ValidationError(format!(
                "report.percentage_scale must be at most {MAX_PERCENTAGE_SCALE}, got {}",
                self.report.percentage_scale
            )));
        }
        if let Some(unnamed) = self.scenarios.iter().position(|s| s.name.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "scenario #{} has an empty name",
                unnamed + 1
            )));
        }
        Ok(())
    }
}
