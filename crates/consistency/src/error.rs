use thiserror::Error;

/// Failures while preparing a scenario's input. They never escape a batch run:
/// the runner turns each one into a `critical` report for that scenario.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Scenario '{name}' could not be loaded: {reason}")]
    ScenarioUnavailable { name: String, reason: String },

    #[error("Scenario '{0}' has neither page data nor synthesis parameters")]
    EmptyScenario(String),

    #[error("Invalid synthesis parameters: {0}")]
    InvalidSynthesis(String),
}
