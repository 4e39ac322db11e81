use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named validation scenario, deserialized from a `[[scenarios]]` table.
///
/// A scenario either points at a JSON page-data file or carries synthesis
/// parameters. Neither or both is not rejected here; the validator reports such a
/// scenario as a failed run instead of aborting the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Path to a JSON object of page key → positions.
    #[serde(default)]
    pub page_data: Option<PathBuf>,
    #[serde(default)]
    pub synthesis: Option<SynthesisParams>,
}

/// Parameters for building page data from the reference org chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisParams {
    /// How many times the reference chart is repeated on the detail page.
    #[serde(default = "default_copies")]
    pub copies: usize,
    /// Also emit direct and indirect/OH roll-up pages partitioned by the rule table.
    #[serde(default)]
    pub include_aggregation: bool,
    /// Attach a contradicting classification to one position on a second page.
    #[serde(default)]
    pub inject_inconsistency: bool,
    /// Number of positions whose department is blanked out.
    #[serde(default)]
    pub drop_departments: usize,
    /// Render-only levels (e.g. "MGL", "VSM") added as one extra Line position each.
    #[serde(default)]
    pub extra_levels: Vec<String>,
}

fn default_copies() -> usize {
    1
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            copies: default_copies(),
            include_aggregation: false,
            inject_inconsistency: false,
            drop_departments: 0,
            extra_levels: Vec::new(),
        }
    }
}
