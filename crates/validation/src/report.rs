use classification::RuleId;
use core_types::{Classification, Level};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tally of positions per cost category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub direct: usize,
    pub indirect: usize,
    #[serde(rename = "OH")]
    pub oh: usize,
}

impl ClassificationCounts {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Direct => self.direct += 1,
            Classification::Indirect => self.indirect += 1,
            Classification::Oh => self.oh += 1,
        }
    }

    pub fn get(&self, classification: Classification) -> usize {
        match classification {
            Classification::Direct => self.direct,
            Classification::Indirect => self.indirect,
            Classification::Oh => self.oh,
        }
    }

    pub fn total(&self) -> usize {
        self.direct + self.indirect + self.oh
    }
}

// ==============================================================================
// Per-position validation
// ==============================================================================

/// Structural checks on a single position. The classification is computed even
/// when the position is malformed, so callers can still bucket it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionValidation {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub expected_classification: Classification,
    /// The rule that produced `expected_classification`.
    pub rule: RuleId,
}

// ==============================================================================
// Cross-source consistency
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencySummary {
    pub total_positions: usize,
    /// Computed (not attached) classifications across every registered position.
    pub classification_counts: ClassificationCounts,
    pub pages_covered: Vec<String>,
}

/// A (department, level) group whose pages disagree with the rule table or with
/// each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inconsistency {
    pub department: String,
    pub level: Level,
    pub expected_classification: Classification,
    /// Every distinct classification observed in the group.
    pub observed_classifications: Vec<Classification>,
    /// Every page that contributed a position to the group.
    pub sources: Vec<String>,
    /// Labels of the positions whose observed classification is wrong, tagged with their page.
    pub positions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    pub is_valid: bool,
    pub summary: ConsistencySummary,
    pub inconsistencies: Vec<Inconsistency>,
}

impl ConsistencyReport {
    pub fn empty() -> Self {
        Self {
            is_valid: true,
            summary: ConsistencySummary {
                total_positions: 0,
                classification_counts: ClassificationCounts::default(),
                pages_covered: Vec::new(),
            },
            inconsistencies: Vec::new(),
        }
    }
}

// ==============================================================================
// Aggregation
// ==============================================================================

/// The two roll-up pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregationPage {
    Direct,
    IndirectAndOh,
}

impl fmt::Display for AggregationPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationPage::Direct => f.write_str("direct"),
            AggregationPage::IndirectAndOh => f.write_str("indirect/OH"),
        }
    }
}

/// A position placed on the wrong roll-up page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationMismatch {
    pub position: String,
    pub position_id: String,
    pub department: String,
    pub level: Level,
    pub page: AggregationPage,
    pub expected_classification: Classification,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub is_valid: bool,
    pub direct_page_total: usize,
    pub indirect_page_total: usize,
    pub detailed_view_total: usize,
    /// `direct_page_total + indirect_page_total - detailed_view_total`; zero when the roll-ups reconcile.
    pub count_drift: i64,
    pub mismatches: Vec<AggregationMismatch>,
}

// ==============================================================================
// Detailed breakdowns
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentBreakdown {
    pub department: String,
    pub total: usize,
    pub counts: ClassificationCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelBreakdown {
    pub level: Level,
    pub total: usize,
    pub counts: ClassificationCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedReport {
    pub total_positions: usize,
    pub departments: Vec<DepartmentBreakdown>,
    pub levels: Vec<LevelBreakdown>,
}
