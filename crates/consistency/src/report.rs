use chrono::{DateTime, Utc};
use core_types::Classification;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;
use validation::{AggregationResult, ConsistencyReport, DepartmentBreakdown, LevelBreakdown};

// ==============================================================================
// Health and issues
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => f.write_str("healthy"),
            HealthStatus::Warning => f.write_str("warning"),
            HealthStatus::Critical => f.write_str("critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    ClassificationInconsistency,
    AggregationMismatch,
    DataQuality,
    ScenarioExecutionFailure,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueType::ClassificationInconsistency => f.write_str("classification_inconsistency"),
            IssueType::AggregationMismatch => f.write_str("aggregation_mismatch"),
            IssueType::DataQuality => f.write_str("data_quality"),
            IssueType::ScenarioExecutionFailure => f.write_str("scenario_execution_failure"),
        }
    }
}

/// A typed finding, used both for critical issues and for warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub description: String,
    pub affected_positions: Vec<String>,
}

// ==============================================================================
// Distribution
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub count: usize,
    pub percentage: Decimal,
    /// Distinct position labels in first-seen order, e.g. `CE TM (Mixing)`.
    pub positions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ClassificationDistribution {
    pub direct: CategoryShare,
    pub indirect: CategoryShare,
    #[serde(rename = "OH")]
    pub oh: CategoryShare,
}

impl ClassificationDistribution {
    pub fn get(&self, classification: Classification) -> &CategoryShare {
        match classification {
            Classification::Direct => &self.direct,
            Classification::Indirect => &self.indirect,
            Classification::Oh => &self.oh,
        }
    }

    pub(crate) fn get_mut(&mut self, classification: Classification) -> &mut CategoryShare {
        match classification {
            Classification::Direct => &mut self.direct,
            Classification::Indirect => &mut self.indirect,
            Classification::Oh => &mut self.oh,
        }
    }

    pub fn total(&self) -> usize {
        self.direct.count + self.indirect.count + self.oh.count
    }
}

// ==============================================================================
// Application report
// ==============================================================================

/// The application-level result of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataConsistencyReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub overall_health: HealthStatus,
    pub total_positions: usize,
    pub classification_distribution: ClassificationDistribution,
    pub department_analysis: Vec<DepartmentBreakdown>,
    pub level_analysis: Vec<LevelBreakdown>,
    pub consistency: ConsistencyReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_validation: Option<AggregationResult>,
    pub critical_issues: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub recommendations: Vec<String>,
}

impl DataConsistencyReport {
    /// A report for a run that could not be executed at all.
    pub fn execution_failure(scenario: Option<&str>, reason: &str) -> Self {
        let name = scenario.unwrap_or("unnamed");
        Self {
            scenario: scenario.map(str::to_string),
            timestamp: Utc::now(),
            overall_health: HealthStatus::Critical,
            total_positions: 0,
            classification_distribution: ClassificationDistribution::default(),
            department_analysis: Vec::new(),
            level_analysis: Vec::new(),
            consistency: ConsistencyReport::empty(),
            aggregation_validation: None,
            critical_issues: vec![ValidationIssue {
                issue_type: IssueType::ScenarioExecutionFailure,
                description: reason.to_string(),
                affected_positions: Vec::new(),
            }],
            warnings: Vec::new(),
            recommendations: vec![format!(
                "Fix the definition of scenario '{name}' so it can be executed"
            )],
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.overall_health == HealthStatus::Healthy
    }
}

/// Trimmed projection of a [`DataConsistencyReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickCheckResult {
    pub is_healthy: bool,
    pub critical_issue_count: usize,
    pub warning_count: usize,
    pub quick_summary: String,
    pub recommendations: Vec<String>,
}

// ==============================================================================
// Automated scenario runs
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Pass,
    Warning,
    Fail,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallStatus::Pass => f.write_str("pass"),
            OverallStatus::Warning => f.write_str("warning"),
            OverallStatus::Fail => f.write_str("fail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub name: String,
    pub description: String,
    pub report: DataConsistencyReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunSummary {
    pub total: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
    pub overall_status: OverallStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedTestRun {
    pub run_id: Uuid,
    pub results: Vec<ScenarioResult>,
    pub summary: TestRunSummary,
}

impl AutomatedTestRun {
    pub fn reports(&self) -> Vec<DataConsistencyReport> {
        self.results.iter().map(|r| r.report.clone()).collect()
    }
}

// ==============================================================================
// Multi-report summary
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    pub total_reports: usize,
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationTrends {
    pub average_direct_percentage: Decimal,
    pub average_indirect_percentage: Decimal,
    #[serde(rename = "averageOHPercentage")]
    pub average_oh_percentage: Decimal,
    /// Fraction of reports with zero critical issues, in `[0, 1]`.
    pub consistency_score: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonIssue {
    pub description: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    /// Total occurrences across every report.
    pub frequency: usize,
    /// Number of distinct reports containing the issue.
    pub affected_reports: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub overall_health: HealthStatus,
    pub critical_issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummaryReport {
    pub generated_at: DateTime<Utc>,
    pub execution_summary: ExecutionSummary,
    pub classification_trends: ClassificationTrends,
    pub common_issues: Vec<CommonIssue>,
    pub recommendations: Vec<String>,
    pub detailed_findings: Vec<ReportFindings>,
}
