use crate::distribution::build_distribution;
use crate::recommendations::recommend;
use crate::report::{
    DataConsistencyReport, HealthStatus, IssueType, QuickCheckResult, ValidationIssue,
};
use crate::summary::summarize;
use crate::ValidationSummaryReport;
use chrono::Utc;
use classification::Classifier;
use configuration::{HealthSettings, ReportSettings};
use core_types::{PageData, Position, normalize};
use std::sync::Arc;
use validation::{AggregationResult, ConsistencyReport, ValidationEngine};

/// Most recommendations a quick check returns.
pub const QUICK_CHECK_RECOMMENDATION_LIMIT: usize = 3;

/// What a page key stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRole {
    Detail,
    DirectAggregation,
    IndirectAggregation,
}

/// Classifies a page key by name: "indirect" anywhere marks the indirect/OH roll-up,
/// otherwise "direct" marks the direct roll-up, everything else is a detail page.
pub fn page_role(key: &str) -> PageRole {
    let key = normalize(key);
    if key.contains("indirect") {
        PageRole::IndirectAggregation
    } else if key.contains("direct") {
        PageRole::DirectAggregation
    } else {
        PageRole::Detail
    }
}

/// Orchestrates whole-application validation runs.
///
/// Owns its `ValidationEngine`, so independent validators can run side by side
/// without sharing a registry.
pub struct DataConsistencyValidator {
    pub(crate) engine: ValidationEngine,
    pub(crate) classifier: Arc<dyn Classifier>,
    health: HealthSettings,
    report: ReportSettings,
}

impl DataConsistencyValidator {
    pub fn new(
        engine: ValidationEngine,
        classifier: Arc<dyn Classifier>,
        health: HealthSettings,
        report: ReportSettings,
    ) -> Self {
        Self {
            engine,
            classifier,
            health,
            report,
        }
    }

    /// A validator over the audited rule table with default settings.
    pub fn with_defaults() -> Self {
        let classifier: Arc<dyn Classifier> = Arc::new(classification::ClassificationEngine::new());
        Self::new(
            ValidationEngine::new(classifier.clone()),
            classifier,
            HealthSettings::default(),
            ReportSettings::default(),
        )
    }

    /// Validates every page of one application snapshot.
    ///
    /// Detail pages are registered with the engine and cross-checked. When both a
    /// direct and an indirect roll-up page are present they are reconciled against
    /// the union of the detail pages.
    pub fn validate_application_consistency(
        &mut self,
        page_data: &PageData,
        scenario: Option<&str>,
    ) -> DataConsistencyReport {
        self.engine.clear_positions();

        let mut direct_pages: Vec<Position> = Vec::new();
        let mut indirect_pages: Vec<Position> = Vec::new();
        for (key, positions) in page_data {
            match page_role(key) {
                PageRole::Detail => self.engine.register_positions(key, positions.clone()),
                PageRole::DirectAggregation => direct_pages.extend(positions.iter().cloned()),
                PageRole::IndirectAggregation => indirect_pages.extend(positions.iter().cloned()),
            }
        }
        let has_direct = page_data.keys().any(|k| page_role(k) == PageRole::DirectAggregation);
        let has_indirect = page_data.keys().any(|k| page_role(k) == PageRole::IndirectAggregation);

        let consistency = self.engine.validate_consistency();

        let aggregation = (has_direct && has_indirect).then(|| {
            let detailed: Vec<Position> = self.engine.positions().cloned().collect();
            self.engine
                .validate_aggregation(&direct_pages, &indirect_pages, &detailed)
        });

        let distribution = build_distribution(
            self.classifier.as_ref(),
            self.engine.positions(),
            self.report.percentage_scale,
        );
        let detailed = self.engine.generate_detailed_report();

        let mut critical_issues = inconsistency_issues(&consistency);
        let mut warnings = self.data_quality_warnings();
        if let Some(aggregation) = &aggregation {
            let (critical, minor) = self.aggregation_issues(aggregation);
            critical_issues.extend(critical);
            warnings.extend(minor);
        }

        let recommendations = recommend(&consistency, aggregation.as_ref(), &warnings);
        let overall_health = if !critical_issues.is_empty() {
            HealthStatus::Critical
        } else if !warnings.is_empty() || !recommendations.is_empty() {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        };

        tracing::info!(
            scenario = scenario.unwrap_or("-"),
            pages = page_data.len(),
            positions = detailed.total_positions,
            critical = critical_issues.len(),
            warnings = warnings.len(),
            health = %overall_health,
            "Application consistency validated"
        );

        DataConsistencyReport {
            scenario: scenario.map(str::to_string),
            timestamp: Utc::now(),
            overall_health,
            total_positions: detailed.total_positions,
            classification_distribution: distribution,
            department_analysis: detailed.departments,
            level_analysis: detailed.levels,
            consistency,
            aggregation_validation: aggregation,
            critical_issues,
            warnings,
            recommendations,
        }
    }

    /// The same run as [`Self::validate_application_consistency`], projected down to counts.
    pub fn quick_validation_check(&mut self, page_data: &PageData) -> QuickCheckResult {
        let report = self.validate_application_consistency(page_data, None);
        QuickCheckResult {
            is_healthy: report.is_healthy(),
            critical_issue_count: report.critical_issues.len(),
            warning_count: report.warnings.len(),
            quick_summary: format!(
                "{}: {} position(s) across {} page(s), {} critical issue(s), {} warning(s)",
                report.overall_health,
                report.total_positions,
                report.consistency.summary.pages_covered.len(),
                report.critical_issues.len(),
                report.warnings.len()
            ),
            recommendations: report
                .recommendations
                .into_iter()
                .take(QUICK_CHECK_RECOMMENDATION_LIMIT)
                .collect(),
        }
    }

    /// Rolls many reports into trends, common issues and merged recommendations.
    pub fn generate_validation_summary_report(
        &self,
        reports: &[DataConsistencyReport],
    ) -> ValidationSummaryReport {
        summarize(reports)
    }

    /// One warning per structurally invalid registered position.
    fn data_quality_warnings(&self) -> Vec<ValidationIssue> {
        self.engine
            .positions()
            .filter_map(|position| {
                let validation = self.engine.validate_position(position);
                if validation.is_valid {
                    return None;
                }
                let id = if position.id.trim().is_empty() { "(no id)" } else { position.id.as_str() };
                Some(ValidationIssue {
                    issue_type: IssueType::DataQuality,
                    description: format!(
                        "Position {id} on {}: {}",
                        position.source,
                        validation.issues.join("; ")
                    ),
                    affected_positions: vec![position.label()],
                })
            })
            .collect()
    }

    /// Splits aggregation findings into critical issues and minor warnings.
    ///
    /// Every misplaced position is critical. Count drift is critical only above the
    /// configured minor-drift threshold.
    fn aggregation_issues(
        &self,
        aggregation: &AggregationResult,
    ) -> (Vec<ValidationIssue>, Vec<ValidationIssue>) {
        let mut critical: Vec<ValidationIssue> = aggregation
            .mismatches
            .iter()
            .map(|mismatch| ValidationIssue {
                issue_type: IssueType::AggregationMismatch,
                description: format!("{}: {}", mismatch.position, mismatch.reason),
                affected_positions: vec![mismatch.position.clone()],
            })
            .collect();
        let mut minor = Vec::new();

        if aggregation.count_drift != 0 {
            let issue = ValidationIssue {
                issue_type: IssueType::AggregationMismatch,
                description: format!(
                    "Roll-up pages hold {} position(s) but the detailed view has {} (drift of {:+})",
                    aggregation.direct_page_total + aggregation.indirect_page_total,
                    aggregation.detailed_view_total,
                    aggregation.count_drift
                ),
                affected_positions: Vec::new(),
            };
            if aggregation.count_drift.unsigned_abs() > self.health.minor_drift_threshold {
                critical.push(issue);
            } else {
                minor.push(issue);
            }
        }

        (critical, minor)
    }
}

/// One critical issue per inconsistent (department, level) bucket.
fn inconsistency_issues(consistency: &ConsistencyReport) -> Vec<ValidationIssue> {
    consistency
        .inconsistencies
        .iter()
        .map(|inconsistency| {
            let observed: Vec<&str> = inconsistency
                .observed_classifications
                .iter()
                .map(|c| c.as_str())
                .collect();
            ValidationIssue {
                issue_type: IssueType::ClassificationInconsistency,
                description: format!(
                    "{} {} should be {} but pages show {} (sources: {})",
                    inconsistency.department,
                    inconsistency.level,
                    inconsistency.expected_classification,
                    observed.join(", "),
                    inconsistency.sources.join(", ")
                ),
                affected_positions: inconsistency.positions.clone(),
            }
        })
        .collect()
}
