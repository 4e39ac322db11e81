use crate::report::{
    ClassificationTrends, CommonIssue, DataConsistencyReport, ExecutionSummary, HealthStatus,
    IssueType, ReportFindings, ValidationSummaryReport,
};
use chrono::Utc;
use core_types::Classification;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Rolls a batch of reports into one summary.
pub fn summarize(reports: &[DataConsistencyReport]) -> ValidationSummaryReport {
    let count = |health: HealthStatus| reports.iter().filter(|r| r.overall_health == health).count();
    let execution_summary = ExecutionSummary {
        total_reports: reports.len(),
        healthy: count(HealthStatus::Healthy),
        warning: count(HealthStatus::Warning),
        critical: count(HealthStatus::Critical),
    };

    let mut recommendations: Vec<String> = Vec::new();
    for recommendation in reports.iter().flat_map(|r| &r.recommendations) {
        if !recommendations.contains(recommendation) {
            recommendations.push(recommendation.clone());
        }
    }

    let detailed_findings = reports
        .iter()
        .map(|r| ReportFindings {
            scenario: r.scenario.clone(),
            timestamp: r.timestamp,
            overall_health: r.overall_health,
            critical_issues: r.critical_issues.clone(),
        })
        .collect();

    ValidationSummaryReport {
        generated_at: Utc::now(),
        execution_summary,
        classification_trends: trends(reports),
        common_issues: common_issues(reports),
        recommendations,
        detailed_findings,
    }
}

fn trends(reports: &[DataConsistencyReport]) -> ClassificationTrends {
    if reports.is_empty() {
        return ClassificationTrends {
            average_direct_percentage: Decimal::ZERO,
            average_indirect_percentage: Decimal::ZERO,
            average_oh_percentage: Decimal::ZERO,
            consistency_score: Decimal::ONE,
        };
    }

    let n = Decimal::from(reports.len());
    let average = |classification: Classification| {
        let sum: Decimal = reports
            .iter()
            .map(|r| r.classification_distribution.get(classification).percentage)
            .sum();
        (sum / n).round_dp(2)
    };
    let clean = reports.iter().filter(|r| r.critical_issues.is_empty()).count();

    ClassificationTrends {
        average_direct_percentage: average(Classification::Direct),
        average_indirect_percentage: average(Classification::Indirect),
        average_oh_percentage: average(Classification::Oh),
        consistency_score: (Decimal::from(clean) / n).round_dp(4),
    }
}

/// Issues (critical or warning) whose normalized description occurs more than once
/// across the batch, most frequent first.
fn common_issues(reports: &[DataConsistencyReport]) -> Vec<CommonIssue> {
    struct Tally {
        description: String,
        issue_type: IssueType,
        frequency: usize,
        reports: BTreeSet<usize>,
    }

    let mut tallies: BTreeMap<(IssueType, String), Tally> = BTreeMap::new();
    for (index, report) in reports.iter().enumerate() {
        for issue in report.critical_issues.iter().chain(&report.warnings) {
            let key = (issue.issue_type, normalize_description(&issue.description));
            let tally = tallies.entry(key).or_insert_with(|| Tally {
                description: issue.description.clone(),
                issue_type: issue.issue_type,
                frequency: 0,
                reports: BTreeSet::new(),
            });
            tally.frequency += 1;
            tally.reports.insert(index);
        }
    }

    let mut common: Vec<CommonIssue> = tallies
        .into_values()
        .filter(|t| t.frequency > 1)
        .map(|t| CommonIssue {
            description: t.description,
            issue_type: t.issue_type,
            frequency: t.frequency,
            affected_reports: t.reports.len(),
        })
        .collect();
    // Stable: equal frequencies keep the key order.
    common.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    common
}

fn normalize_description(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
