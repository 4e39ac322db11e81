use crate::report::{IssueType, ValidationIssue};
use validation::{AggregationResult, ConsistencyReport};

/// Derives short, de-duplicated action items from the findings of one run.
///
/// Critical findings come first so that truncated views (the quick check) keep
/// the most urgent advice.
pub fn recommend(
    consistency: &ConsistencyReport,
    aggregation: Option<&AggregationResult>,
    warnings: &[ValidationIssue],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    for inconsistency in &consistency.inconsistencies {
        push_unique(
            &mut recommendations,
            format!(
                "Review {} department {} classification rules",
                inconsistency.department, inconsistency.level
            ),
        );
    }

    if let Some(aggregation) = aggregation {
        if !aggregation.mismatches.is_empty() {
            push_unique(
                &mut recommendations,
                format!(
                    "Move {} misplaced position(s) to the roll-up page matching their classification",
                    aggregation.mismatches.len()
                ),
            );
        }
        if aggregation.count_drift != 0 {
            push_unique(
                &mut recommendations,
                format!(
                    "Reconcile roll-up page totals with the detailed view (drift of {:+})",
                    aggregation.count_drift
                ),
            );
        }
    }

    let data_quality = warnings
        .iter()
        .filter(|w| w.issue_type == IssueType::DataQuality)
        .count();
    if data_quality > 0 {
        push_unique(
            &mut recommendations,
            format!(
                "Complete the missing or unrecognized id, department and level fields on {data_quality} position(s)"
            ),
        );
    }

    recommendations
}

fn push_unique(recommendations: &mut Vec<String>, recommendation: String) {
    if !recommendations.contains(&recommendation) {
        recommendations.push(recommendation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Classification, Level};
    use validation::Inconsistency;

    fn inconsistency(department: &str, level: Level) -> Inconsistency {
        Inconsistency {
            department: department.to_string(),
            level,
            expected_classification: Classification::Oh,
            observed_classifications: vec![Classification::Direct, Classification::Oh],
            sources: vec!["page1".to_string()],
            positions: Vec::new(),
        }
    }

    #[test]
    fn one_review_line_per_department_level() {
        let mut consistency = ConsistencyReport::empty();
        consistency.inconsistencies = vec![
            inconsistency("CE", Level::TM),
            inconsistency("CE", Level::TM),
            inconsistency("Line", Level::PM),
        ];
        let recommendations = recommend(&consistency, None, &[]);
        assert_eq!(
            recommendations,
            vec![
                "Review CE department TM classification rules".to_string(),
                "Review Line department PM classification rules".to_string(),
            ]
        );
    }

    #[test]
    fn clean_run_has_no_recommendations() {
        assert!(recommend(&ConsistencyReport::empty(), None, &[]).is_empty());
    }
}
