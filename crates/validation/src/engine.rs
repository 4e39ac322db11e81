use crate::report::{
    AggregationMismatch, AggregationPage, AggregationResult, ClassificationCounts,
    ConsistencyReport, ConsistencySummary, DepartmentBreakdown, DetailedReport, Inconsistency,
    LevelBreakdown, PositionValidation,
};
use classification::Classifier;
use core_types::{Classification, Level, Position};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Display name used for positions whose department is blank.
pub const UNASSIGNED_DEPARTMENT: &str = "(unassigned)";

/// Registry of page positions plus the checks that run over them.
///
/// The registry maps a source tag to the positions that page rendered. It lives
/// only as long as one validation session; call [`ValidationEngine::clear_positions`]
/// between independent sessions.
pub struct ValidationEngine {
    classifier: Arc<dyn Classifier>,
    registry: BTreeMap<String, Vec<Position>>,
}

/// One registered position as seen by the consistency check.
struct GroupMember {
    id: String,
    expected: Classification,
    observed: Classification,
    source: String,
    label: String,
}

/// Positions sharing a normalized (department, level) key.
struct Group {
    department: String,
    level: Level,
    members: Vec<GroupMember>,
}

impl ValidationEngine {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            registry: BTreeMap::new(),
        }
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    /// Replaces whatever was registered under `source`.
    ///
    /// Each position is stamped with `source`, so the registry key is the page tag
    /// reported in inconsistencies.
    pub fn register_positions(&mut self, source: &str, positions: Vec<Position>) {
        let positions: Vec<Position> = positions
            .into_iter()
            .map(|p| p.with_source(source))
            .collect();
        tracing::debug!(source, count = positions.len(), "Registered positions");
        self.registry.insert(source.to_string(), positions);
    }

    pub fn clear_positions(&mut self) {
        self.registry.clear();
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.registry.values().flatten()
    }

    pub fn position_count(&self) -> usize {
        self.registry.values().map(Vec::len).sum()
    }

    /// Structural checks on one position. Never fails; issues are reported as strings.
    pub fn validate_position(&self, position: &Position) -> PositionValidation {
        let mut issues = Vec::new();

        if position.id.trim().is_empty() {
            issues.push("Position ID is required".to_string());
        }
        if position.department.trim().is_empty() {
            issues.push("Department is required".to_string());
        }
        match &position.level {
            Level::Unrecognized(raw) if raw.trim().is_empty() => {
                issues.push("Level is required".to_string());
            }
            Level::Unrecognized(raw) => {
                issues.push(format!("Unknown level '{raw}' (expected PM, LM, GL, TL or TM)"));
            }
            _ => {}
        }

        let outcome = self.classifier.explain_position(position);

        PositionValidation {
            is_valid: issues.is_empty(),
            issues,
            expected_classification: outcome.classification,
            rule: outcome.rule,
        }
    }

    /// Checks that every page agrees with the rule table and with every other page.
    pub fn validate_consistency(&self) -> ConsistencyReport {
        let mut counts = ClassificationCounts::default();
        let mut groups: BTreeMap<(String, Level), Group> = BTreeMap::new();

        for (source, positions) in &self.registry {
            for position in positions {
                let expected = self.classifier.classify_position(position);
                counts.record(expected);

                let group = groups
                    .entry((position.department_key(), position.level.clone()))
                    .or_insert_with(|| Group {
                        department: display_department(&position.department),
                        level: position.level.clone(),
                        members: Vec::new(),
                    });
                group.members.push(GroupMember {
                    id: position.id.trim().to_string(),
                    expected,
                    observed: position.classification.unwrap_or(expected),
                    source: source.clone(),
                    label: position.label(),
                });
            }
        }

        let inconsistencies: Vec<Inconsistency> =
            groups.values().flat_map(find_inconsistencies).collect();

        for inconsistency in &inconsistencies {
            tracing::warn!(
                department = %inconsistency.department,
                level = %inconsistency.level,
                expected = %inconsistency.expected_classification,
                sources = ?inconsistency.sources,
                "Classification inconsistency detected"
            );
        }

        let total_positions = counts.total();
        tracing::info!(
            total_positions,
            pages = self.registry.len(),
            inconsistencies = inconsistencies.len(),
            "Consistency check complete"
        );

        ConsistencyReport {
            is_valid: inconsistencies.is_empty(),
            summary: ConsistencySummary {
                total_positions,
                classification_counts: counts,
                pages_covered: self.registry.keys().cloned().collect(),
            },
            inconsistencies,
        }
    }

    /// Reconciles the two roll-up pages against the detailed view.
    ///
    /// Totals must add up, every direct-page entry must classify as direct, and every
    /// indirect/OH-page entry must classify as indirect or OH.
    pub fn validate_aggregation(
        &self,
        direct_positions: &[Position],
        indirect_and_oh_positions: &[Position],
        detailed_positions: &[Position],
    ) -> AggregationResult {
        let direct_page_total = direct_positions.len();
        let indirect_page_total = indirect_and_oh_positions.len();
        let detailed_view_total = detailed_positions.len();
        let count_drift =
            (direct_page_total + indirect_page_total) as i64 - detailed_view_total as i64;

        if count_drift != 0 {
            tracing::warn!(
                direct_page_total,
                indirect_page_total,
                detailed_view_total,
                count_drift,
                "Aggregation totals do not reconcile with the detailed view"
            );
        }

        let mut mismatches = Vec::new();
        for position in direct_positions {
            let outcome = self.classifier.explain_position(position);
            if outcome.classification != Classification::Direct {
                mismatches.push(self.mismatch(position, AggregationPage::Direct, outcome));
            }
        }
        for position in indirect_and_oh_positions {
            let outcome = self.classifier.explain_position(position);
            if !outcome.classification.is_indirect_or_oh() {
                mismatches.push(self.mismatch(position, AggregationPage::IndirectAndOh, outcome));
            }
        }

        AggregationResult {
            is_valid: count_drift == 0 && mismatches.is_empty(),
            direct_page_total,
            indirect_page_total,
            detailed_view_total,
            count_drift,
            mismatches,
        }
    }

    fn mismatch(
        &self,
        position: &Position,
        page: AggregationPage,
        outcome: classification::RuleMatch,
    ) -> AggregationMismatch {
        let reason = format!(
            "found in {page} page but classifies as {} ({})",
            outcome.classification,
            outcome.rule.description()
        );
        tracing::warn!(position = %position.label(), %reason, "Aggregation mismatch");
        AggregationMismatch {
            position: position.label(),
            position_id: position.id.clone(),
            department: position.department.clone(),
            level: position.level.clone(),
            page,
            expected_classification: outcome.classification,
            reason,
        }
    }

    /// Per-department and per-level breakdowns of the computed classifications.
    pub fn generate_detailed_report(&self) -> DetailedReport {
        let mut departments: BTreeMap<String, DepartmentBreakdown> = BTreeMap::new();
        let mut levels: BTreeMap<Level, LevelBreakdown> = BTreeMap::new();
        let mut total_positions = 0;

        for position in self.positions() {
            let classification = self.classifier.classify_position(position);
            total_positions += 1;

            let department = departments
                .entry(position.department_key())
                .or_insert_with(|| DepartmentBreakdown {
                    department: display_department(&position.department),
                    total: 0,
                    counts: ClassificationCounts::default(),
                });
            department.total += 1;
            department.counts.record(classification);

            let level = levels
                .entry(position.level.clone())
                .or_insert_with(|| LevelBreakdown {
                    level: position.level.clone(),
                    total: 0,
                    counts: ClassificationCounts::default(),
                });
            level.total += 1;
            level.counts.record(classification);
        }

        DetailedReport {
            total_positions,
            departments: departments.into_values().collect(),
            levels: levels.into_values().collect(),
        }
    }
}

/// Splits a group by expected classification and reports every bucket whose pages
/// disagree. Buckets are needed because subtitle exceptions (CE TM "Mixing", FG WH TM
/// "Shipping") legitimately give one (department, level) two expected values.
///
/// A position id that lands in more than one bucket is reported on its own: the
/// pages describe the same position differently, so they cannot all be right.
fn find_inconsistencies(group: &Group) -> Vec<Inconsistency> {
    let mut by_expected: BTreeMap<Classification, Vec<&GroupMember>> = BTreeMap::new();
    for member in &group.members {
        by_expected.entry(member.expected).or_default().push(member);
    }

    let mut inconsistencies: Vec<Inconsistency> = by_expected
        .into_iter()
        .filter_map(|(expected, members)| {
            let observed: BTreeSet<Classification> = members.iter().map(|m| m.observed).collect();
            let contradicted = members.iter().any(|m| m.observed != expected);
            if observed.len() <= 1 && !contradicted {
                return None;
            }

            let sources: BTreeSet<&str> = members.iter().map(|m| m.source.as_str()).collect();
            Some(Inconsistency {
                department: group.department.clone(),
                level: group.level.clone(),
                expected_classification: expected,
                observed_classifications: observed.into_iter().collect(),
                sources: sources.into_iter().map(str::to_string).collect(),
                positions: members
                    .iter()
                    .filter(|m| m.observed != expected)
                    .map(|m| format!("{} @ {}", m.label, m.source))
                    .collect(),
            })
        })
        .collect();

    let mut by_id: BTreeMap<&str, Vec<&GroupMember>> = BTreeMap::new();
    for member in group.members.iter().filter(|m| !m.id.is_empty()) {
        by_id.entry(member.id.as_str()).or_default().push(member);
    }
    for members in by_id.into_values() {
        let expected: BTreeSet<Classification> = members.iter().map(|m| m.expected).collect();
        if expected.len() <= 1 {
            continue;
        }
        // Registry order: the first page to carry the id sets the reference value.
        let reference = members[0].expected;
        let observed: BTreeSet<Classification> = members.iter().map(|m| m.observed).collect();
        let sources: BTreeSet<&str> = members.iter().map(|m| m.source.as_str()).collect();
        inconsistencies.push(Inconsistency {
            department: group.department.clone(),
            level: group.level.clone(),
            expected_classification: reference,
            observed_classifications: observed.into_iter().collect(),
            sources: sources.into_iter().map(str::to_string).collect(),
            positions: members
                .iter()
                .map(|m| format!("{} @ {}", m.label, m.source))
                .collect(),
        });
    }

    inconsistencies
}

fn display_department(department: &str) -> String {
    let trimmed = department.trim();
    if trimmed.is_empty() {
        UNASSIGNED_DEPARTMENT.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classification::{ClassificationEngine, RuleId, RuleMatch};

    fn engine() -> ValidationEngine {
        ValidationEngine::new(Arc::new(ClassificationEngine::new()))
    }

    fn pos(id: &str, department: &str, level: Level) -> Position {
        Position::new(id, department, level)
    }

    #[test]
    fn validate_position_reports_each_structural_issue() {
        let engine = engine();

        let ok = engine.validate_position(&pos("1", "Line", Level::GL));
        assert!(ok.is_valid);
        assert_eq!(ok.expected_classification, Classification::Indirect);

        let broken = engine.validate_position(&Position::default());
        assert!(!broken.is_valid);
        assert_eq!(
            broken.issues,
            vec![
                "Position ID is required".to_string(),
                "Department is required".to_string(),
                "Level is required".to_string(),
            ]
        );
        assert_eq!(broken.expected_classification, Classification::Indirect);
        assert_eq!(broken.rule, RuleId::Fallback);

        let render_only = engine.validate_position(&pos("2", "Line", Level::from("VSM")));
        assert_eq!(render_only.issues.len(), 1);
        assert!(render_only.issues[0].contains("VSM"));
    }

    #[test]
    fn registering_a_source_twice_replaces_it() {
        let mut engine = engine();
        engine.register_positions("page1", vec![pos("1", "Line", Level::PM), pos("2", "Line", Level::GL)]);
        engine.register_positions("page1", vec![pos("3", "Admin", Level::TM)]);
        assert_eq!(engine.position_count(), 1);
        assert_eq!(engine.positions().next().map(|p| p.source.as_str()), Some("page1"));

        engine.clear_positions();
        assert_eq!(engine.position_count(), 0);
        assert!(engine.validate_consistency().is_valid);
    }

    #[test]
    fn agreeing_pages_are_consistent() {
        let mut engine = engine();
        engine.register_positions(
            "page1",
            vec![
                pos("1", "CE", Level::TM).with_subtitle("Mixing"),
                pos("2", "CE", Level::TM).with_subtitle("Packing"),
                pos("3", "Raw Material", Level::GL),
            ],
        );
        engine.register_positions(
            "page2",
            vec![
                pos("1", "ce", Level::TM)
                    .with_subtitle("Mixing")
                    .with_classification(Classification::Direct),
                pos("3", "RawMaterial", Level::GL).with_classification(Classification::Indirect),
            ],
        );

        let report = engine.validate_consistency();
        assert!(report.is_valid, "{:?}", report.inconsistencies);
        assert_eq!(report.summary.total_positions, 5);
        assert_eq!(report.summary.classification_counts.direct, 2);
        assert_eq!(report.summary.classification_counts.oh, 1);
        assert_eq!(report.summary.classification_counts.indirect, 2);
        assert_eq!(report.summary.pages_covered, vec!["page1", "page2"]);
    }

    #[test]
    fn contradicting_attachment_is_reported_with_all_sources() {
        let mut engine = engine();
        engine.register_positions("page1", vec![pos("1", "Line", Level::PM)]);
        engine.register_positions(
            "page2",
            vec![pos("1", "Line", Level::PM).with_classification(Classification::Direct)],
        );

        let report = engine.validate_consistency();
        assert!(!report.is_valid);
        assert_eq!(report.inconsistencies.len(), 1);

        let issue = &report.inconsistencies[0];
        assert_eq!(issue.department, "Line");
        assert_eq!(issue.level, Level::PM);
        assert_eq!(issue.expected_classification, Classification::Oh);
        assert_eq!(
            issue.observed_classifications,
            vec![Classification::Direct, Classification::Oh]
        );
        assert_eq!(issue.sources, vec!["page1", "page2"]);
        assert_eq!(issue.positions, vec!["Line PM @ page2"]);
        // Counts tally computed values, not attached ones.
        assert_eq!(report.summary.classification_counts.oh, 2);
    }

    #[test]
    fn single_page_contradiction_is_still_an_inconsistency() {
        let mut engine = engine();
        engine.register_positions(
            "page1",
            vec![pos("1", "Quality", Level::GL).with_classification(Classification::Indirect)],
        );
        let report = engine.validate_consistency();
        assert_eq!(report.inconsistencies.len(), 1);
        assert_eq!(report.inconsistencies[0].expected_classification, Classification::Oh);
    }

    #[test]
    fn same_position_described_differently_across_pages_is_reported() {
        let mut engine = engine();
        engine.register_positions("page1", vec![pos("3", "CE", Level::TM).with_subtitle("Mixing")]);
        engine.register_positions("page2", vec![pos("3", "CE", Level::TM)]);

        let report = engine.validate_consistency();
        assert!(!report.is_valid);
        assert_eq!(report.inconsistencies.len(), 1);

        let issue = &report.inconsistencies[0];
        assert_eq!(issue.department, "CE");
        assert_eq!(issue.expected_classification, Classification::Direct);
        assert_eq!(
            issue.observed_classifications,
            vec![Classification::Direct, Classification::Oh]
        );
        assert_eq!(issue.sources, vec!["page1", "page2"]);
        assert_eq!(issue.positions, vec!["CE TM (Mixing) @ page1", "CE TM @ page2"]);
    }

    #[test]
    fn distinct_subtitled_rows_do_not_flag_each_other() {
        let mut engine = engine();
        engine.register_positions(
            "page1",
            vec![
                pos("2", "CE", Level::TM).with_subtitle("Mixing"),
                pos("3", "CE", Level::TM).with_subtitle("Packing"),
                pos("", "FG WH", Level::TM).with_subtitle("Shipping"),
                pos("", "FG WH", Level::TM).with_subtitle("Picking"),
            ],
        );
        engine.register_positions("page2", vec![pos("3", "CE", Level::TM).with_subtitle("Packing")]);
        assert!(engine.validate_consistency().is_valid);
    }

    #[test]
    fn aggregation_partition_consistent_with_classify_is_valid() {
        let engine = engine();
        let detailed = vec![
            pos("1", "CE", Level::TM).with_subtitle("Mixing"),
            pos("2", "Plant Production", Level::TM),
            pos("3", "Line", Level::GL),
            pos("4", "Admin", Level::PM),
        ];
        let (direct, rest): (Vec<_>, Vec<_>) = detailed.iter().cloned().partition(|p| {
            engine.classifier().classify_position(p) == Classification::Direct
        });

        let result = engine.validate_aggregation(&direct, &rest, &detailed);
        assert!(result.is_valid);
        assert_eq!(result.direct_page_total, 2);
        assert_eq!(result.indirect_page_total, 2);
        assert_eq!(result.direct_page_total + result.indirect_page_total, result.detailed_view_total);
        assert_eq!(result.count_drift, 0);
    }

    #[test]
    fn misplaced_positions_and_drift_are_reported() {
        let engine = engine();
        let detailed = vec![
            pos("1", "CE", Level::TM).with_subtitle("Mixing"),
            pos("2", "CE", Level::TM).with_subtitle("Packing"),
            pos("3", "Line", Level::TM),
        ];
        // CE TM Packing placed on the direct page; Line TM dropped entirely.
        let direct = vec![detailed[0].clone(), detailed[1].clone()];
        let result = engine.validate_aggregation(&direct, &[], &detailed);

        assert!(!result.is_valid);
        assert_eq!(result.count_drift, -1);
        assert_eq!(result.mismatches.len(), 1);
        let mismatch = &result.mismatches[0];
        assert_eq!(mismatch.position, "CE TM (Packing)");
        assert_eq!(mismatch.page, AggregationPage::Direct);
        assert_eq!(mismatch.expected_classification, Classification::Oh);
        assert!(mismatch.reason.contains("Mixing"), "{}", mismatch.reason);
        assert!(mismatch.reason.starts_with("found in direct page but classifies as OH"));
    }

    #[test]
    fn direct_position_on_indirect_page_is_a_mismatch() {
        let engine = engine();
        let detailed = vec![pos("1", "Plant Production", Level::TM)];
        let result = engine.validate_aggregation(&[], &detailed, &detailed);
        assert_eq!(result.count_drift, 0);
        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].page, AggregationPage::IndirectAndOh);
    }

    #[test]
    fn detailed_report_breaks_down_by_department_and_level() {
        let mut engine = engine();
        engine.register_positions(
            "page1",
            vec![
                pos("1", "Line", Level::PM),
                pos("2", "Line", Level::GL),
                pos("3", "line", Level::TM),
                pos("4", "Admin", Level::TM),
                pos("5", "", Level::TM),
            ],
        );
        let report = engine.generate_detailed_report();
        assert_eq!(report.total_positions, 5);

        let line = report.departments.iter().find(|d| d.department == "Line").unwrap();
        assert_eq!(line.total, 3);
        assert_eq!(line.counts.oh, 1);
        assert_eq!(line.counts.indirect, 2);
        assert!(report.departments.iter().any(|d| d.department == UNASSIGNED_DEPARTMENT));

        let tm = report.levels.iter().find(|l| l.level == Level::TM).unwrap();
        assert_eq!(tm.total, 3);
        assert_eq!(tm.counts.oh, 1);
        assert_eq!(tm.counts.indirect, 2);
    }

    struct AlwaysDirect;

    impl Classifier for AlwaysDirect {
        fn explain(&self, _: &str, _: &Level, _: Option<&str>, _: Option<&str>) -> RuleMatch {
            RuleMatch {
                classification: Classification::Direct,
                rule: RuleId::Fallback,
            }
        }
    }

    #[test]
    fn injected_classifier_drives_expectations() {
        let mut engine = ValidationEngine::new(Arc::new(AlwaysDirect));
        engine.register_positions("page1", vec![pos("1", "Admin", Level::PM)]);
        let report = engine.validate_consistency();
        assert!(report.is_valid);
        assert_eq!(report.summary.classification_counts.direct, 1);
    }
}
