use crate::error::ClassificationError;
use crate::rules::{ClassificationRule, FALLBACK, RULE_TABLE, RuleId, RuleInput};
use crate::Classifier;
use core_types::{Classification, Level};
use serde::Serialize;
use std::collections::HashSet;

/// The outcome of running a position through the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleMatch {
    pub classification: Classification,
    pub rule: RuleId,
}

/// A stateless evaluator over an ordered rule table.
///
/// `ClassificationEngine::new()` uses the audited [`RULE_TABLE`]. A custom table can
/// be supplied through [`ClassificationEngine::with_rules`], which is mostly useful
/// in tests that need to check precedence in isolation.
#[derive(Debug, Clone)]
pub struct ClassificationEngine {
    rules: Vec<ClassificationRule>,
}

impl ClassificationEngine {
    pub fn new() -> Self {
        Self {
            rules: RULE_TABLE.to_vec(),
        }
    }

    /// Builds an engine over a custom table, rejecting empty tables and duplicate rule ids.
    pub fn with_rules(rules: Vec<ClassificationRule>) -> Result<Self, ClassificationError> {
        if rules.is_empty() {
            return Err(ClassificationError::EmptyRuleTable);
        }
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id) {
                return Err(ClassificationError::DuplicateRule(format!("{:?}", rule.id)));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for ClassificationEngine {
    fn explain(
        &self,
        department: &str,
        level: &Level,
        process_type: Option<&str>,
        subtitle: Option<&str>,
    ) -> RuleMatch {
        let input = RuleInput::new(department, level, process_type, subtitle);
        let outcome = evaluate(&self.rules, &input);
        tracing::debug!(
            department,
            level = %level,
            rule = ?outcome.rule,
            classification = %outcome.classification,
            "Classified position"
        );
        outcome
    }
}

/// First matching rule wins; nothing matching yields the fallback.
fn evaluate(rules: &[ClassificationRule], input: &RuleInput) -> RuleMatch {
    rules
        .iter()
        .find(|rule| (rule.predicate)(input))
        .map(|rule| RuleMatch {
            classification: rule.result,
            rule: rule.id,
        })
        .unwrap_or(RuleMatch {
            classification: FALLBACK,
            rule: RuleId::Fallback,
        })
}

/// Classifies with the audited rule table.
pub fn classify(
    department: &str,
    level: &Level,
    process_type: Option<&str>,
    subtitle: Option<&str>,
) -> Classification {
    let input = RuleInput::new(department, level, process_type, subtitle);
    evaluate(&RULE_TABLE, &input).classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Position;

    fn engine() -> ClassificationEngine {
        ClassificationEngine::new()
    }

    #[test]
    fn ce_tm_depends_on_mixing_subtitle() {
        assert_eq!(classify("CE", &Level::TM, None, Some("Mixing")), Classification::Direct);
        assert_eq!(classify("CE", &Level::TM, None, Some("Other")), Classification::Oh);
        assert_eq!(classify("CE", &Level::TM, None, None), Classification::Oh);
    }

    #[test]
    fn plant_production_tm_is_direct() {
        assert_eq!(classify("Plant Production", &Level::TM, None, None), Classification::Direct);
        assert_eq!(classify("Plant Production", &Level::TL, None, None), Classification::Indirect);
        assert_eq!(classify("Plant Production", &Level::PM, None, None), Classification::Oh);
    }

    #[test]
    fn separated_processes_are_indirect_at_every_level() {
        assert_eq!(classify("No-sew", &Level::GL, None, None), Classification::Indirect);
        assert_eq!(classify("HF Welding", &Level::TM, None, None), Classification::Indirect);
        assert_eq!(classify("Line", &Level::PM, Some("Separated"), None), Classification::Indirect);
        assert_eq!(classify("CE", &Level::TM, Some("No-sew"), Some("Mixing")), Classification::Indirect);
    }

    #[test]
    fn fg_wh_tm_splits_on_shipping() {
        assert_eq!(classify("FG WH", &Level::TM, None, Some("Shipping")), Classification::Oh);
        assert_eq!(classify("FG WH", &Level::TM, None, Some("Picking")), Classification::Indirect);
        assert_eq!(classify("FG WH", &Level::PM, None, None), Classification::Indirect);
    }

    #[test]
    fn fixed_departments_ignore_level() {
        for level in Level::CLASSIFIABLE {
            assert_eq!(classify("Admin", &level, None, None), Classification::Oh);
            assert_eq!(classify("RMCC", &level, None, None), Classification::Oh);
            assert_eq!(classify("Bottom Market", &level, None, None), Classification::Indirect);
            assert_eq!(classify("Raw Material", &level, None, None), Classification::Indirect);
        }
    }

    #[test]
    fn level_defaults_with_line_override() {
        assert_eq!(classify("Line", &Level::PM, None, None), Classification::Oh);
        assert_eq!(classify("Line", &Level::LM, None, None), Classification::Oh);
        assert_eq!(classify("Line", &Level::GL, None, None), Classification::Indirect);
        assert_eq!(classify("Line", &Level::TM, None, None), Classification::Indirect);
        assert_eq!(classify("Quality", &Level::GL, None, None), Classification::Oh);
        assert_eq!(classify("Quality", &Level::TL, None, None), Classification::Indirect);
        assert_eq!(classify("Quality", &Level::TM, None, None), Classification::Indirect);
    }

    #[test]
    fn fallback_is_indirect_and_identified() {
        let empty = engine().explain("", &Level::PM, None, None);
        assert_eq!(empty.classification, Classification::Indirect);
        assert!(empty.rule.is_fallback());

        let render_only = engine().explain("Line", &Level::from("MGL"), None, None);
        assert_eq!(render_only.classification, Classification::Indirect);
        assert!(render_only.rule.is_fallback());
    }

    #[test]
    fn off_by_one_fixture_resolves_to_four_oh_positions() {
        // Admin + Small Tooling + Sub Material + FG WH Shipping: the table yields four OH.
        let positions = [
            Position::new("1", "Admin", Level::TM),
            Position::new("2", "Small Tooling", Level::TM),
            Position::new("3", "Sub Material", Level::TM),
            Position::new("4", "FG WH", Level::TM).with_subtitle("Shipping"),
        ];
        let oh = positions
            .iter()
            .filter(|p| engine().classify_position(p) == Classification::Oh)
            .count();
        assert_eq!(oh, 4);
    }

    #[test]
    fn custom_tables_are_validated() {
        assert_eq!(
            ClassificationEngine::with_rules(vec![]).unwrap_err(),
            ClassificationError::EmptyRuleTable
        );
        let duplicated = vec![RULE_TABLE[0], RULE_TABLE[0]];
        assert!(matches!(
            ClassificationEngine::with_rules(duplicated),
            Err(ClassificationError::DuplicateRule(_))
        ));
    }

    #[test]
    fn precedence_follows_table_order() {
        // Without the CE rows, CE TM falls through to the TL/TM default.
        let rules: Vec<_> = RULE_TABLE
            .iter()
            .copied()
            .filter(|rule| !matches!(rule.id, RuleId::CeMixing | RuleId::CeNonMixing))
            .collect();
        let trimmed = ClassificationEngine::with_rules(rules).unwrap();
        let outcome = trimmed.explain("CE", &Level::TM, None, Some("Mixing"));
        assert_eq!(outcome.rule, RuleId::TeamLevel);
        assert_eq!(outcome.classification, Classification::Indirect);
    }
}
