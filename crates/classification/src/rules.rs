use core_types::{Classification, Level, normalize};
use serde::Serialize;
use std::fmt;

// ==============================================================================
// Department and process catalogues
// ==============================================================================

/// Production sub-processes tracked outside the main line hierarchy.
pub const SEPARATED_PROCESSES: [&str; 3] = ["No-sew", "HF Welding", "Separated"];

/// Support departments that are overhead at every level.
pub const FIXED_OH_DEPARTMENTS: [&str; 8] = [
    "Admin",
    "Small Tooling",
    "Sub Material",
    "TPM",
    "CQM",
    "Lean",
    "Security",
    "RMCC",
];

/// Departments that are production support at every level.
pub const FIXED_INDIRECT_DEPARTMENTS: [&str; 5] = [
    "Raw Material",
    "ACC Market",
    "P&L Market",
    "Bottom Market",
    "FG WH",
];

const CE: &str = "ce";
const PLANT_PRODUCTION: &str = "plantproduction";
const FG_WH: &str = "fgwh";
const LINE: &str = "line";
const MIXING: &str = "mixing";
const SHIPPING: &str = "shipping";

// ==============================================================================
// Rule input
// ==============================================================================

/// The classifier's view of a position: every text field already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleInput {
    pub department: String,
    pub level: Level,
    pub process_type: String,
    pub subtitle: String,
}

impl RuleInput {
    pub fn new(
        department: &str,
        level: &Level,
        process_type: Option<&str>,
        subtitle: Option<&str>,
    ) -> Self {
        Self {
            department: normalize(department),
            level: level.clone(),
            process_type: process_type.map(normalize).unwrap_or_default(),
            subtitle: subtitle.map(normalize).unwrap_or_default(),
        }
    }

    fn department_is(&self, canonical: &str) -> bool {
        self.department == canonical
    }

    fn department_in(&self, catalogue: &[&str]) -> bool {
        catalogue.iter().any(|name| normalize(name) == self.department)
    }

    /// Level defaults only apply to a named department on one of the five tiers.
    fn has_known_shape(&self) -> bool {
        !self.department.is_empty() && self.level.is_classifiable()
    }
}

// ==============================================================================
// Rule table
// ==============================================================================

/// Identifies which entry of the rule table produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    SeparatedProcess,
    CeMixing,
    CeNonMixing,
    PlantProductionTm,
    FgWhShipping,
    FgWhTm,
    FixedOhDepartment,
    FixedIndirectDepartment,
    ManagementLevel,
    LineGroupLeader,
    GroupLeader,
    TeamLevel,
    Fallback,
}

impl RuleId {
    /// A sentence describing the business rule, used in mismatch reasons.
    pub fn description(&self) -> &'static str {
        match self {
            RuleId::SeparatedProcess => "separated production processes are always indirect",
            RuleId::CeMixing => "CE TM with a 'Mixing' subtitle is direct",
            RuleId::CeNonMixing => "CE TM without a 'Mixing' subtitle is OH",
            RuleId::PlantProductionTm => "Plant Production TM is direct",
            RuleId::FgWhShipping => "FG WH TM with a 'Shipping' subtitle is OH",
            RuleId::FgWhTm => "FG WH TM without a 'Shipping' subtitle is indirect",
            RuleId::FixedOhDepartment => "support departments are OH at every level",
            RuleId::FixedIndirectDepartment => "market and material departments are indirect",
            RuleId::ManagementLevel => "PM and LM levels are OH",
            RuleId::LineGroupLeader => "Line GL is indirect",
            RuleId::GroupLeader => "GL outside Line is OH",
            RuleId::TeamLevel => "TL and TM levels default to indirect",
            RuleId::Fallback => "unrecognized department or level falls back to indirect",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RuleId::Fallback)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One `(predicate, result)` row of the decision table.
#[derive(Clone, Copy)]
pub struct ClassificationRule {
    pub id: RuleId,
    pub predicate: fn(&RuleInput) -> bool,
    pub result: Classification,
}

impl fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("id", &self.id)
            .field("result", &self.result)
            .finish()
    }
}

/// Result used when no rule in the table matches.
pub const FALLBACK: Classification = Classification::Indirect;

/// The audited rule table, evaluated top to bottom. First match wins.
pub const RULE_TABLE: [ClassificationRule; 12] = [
    ClassificationRule {
        id: RuleId::SeparatedProcess,
        predicate: is_separated_process,
        result: Classification::Indirect,
    },
    ClassificationRule {
        id: RuleId::CeMixing,
        predicate: |input| is_ce_tm(input) && input.subtitle.contains(MIXING),
        result: Classification::Direct,
    },
    ClassificationRule {
        id: RuleId::CeNonMixing,
        predicate: is_ce_tm,
        result: Classification::Oh,
    },
    ClassificationRule {
        id: RuleId::PlantProductionTm,
        predicate: |input| input.department_is(PLANT_PRODUCTION) && input.level == Level::TM,
        result: Classification::Direct,
    },
    ClassificationRule {
        id: RuleId::FgWhShipping,
        predicate: |input| is_fg_wh_tm(input) && input.subtitle.contains(SHIPPING),
        result: Classification::Oh,
    },
    ClassificationRule {
        id: RuleId::FgWhTm,
        predicate: is_fg_wh_tm,
        result: Classification::Indirect,
    },
    ClassificationRule {
        id: RuleId::FixedOhDepartment,
        predicate: |input| input.department_in(&FIXED_OH_DEPARTMENTS),
        result: Classification::Oh,
    },
    ClassificationRule {
        id: RuleId::FixedIndirectDepartment,
        predicate: |input| input.department_in(&FIXED_INDIRECT_DEPARTMENTS),
        result: Classification::Indirect,
    },
    ClassificationRule {
        id: RuleId::ManagementLevel,
        predicate: |input| {
            input.has_known_shape() && matches!(input.level, Level::PM | Level::LM)
        },
        result: Classification::Oh,
    },
    ClassificationRule {
        id: RuleId::LineGroupLeader,
        predicate: |input| {
            input.has_known_shape() && input.level == Level::GL && input.department_is(LINE)
        },
        result: Classification::Indirect,
    },
    ClassificationRule {
        id: RuleId::GroupLeader,
        predicate: |input| input.has_known_shape() && input.level == Level::GL,
        result: Classification::Oh,
    },
    ClassificationRule {
        id: RuleId::TeamLevel,
        predicate: |input| {
            input.has_known_shape() && matches!(input.level, Level::TL | Level::TM)
        },
        result: Classification::Indirect,
    },
];

fn is_separated_process(input: &RuleInput) -> bool {
    SEPARATED_PROCESSES.iter().any(|name| {
        let name = normalize(name);
        input.process_type.contains(&name) || input.department.contains(&name)
    })
}

fn is_ce_tm(input: &RuleInput) -> bool {
    input.department_is(CE) && input.level == Level::TM
}

fn is_fg_wh_tm(input: &RuleInput) -> bool {
    input.department_is(FG_WH) && input.level == Level::TM
}
