use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("Rule table is empty")]
    EmptyRuleTable,

    #[error("Rule '{0}' appears more than once in the rule table")]
    DuplicateRule(String),
}
