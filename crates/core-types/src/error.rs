use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown level '{0}': expected one of PM, LM, GL, TL, TM")]
    UnknownLevel(String),

    #[error("Unknown classification '{0}': expected direct, indirect or OH")]
    UnknownClassification(String),
}
