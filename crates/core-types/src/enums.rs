use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seniority tier of a position, in descending scope of responsibility.
///
/// Pages that only render the chart may carry extra tiers (MGL, VSM, ...). Those
/// deserialize into `Unrecognized` instead of failing, and the classifier treats
/// them with its fallback rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    PM,
    LM,
    GL,
    TL,
    TM,
    Unrecognized(String),
}

impl Level {
    /// The five tiers covered by the classification table.
    pub const CLASSIFIABLE: [Level; 5] = [Level::PM, Level::LM, Level::GL, Level::TL, Level::TM];

    pub fn is_classifiable(&self) -> bool {
        !matches!(self, Level::Unrecognized(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Level::PM => "PM",
            Level::LM => "LM",
            Level::GL => "GL",
            Level::TL => "TL",
            Level::TM => "TM",
            Level::Unrecognized(raw) => raw,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Unrecognized(String::new())
    }
}

impl From<String> for Level {
    fn from(raw: String) -> Self {
        Level::from_str(&raw).unwrap_or_else(|_| Level::Unrecognized(raw.trim().to_string()))
    }
}

impl From<&str> for Level {
    fn from(raw: &str) -> Self {
        Level::from(raw.to_string())
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_string()
    }
}

/// Strict parsing: only the five classifiable tiers are accepted.
impl FromStr for Level {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PM" => Ok(Level::PM),
            "LM" => Ok(Level::LM),
            "GL" => Ok(Level::GL),
            "TL" => Ok(Level::TL),
            "TM" => Ok(Level::TM),
            _ => Err(CoreError::UnknownLevel(s.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The cost category assigned to every position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Classification {
    /// Production-attributable.
    #[serde(rename = "direct", alias = "Direct")]
    Direct,
    /// Production support.
    #[serde(rename = "indirect", alias = "Indirect")]
    Indirect,
    /// Overhead and management.
    #[serde(rename = "OH", alias = "oh", alias = "Oh")]
    Oh,
}

impl Classification {
    pub const ALL: [Classification; 3] =
        [Classification::Direct, Classification::Indirect, Classification::Oh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Direct => "direct",
            Classification::Indirect => "indirect",
            Classification::Oh => "OH",
        }
    }

    /// Whether this category belongs on the combined "indirect + OH" roll-up page.
    pub fn is_indirect_or_oh(&self) -> bool {
        matches!(self, Classification::Indirect | Classification::Oh)
    }
}

impl FromStr for Classification {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Classification::Direct),
            "indirect" => Ok(Classification::Indirect),
            "oh" => Ok(Classification::Oh),
            _ => Err(CoreError::UnknownClassification(s.to_string())),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_level_parsing() {
        assert_eq!("tm".parse::<Level>(), Ok(Level::TM));
        assert_eq!(" GL ".parse::<Level>(), Ok(Level::GL));
        assert_eq!(
            "MGL".parse::<Level>(),
            Err(CoreError::UnknownLevel("MGL".to_string()))
        );
    }

    #[test]
    fn lenient_level_conversion_keeps_render_only_tiers() {
        assert_eq!(Level::from("VSM"), Level::Unrecognized("VSM".to_string()));
        assert_eq!(Level::from("pm"), Level::PM);
        assert!(!Level::from("").is_classifiable());
    }

    #[test]
    fn classification_round_trips_wire_names() {
        let json = serde_json::to_string(&Classification::Oh).unwrap();
        assert_eq!(json, "\"OH\"");
        let parsed: Classification = serde_json::from_str("\"oh\"").unwrap();
        assert_eq!(parsed, Classification::Oh);
        assert_eq!("Indirect".parse::<Classification>(), Ok(Classification::Indirect));
    }
}
