use crate::enums::{Classification, Level};
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Page key → positions rendered on that page.
///
/// A `BTreeMap` keeps page iteration order stable, so reports built from the same
/// input list their sources in the same order every time.
pub type PageData = BTreeMap<String, Vec<Position>>;

/// One staffing slot in the org chart, as delivered by a page component.
///
/// Every string field defaults to empty on deserialization. Malformed records are
/// still loaded so they can be reported instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// May carry an exception key such as "Mixing" or "Shipping".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Flags a separated production process (No-sew, HF Welding, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_type: Option<String>,
    #[serde(default)]
    pub source: String,
    /// Category attached upstream. Compared against the computed one, never trusted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

impl Position {
    pub fn new(id: impl Into<String>, department: impl Into<String>, level: impl Into<Level>) -> Self {
        Self {
            id: id.into(),
            department: department.into(),
            level: level.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_process_type(mut self, process_type: impl Into<String>) -> Self {
        self.process_type = Some(process_type.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    /// The normalized department used for cross-page comparison.
    pub fn department_key(&self) -> String {
        normalize(&self.department)
    }

    /// Human-readable label, e.g. `CE TM (Mixing)`.
    pub fn label(&self) -> String {
        let department = self.department.trim();
        let department = if department.is_empty() { "(no department)" } else { department };
        let level = self.level.as_str().trim();
        let level = if level.is_empty() { "(no level)" } else { level };

        match self.subtitle.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(subtitle) => format!("{department} {level} ({subtitle})"),
            None => format!("{department} {level}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_page_records() {
        let json = r#"{
            "id": "ce-tm-1",
            "department": "CE",
            "level": "TM",
            "subtitle": "Mixing",
            "processType": "No-sew",
            "source": "page1",
            "classification": "direct"
        }"#;
        let position: Position = serde_json::from_str(json).unwrap();
        assert_eq!(position.level, Level::TM);
        assert_eq!(position.process_type.as_deref(), Some("No-sew"));
        assert_eq!(position.classification, Some(Classification::Direct));
    }

    #[test]
    fn malformed_records_still_load() {
        let position: Position = serde_json::from_str(r#"{"level": "MGL"}"#).unwrap();
        assert!(position.id.is_empty());
        assert!(position.department.is_empty());
        assert_eq!(position.level, Level::Unrecognized("MGL".to_string()));
    }

    #[test]
    fn labels_include_subtitle_when_present() {
        let mixing = Position::new("1", "CE", Level::TM).with_subtitle("Mixing");
        assert_eq!(mixing.label(), "CE TM (Mixing)");
        assert_eq!(Position::new("2", "Line", Level::GL).label(), "Line GL");
        assert_eq!(Position::default().label(), "(no department) (no level)");
    }
}
