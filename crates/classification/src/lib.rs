//! # Staffing Audit Classification Engine
//!
//! Maps a position's descriptive fields to exactly one cost category.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure logic crate that depends only on `core-types`.
//! - **Rules as Data:** The business policy lives in [`rules::RULE_TABLE`], an ordered
//!   list of `(predicate, result)` rows. The first matching row wins; when none match
//!   the engine returns the documented fallback instead of failing.
//! - **Injectable:** Downstream validators hold an `Arc<dyn Classifier>`, so tests can
//!   substitute a fake without touching the rule table.

pub mod engine;
pub mod error;
pub mod rules;

pub use engine::{ClassificationEngine, RuleMatch, classify};
pub use error::ClassificationError;
pub use rules::{ClassificationRule, RuleId};

use core_types::{Classification, Level, Position};

/// The core trait every classifier implements.
///
/// The `Send + Sync` bounds let independent validator instances share one classifier
/// across threads.
pub trait Classifier: Send + Sync {
    /// Classifies the given fields and reports which rule decided.
    fn explain(
        &self,
        department: &str,
        level: &Level,
        process_type: Option<&str>,
        subtitle: Option<&str>,
    ) -> RuleMatch;

    fn classify(
        &self,
        department: &str,
        level: &Level,
        process_type: Option<&str>,
        subtitle: Option<&str>,
    ) -> Classification {
        self.explain(department, level, process_type, subtitle).classification
    }

    fn explain_position(&self, position: &Position) -> RuleMatch {
        self.explain(
            &position.department,
            &position.level,
            position.process_type.as_deref(),
            position.subtitle.as_deref(),
        )
    }

    fn classify_position(&self, position: &Position) -> Classification {
        self.explain_position(position).classification
    }
}
