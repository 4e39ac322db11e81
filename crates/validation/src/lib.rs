//! # Staffing Audit Validation Engine
//!
//! Cross-checks the classifications that different pages attach to the same
//! positions, and reconciles the two roll-up pages against the detailed view.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** Depends on `core-types` and on the `Classifier` trait from
//!   `classification`. It never decides a category itself.
//! - **Reports, not errors:** Malformed positions are classified by the fallback
//!   rule, counted, and surfaced through issue lists. No operation here fails.
//!
//! ## Public API
//!
//! - `ValidationEngine`: the source → positions registry and every check over it.
//! - The report structs in [`report`].

pub mod engine;
pub mod report;

pub use engine::{UNASSIGNED_DEPARTMENT, ValidationEngine};
pub use report::{
    AggregationMismatch, AggregationPage, AggregationResult, ClassificationCounts,
    ConsistencyReport, ConsistencySummary, DepartmentBreakdown, DetailedReport, Inconsistency,
    LevelBreakdown, PositionValidation,
};
