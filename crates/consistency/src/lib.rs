//! # Staffing Audit Data Consistency Validator
//!
//! Application-level orchestration: validates whole page snapshots, runs batches of
//! named scenarios, and summarizes many runs.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Orchestration:** Drives a `ValidationEngine` and an injected
//!   `Classifier`; owns no classification policy of its own.
//! - **Always a report:** A run never fails. Unbuildable scenarios become `critical`
//!   reports so a batch always completes.
//! - **No I/O:** Page data arrives already parsed. Reading files is the caller's job.
//!
//! ## Public API
//!
//! - `DataConsistencyValidator`: `validate_application_consistency`,
//!   `quick_validation_check`, `run_automated_validation_tests` and
//!   `generate_validation_summary_report`.
//! - `Scenario` / `synthesize`: scenario inputs and reference-chart synthesis.

pub mod distribution;
pub mod error;
pub mod recommendations;
pub mod report;
pub mod scenarios;
pub mod summary;
pub mod validator;

pub use error::ValidationError;
pub use report::{
    AutomatedTestRun, CategoryShare, ClassificationDistribution, ClassificationTrends,
    CommonIssue, DataConsistencyReport, ExecutionSummary, HealthStatus, IssueType,
    OverallStatus, QuickCheckResult, ReportFindings, ScenarioResult, TestRunSummary,
    ValidationIssue, ValidationSummaryReport,
};
pub use scenarios::{Scenario, ScenarioData, builtin_scenarios, synthesize};
pub use validator::{
    DataConsistencyValidator, PageRole, QUICK_CHECK_RECOMMENDATION_LIMIT, page_role,
};
