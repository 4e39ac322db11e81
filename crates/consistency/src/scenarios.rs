use crate::error::ValidationError;
use crate::report::{
    AutomatedTestRun, DataConsistencyReport, HealthStatus, OverallStatus, ScenarioResult,
    TestRunSummary,
};
use crate::validator::DataConsistencyValidator;
use classification::Classifier;
use configuration::{ScenarioConfig, SynthesisParams};
use core_types::{Classification, Level, PageData, Position};
use std::path::Path;
use uuid::Uuid;

/// Page key of the synthesized detail page.
pub const DETAIL_PAGE: &str = "page1";
/// Page key of the second detail page carrying the injected contradiction.
pub const CONTRADICTION_PAGE: &str = "page2";
/// Page key of the separated-process detail page.
pub const SEPARATED_PAGE: &str = "separated";
pub const DIRECT_ROLL_UP_PAGE: &str = "page4Direct";
pub const INDIRECT_ROLL_UP_PAGE: &str = "page4Indirect";

/// Where a scenario's page data comes from.
#[derive(Debug, Clone)]
pub enum ScenarioData {
    PageData(PageData),
    Synthesized(SynthesisParams),
    /// The scenario could not be prepared; running it yields a `critical` report.
    Unavailable(ValidationError),
}

/// A named input for [`DataConsistencyValidator::run_automated_validation_tests`].
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub data: ScenarioData,
}

impl Scenario {
    pub fn from_page_data(name: &str, description: &str, page_data: PageData) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            data: ScenarioData::PageData(page_data),
        }
    }

    pub fn synthesized(name: &str, description: &str, params: SynthesisParams) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            data: ScenarioData::Synthesized(params),
        }
    }

    /// Resolves a configured scenario. `load` reads a page-data file; its error text is
    /// kept so the failed run explains itself.
    pub fn from_config<F>(config: &ScenarioConfig, load: F) -> Self
    where
        F: FnOnce(&Path) -> Result<PageData, String>,
    {
        let data = match (&config.page_data, &config.synthesis) {
            (Some(path), None) => match load(path) {
                Ok(page_data) => ScenarioData::PageData(page_data),
                Err(reason) => ScenarioData::Unavailable(ValidationError::ScenarioUnavailable {
                    name: config.name.clone(),
                    reason,
                }),
            },
            (None, Some(params)) => ScenarioData::Synthesized(params.clone()),
            (None, None) => {
                ScenarioData::Unavailable(ValidationError::EmptyScenario(config.name.clone()))
            }
            (Some(_), Some(_)) => ScenarioData::Unavailable(ValidationError::ScenarioUnavailable {
                name: config.name.clone(),
                reason: "page_data and synthesis are mutually exclusive".to_string(),
            }),
        };
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            data,
        }
    }

    fn page_data(&self, classifier: &dyn Classifier) -> Result<PageData, ValidationError> {
        match &self.data {
            ScenarioData::PageData(page_data) => Ok(page_data.clone()),
            ScenarioData::Synthesized(params) => synthesize(params, classifier),
            ScenarioData::Unavailable(error) => Err(error.clone()),
        }
    }
}

/// The suite run when no scenarios are supplied.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::synthesized(
            "baseline",
            "Reference org chart with reconciled roll-up pages",
            SynthesisParams {
                include_aggregation: true,
                ..SynthesisParams::default()
            },
        ),
        Scenario::synthesized(
            "multi-copy",
            "Reference org chart repeated five times",
            SynthesisParams {
                copies: 5,
                include_aggregation: true,
                ..SynthesisParams::default()
            },
        ),
        Scenario::synthesized(
            "injected-inconsistency",
            "Line PM attached as direct on a second page",
            SynthesisParams {
                inject_inconsistency: true,
                ..SynthesisParams::default()
            },
        ),
        Scenario::synthesized(
            "malformed-records",
            "Blank departments and a render-only level",
            SynthesisParams {
                drop_departments: 2,
                extra_levels: vec!["VSM".to_string()],
                ..SynthesisParams::default()
            },
        ),
        Scenario::from_page_data("empty-input", "No pages at all", PageData::new()),
    ]
}

// (department, level, subtitle)
const REFERENCE_CHART: &[(&str, Level, Option<&str>)] = &[
    ("Plant Production", Level::PM, None),
    ("Plant Production", Level::TM, None),
    ("Line", Level::PM, None),
    ("Line", Level::LM, None),
    ("Line", Level::GL, None),
    ("Line", Level::TL, None),
    ("Line", Level::TM, None),
    ("CE", Level::GL, None),
    ("CE", Level::TM, Some("Mixing")),
    ("CE", Level::TM, Some("Compounding")),
    ("FG WH", Level::GL, None),
    ("FG WH", Level::TM, Some("Shipping")),
    ("FG WH", Level::TM, Some("Picking")),
    ("Quality", Level::GL, None),
    ("Quality", Level::TL, None),
    ("Quality", Level::TM, None),
    ("Admin", Level::TM, None),
    ("Small Tooling", Level::TM, None),
    ("Sub Material", Level::TM, None),
    ("TPM", Level::GL, None),
    ("CQM", Level::TL, None),
    ("Lean", Level::LM, None),
    ("Security", Level::TM, None),
    ("RMCC", Level::TM, None),
    ("Raw Material", Level::TM, None),
    ("ACC Market", Level::TL, None),
    ("P&L Market", Level::GL, None),
    ("Bottom Market", Level::TM, None),
];

// (department, level, process type)
const SEPARATED_CHART: &[(&str, Level, &str)] = &[
    ("No-sew", Level::GL, "No-sew"),
    ("HF Welding", Level::TM, "HF Welding"),
];

/// Builds page data from the reference org chart.
///
/// The chart is repeated `copies` times on [`DETAIL_PAGE`], followed by one Line
/// position per extra level; the first `drop_departments` detail positions lose their
/// department. Roll-up pages, when requested, partition every detail position by
/// `classifier`, so they reconcile by construction.
pub fn synthesize(
    params: &SynthesisParams,
    classifier: &dyn Classifier,
) -> Result<PageData, ValidationError> {
    if params.copies == 0 {
        return Err(ValidationError::InvalidSynthesis(
            "copies must be at least 1".to_string(),
        ));
    }
    if params.extra_levels.iter().any(|level| level.trim().is_empty()) {
        return Err(ValidationError::InvalidSynthesis(
            "extra level names must not be empty".to_string(),
        ));
    }

    let mut detail = Vec::with_capacity(REFERENCE_CHART.len() * params.copies);
    for copy in 1..=params.copies {
        for (row, (department, level, subtitle)) in REFERENCE_CHART.iter().enumerate() {
            let mut position = Position::new(format!("{copy}-{}", row + 1), *department, level.clone());
            if let Some(subtitle) = subtitle {
                position = position.with_subtitle(*subtitle);
            }
            detail.push(position);
        }
    }
    for (i, level) in params.extra_levels.iter().enumerate() {
        detail.push(Position::new(format!("x-{}", i + 1), "Line", level.trim()));
    }

    if params.drop_departments > detail.len() {
        return Err(ValidationError::InvalidSynthesis(format!(
            "cannot blank {} department(s) on a page of {} position(s)",
            params.drop_departments,
            detail.len()
        )));
    }
    for position in detail.iter_mut().take(params.drop_departments) {
        position.department.clear();
    }

    let separated: Vec<Position> = SEPARATED_CHART
        .iter()
        .enumerate()
        .map(|(i, (department, level, process))| {
            Position::new(format!("s-{}", i + 1), *department, level.clone())
                .with_process_type(*process)
        })
        .collect();

    let mut page_data = PageData::new();
    page_data.insert(DETAIL_PAGE.to_string(), detail);
    page_data.insert(SEPARATED_PAGE.to_string(), separated);

    if params.inject_inconsistency {
        page_data.insert(
            CONTRADICTION_PAGE.to_string(),
            vec![Position::new("1-3", "Line", Level::PM).with_classification(Classification::Direct)],
        );
    }

    if params.include_aggregation {
        let (direct, indirect): (Vec<Position>, Vec<Position>) = page_data
            .values()
            .flatten()
            .cloned()
            .partition(|p| classifier.classify_position(p) == Classification::Direct);
        page_data.insert(DIRECT_ROLL_UP_PAGE.to_string(), direct);
        page_data.insert(INDIRECT_ROLL_UP_PAGE.to_string(), indirect);
    }

    tracing::debug!(
        copies = params.copies,
        pages = page_data.len(),
        positions = page_data.values().map(Vec::len).sum::<usize>(),
        "Synthesized scenario page data"
    );
    Ok(page_data)
}

impl DataConsistencyValidator {
    /// Runs each scenario through [`Self::validate_application_consistency`].
    ///
    /// `None` runs [`builtin_scenarios`]. A scenario whose input cannot be prepared is
    /// recorded as a `critical` report; the batch always completes.
    pub fn run_automated_validation_tests(
        &mut self,
        scenarios: Option<Vec<Scenario>>,
    ) -> AutomatedTestRun {
        let run_id = Uuid::new_v4();
        let scenarios = scenarios.unwrap_or_else(builtin_scenarios);
        tracing::info!(%run_id, scenarios = scenarios.len(), "Starting automated validation run");

        let mut results = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let report = match scenario.page_data(self.classifier.as_ref()) {
                Ok(page_data) => self.validate_application_consistency(&page_data, Some(&scenario.name)),
                Err(error) => {
                    tracing::warn!(scenario = %scenario.name, %error, "Scenario could not be executed");
                    DataConsistencyReport::execution_failure(Some(&scenario.name), &error.to_string())
                }
            };
            results.push(ScenarioResult {
                name: scenario.name,
                description: scenario.description,
                report,
            });
        }

        let summary = summarize_run(&results);
        tracing::info!(
            %run_id,
            passed = summary.passed,
            warnings = summary.warnings,
            failed = summary.failed,
            status = %summary.overall_status,
            "Automated validation run complete"
        );
        AutomatedTestRun {
            run_id,
            results,
            summary,
        }
    }
}

fn summarize_run(results: &[ScenarioResult]) -> TestRunSummary {
    let count = |health: HealthStatus| {
        results
            .iter()
            .filter(|r| r.report.overall_health == health)
            .count()
    };
    let passed = count(HealthStatus::Healthy);
    let warnings = count(HealthStatus::Warning);
    let failed = count(HealthStatus::Critical);

    let overall_status = if failed > 0 {
        OverallStatus::Fail
    } else if warnings > 0 {
        OverallStatus::Warning
    } else {
        OverallStatus::Pass
    };

    TestRunSummary {
        total: results.len(),
        passed,
        warnings,
        failed,
        overall_status,
    }
}
