use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use configuration::{Config, load_config};
use consistency::{
    AutomatedTestRun, DataConsistencyReport, DataConsistencyValidator, QuickCheckResult,
    Scenario, ValidationSummaryReport,
};
use core_types::{Classification, PageData};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use validation::ValidationEngine;

/// The main entry point for the staffing audit tool.
fn main() -> Result<()> {
    let cli = Cli::parse();
    // Held until exit so buffered log lines reach the file.
    let _guard = init_tracing(cli.log_dir.as_deref())?;

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let mut validator = build_validator(&config);

    match cli.command {
        Commands::Validate(args) => handle_validate(&mut validator, args),
        Commands::Quick(args) => handle_quick(&mut validator, args),
        Commands::Scenarios(args) => handle_scenarios(&mut validator, &config, &cli.config, args),
        Commands::Summary(args) => handle_summary(&mut validator, &config, &cli.config, args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Classifies org-chart positions into direct, indirect and OH cost categories and
/// checks that every page of the application agrees.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the settings file. A missing file means defaults.
    #[arg(long, global = true, default_value = "validation.toml")]
    config: PathBuf,

    /// Also write logs to `staffing-audit.log` in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one page-data snapshot and print the full report.
    Validate(ValidateArgs),
    /// Validate one snapshot and print only the headline figures.
    Quick(QuickArgs),
    /// Run the configured scenarios, or the built-in suite when none are configured.
    Scenarios(OutputArgs),
    /// Run the scenarios and print the cross-run summary.
    Summary(OutputArgs),
}

#[derive(Parser)]
struct ValidateArgs {
    /// JSON object of page key → positions.
    #[arg(long, short)]
    input: PathBuf,

    /// Name recorded on the report.
    #[arg(long)]
    scenario: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser)]
struct QuickArgs {
    /// JSON object of page key → positions.
    #[arg(long, short)]
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser)]
struct OutputArgs {
    /// Print the raw report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Setup
// ==============================================================================

fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let builder = FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env());

    let guard = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, "staffing-audit.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing::subscriber::set_global_default(
                builder.with_ansi(false).with_writer(writer).finish(),
            )?;
            Some(guard)
        }
        None => {
            tracing::subscriber::set_global_default(
                builder.with_writer(std::io::stderr).finish(),
            )?;
            None
        }
    };
    Ok(guard)
}

fn build_validator(config: &Config) -> DataConsistencyValidator {
    let classifier: Arc<dyn classification::Classifier> =
        Arc::new(classification::ClassificationEngine::new());
    DataConsistencyValidator::new(
        ValidationEngine::new(classifier.clone()),
        classifier,
        config.health.clone(),
        config.report.clone(),
    )
}

fn read_page_data(path: &Path) -> Result<PageData> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read page data from {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse page data in {}", path.display()))
}

/// Configured scenarios, with `page_data` paths resolved against the config file's
/// directory. `None` selects the built-in suite.
fn configured_scenarios(config: &Config, config_path: &Path) -> Option<Vec<Scenario>> {
    if config.scenarios.is_empty() {
        return None;
    }
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    Some(
        config
            .scenarios
            .iter()
            .map(|scenario| {
                Scenario::from_config(scenario, |path| {
                    read_page_data(&base.join(path)).map_err(|e| format!("{e:#}"))
                })
            })
            .collect(),
    )
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn handle_validate(validator: &mut DataConsistencyValidator, args: ValidateArgs) -> Result<()> {
    let page_data = read_page_data(&args.input)?;
    let report = validator.validate_application_consistency(&page_data, args.scenario.as_deref());
    if args.output.json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

fn handle_quick(validator: &mut DataConsistencyValidator, args: QuickArgs) -> Result<()> {
    let page_data = read_page_data(&args.input)?;
    let result = validator.quick_validation_check(&page_data);
    if args.output.json {
        return print_json(&result);
    }
    print_quick(&result);
    Ok(())
}

fn handle_scenarios(
    validator: &mut DataConsistencyValidator,
    config: &Config,
    config_path: &Path,
    args: OutputArgs,
) -> Result<()> {
    let run = validator.run_automated_validation_tests(configured_scenarios(config, config_path));
    if args.json {
        return print_json(&run);
    }
    print_run(&run);
    Ok(())
}

fn handle_summary(
    validator: &mut DataConsistencyValidator,
    config: &Config,
    config_path: &Path,
    args: OutputArgs,
) -> Result<()> {
    let run = validator.run_automated_validation_tests(configured_scenarios(config, config_path));
    let summary = validator.generate_validation_summary_report(&run.reports());
    if args.json {
        return print_json(&summary);
    }
    print_summary(&summary);
    Ok(())
}

// ==============================================================================
// Output
// ==============================================================================

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize report")?);
    Ok(())
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table
}

fn stamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn percent(value: Decimal) -> String {
    format!("{value}%")
}

fn print_report(report: &DataConsistencyReport) {
    println!(
        "--- {} | {} | {} position(s) ---",
        report.scenario.as_deref().unwrap_or("application"),
        stamp(&report.timestamp),
        report.total_positions
    );
    println!("Overall health: {}", report.overall_health);

    let mut distribution = new_table();
    distribution.set_header(vec!["Classification", "Count", "Share", "Positions"]);
    for classification in Classification::ALL {
        let share = report.classification_distribution.get(classification);
        distribution.add_row(vec![
            classification.to_string(),
            share.count.to_string(),
            percent(share.percentage),
            share.positions.join(", "),
        ]);
    }
    println!("{distribution}");

    let mut departments = new_table();
    departments.set_header(vec!["Department", "Total", "direct", "indirect", "OH"]);
    for row in &report.department_analysis {
        departments.add_row(vec![
            row.department.clone(),
            row.total.to_string(),
            row.counts.direct.to_string(),
            row.counts.indirect.to_string(),
            row.counts.oh.to_string(),
        ]);
    }
    println!("{departments}");

    if let Some(aggregation) = &report.aggregation_validation {
        println!(
            "Roll-up pages: {} direct + {} indirect/OH vs {} detailed (drift {:+}, {} misplaced)",
            aggregation.direct_page_total,
            aggregation.indirect_page_total,
            aggregation.detailed_view_total,
            aggregation.count_drift,
            aggregation.mismatches.len()
        );
    }

    let mut issues = new_table();
    issues.set_header(vec!["Severity", "Type", "Description"]);
    for issue in &report.critical_issues {
        issues.add_row(vec!["critical".to_string(), issue.issue_type.to_string(), issue.description.clone()]);
    }
    for issue in &report.warnings {
        issues.add_row(vec!["warning".to_string(), issue.issue_type.to_string(), issue.description.clone()]);
    }
    if !report.critical_issues.is_empty() || !report.warnings.is_empty() {
        println!("{issues}");
    }

    for recommendation in &report.recommendations {
        println!("  - {recommendation}");
    }
}

fn print_quick(result: &QuickCheckResult) {
    println!("{}", result.quick_summary);
    for recommendation in &result.recommendations {
        println!("  - {recommendation}");
    }
}

fn print_run(run: &AutomatedTestRun) {
    println!("--- Validation run {} ---", run.run_id);
    let mut table = new_table();
    table.set_header(vec!["Scenario", "Health", "Positions", "Critical", "Warnings", "Description"]);
    for result in &run.results {
        table.add_row(vec![
            result.name.clone(),
            result.report.overall_health.to_string(),
            result.report.total_positions.to_string(),
            result.report.critical_issues.len().to_string(),
            result.report.warnings.len().to_string(),
            result.description.clone(),
        ]);
    }
    println!("{table}");
    println!(
        "Overall: {} ({} passed, {} warning, {} failed of {})",
        run.summary.overall_status,
        run.summary.passed,
        run.summary.warnings,
        run.summary.failed,
        run.summary.total
    );
}

fn print_summary(summary: &ValidationSummaryReport) {
    println!("--- Validation summary | {} ---", stamp(&summary.generated_at));
    let execution = &summary.execution_summary;
    println!(
        "{} report(s): {} healthy, {} warning, {} critical",
        execution.total_reports, execution.healthy, execution.warning, execution.critical
    );

    let trends = &summary.classification_trends;
    let mut table = new_table();
    table.set_header(vec!["Average direct", "Average indirect", "Average OH", "Consistency score"]);
    table.add_row(vec![
        percent(trends.average_direct_percentage),
        percent(trends.average_indirect_percentage),
        percent(trends.average_oh_percentage),
        trends.consistency_score.to_string(),
    ]);
    println!("{table}");

    if !summary.common_issues.is_empty() {
        let mut common = new_table();
        common.set_header(vec!["Type", "Frequency", "Reports", "Description"]);
        for issue in &summary.common_issues {
            common.add_row(vec![
                issue.issue_type.to_string(),
                issue.frequency.to_string(),
                issue.affected_reports.to_string(),
                issue.description.clone(),
            ]);
        }
        println!("{common}");
    }

    for recommendation in &summary.recommendations {
        println!("  - {recommendation}");
    }
}
