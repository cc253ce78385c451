//! CLI entry point for the traffic survey tool.
//!
//! Provides subcommands for analyzing one or more daily survey CSVs (console
//! report, results log, optional CSV summary and JSON) and for printing the
//! hourly traffic table of a single dataset.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use traffic_survey::{
    aggregate::Aggregator,
    config::SurveyConfig,
    date::SurveyDate,
    output::format_hourly_table,
    session::{AnalyzeOptions, analyze_file, run_analyze},
};

#[derive(Parser)]
#[command(name = "traffic_survey")]
#[command(about = "A tool to analyze daily traffic survey CSV files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and record statistics for one or more survey datasets
    Analyze {
        /// Survey CSV files (optionally .gz), processed in order
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Survey date shown in the report, DD/MM/YYYY
        #[arg(short, long)]
        date: Option<SurveyDate>,

        /// Text log that each report block is appended to
        #[arg(short, long, default_value = "results.txt")]
        results: PathBuf,

        /// Optional: CSV file to append one summary row per dataset to
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Print the report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        survey: SurveyArgs,
    },
    /// Print the hourly traffic table for both junctions of a dataset
    Hourly {
        /// Survey CSV file (optionally .gz)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Survey date shown in the table title, DD/MM/YYYY
        #[arg(short, long)]
        date: Option<SurveyDate>,

        #[command(flatten)]
        survey: SurveyArgs,
    },
}

#[derive(Args)]
struct SurveyArgs {
    /// JSON file overriding junction names and the bus literal
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Junction used for bus, scooter and first hourly series
    #[arg(long)]
    junction_a: Option<String>,

    /// Junction used for the busiest hour and second hourly series
    #[arg(long)]
    junction_b: Option<String>,

    /// Vehicle-type literal counted as a bus
    #[arg(long)]
    bus_token: Option<String>,
}

impl SurveyArgs {
    fn into_config(self) -> Result<SurveyConfig> {
        let base = match &self.config {
            Some(path) => SurveyConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SurveyConfig::default(),
        };
        Ok(base.with_overrides(self.junction_a, self.junction_b, self.bus_token)?)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let _file_guard = init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            files,
            date,
            results,
            summary,
            json,
            survey,
        } => {
            let aggregator = Aggregator::new(survey.into_config()?);
            let options = AnalyzeOptions {
                date,
                results,
                summary,
                json,
            };
            let outcome = run_analyze(&aggregator, &files, &options)
                .context("Failed to record survey results")?;
            if outcome.failed > 0 {
                anyhow::bail!(
                    "{} of {} datasets could not be processed",
                    outcome.failed,
                    files.len()
                );
            }
        }
        Commands::Hourly { file, date, survey } => {
            let aggregator = Aggregator::new(survey.into_config()?);
            let report = analyze_file(&aggregator, &file, date)
                .with_context(|| format!("Failed to process {}", file.display()))?;
            print!("{}", format_hourly_table(&report));
        }
    }

    Ok(())
}

/// Colored stderr output plus a daily-rolling JSON log file.
///
/// `LOG_FILE_PATH` picks the log file; `RUST_LOG` and `RUST_LOG_JSON` filter
/// the two layers. The returned guard must live until exit so buffered lines
/// reach the file.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/traffic_survey.log".to_string());
    let log_path = Path::new(&log_file_path);
    let log_dir = log_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = log_path
        .file_name()
        .unwrap_or(OsStr::new("traffic_survey.log"));

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, log_file_name));

    let console = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_file = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(console)
        .with(json_file)
        .init();

    Ok(guard)
}
