//! Processing a list of datasets in one run.
//!
//! A dataset that cannot be loaded or aggregated is reported and skipped; the
//! remaining datasets are still processed.

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::aggregate::Aggregator;
use crate::dataset::load_dataset;
use crate::date::SurveyDate;
use crate::error::{Result, SurveyError};
use crate::output::{SurveyReport, append_report, append_summary, print_json, print_report};

/// Where and how each successful report is written.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub date: Option<SurveyDate>,
    pub results: PathBuf,
    pub summary: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Loads and aggregates one dataset.
#[tracing::instrument(skip_all, fields(dataset = %path.display()))]
pub fn analyze_file(
    aggregator: &Aggregator,
    path: &Path,
    date: Option<SurveyDate>,
) -> Result<SurveyReport> {
    let observations = load_dataset(path)?;
    let aggregation = aggregator.aggregate(&observations)?;
    Ok(SurveyReport::new(
        path.display().to_string(),
        date,
        aggregator.config(),
        aggregation,
    ))
}

/// Analyzes `files` in order, printing and appending each report.
///
/// # Errors
///
/// Dataset failures are counted in the returned [`SessionSummary`]. Only a
/// failure to write the results log or summary file is returned as an error.
pub fn run_analyze(
    aggregator: &Aggregator,
    files: &[PathBuf],
    options: &AnalyzeOptions,
) -> Result<SessionSummary> {
    let mut summary = SessionSummary::default();

    for file in files {
        match analyze_file(aggregator, file, options.date) {
            Ok(report) => {
                if options.json {
                    print_json(&report)?;
                } else {
                    print_report(&report);
                }
                append_report(&options.results, &report)?;
                if let Some(path) = &options.summary {
                    append_summary(path, &report)?;
                }
                summary.processed += 1;
                info!(dataset = %file.display(), "Dataset processed successfully");
            }
            Err(e) => {
                summary.failed += 1;
                report_failure(file, &e);
            }
        }
    }

    info!(
        processed = summary.processed,
        failed = summary.failed,
        "Finished processing datasets"
    );
    Ok(summary)
}

fn report_failure(path: &Path, e: &SurveyError) {
    match e {
        SurveyError::DatasetNotFound { .. } => {
            warn!(dataset = %path.display(), "Dataset not found, check the file name");
        }
        SurveyError::EmptyDataset => {
            warn!(dataset = %path.display(), "Dataset is empty or not formatted properly");
        }
        SurveyError::MalformedRecord { line, reason } => {
            error!(dataset = %path.display(), line, reason = %reason, "Malformed record, dataset skipped");
        }
        other => {
            error!(dataset = %path.display(), error = %other, "Failed to process dataset");
        }
    }
}
