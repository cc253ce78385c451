//! Output formatting and persistence for survey statistics.
//!
//! Supports the console report block, the append-only results log, a CSV
//! summary row per dataset, JSON, and a plain-text hourly table.

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::aggregate::Aggregation;
use crate::config::SurveyConfig;
use crate::date::SurveyDate;
use crate::error::Result;
use crate::observation::HOURS_PER_DAY;
use crate::stats::HourlyHistogram;

pub const SEPARATOR: &str = "***********************************";
const BANNER: &str = "***************************";
const BAR_WIDTH: usize = 40;

/// An [`Aggregation`] together with what is needed to present it.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyReport {
    pub dataset: String,
    pub survey_date: Option<SurveyDate>,
    pub generated_at: DateTime<Utc>,
    pub junction_a: String,
    pub junction_b: String,
    #[serde(flatten)]
    pub aggregation: Aggregation,
}

impl SurveyReport {
    pub fn new(
        dataset: impl Into<String>,
        survey_date: Option<SurveyDate>,
        config: &SurveyConfig,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            survey_date,
            generated_at: Utc::now(),
            junction_a: config.junction_a.clone(),
            junction_b: config.junction_b.clone(),
            aggregation,
        }
    }

    /// Busiest-hour ranges joined for display, e.g.
    /// `Between 08:00 and 09:00, Between 14:00 and 15:00`.
    pub fn busiest_hours_text(&self) -> String {
        self.aggregation
            .statistics
            .busiest_hours
            .iter()
            .map(|h| format!("Between {h}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One flattened row of the CSV summary file.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    generated_at: DateTime<Utc>,
    dataset: &'a str,
    survey_date: Option<SurveyDate>,
    total_vehicles: usize,
    total_trucks: usize,
    truck_percentage: u32,
    electric_vehicles: usize,
    two_wheeled_vehicles: usize,
    buses_north_junction_a: usize,
    vehicles_not_turning: usize,
    average_bicycles_per_hour: u32,
    over_speed_limit: usize,
    junction_a_vehicles: usize,
    junction_b_vehicles: usize,
    scooter_percentage_junction_a: u32,
    busiest_hour_count: usize,
    busiest_hours: String,
    rain_hours: usize,
}

impl<'a> From<&'a SurveyReport> for SummaryRow<'a> {
    fn from(report: &'a SurveyReport) -> Self {
        let s = &report.aggregation.statistics;
        SummaryRow {
            generated_at: report.generated_at,
            dataset: &report.dataset,
            survey_date: report.survey_date,
            total_vehicles: s.total_vehicles,
            total_trucks: s.total_trucks,
            truck_percentage: s.truck_percentage,
            electric_vehicles: s.electric_vehicles,
            two_wheeled_vehicles: s.two_wheeled_vehicles,
            buses_north_junction_a: s.buses_north_junction_a,
            vehicles_not_turning: s.vehicles_not_turning,
            average_bicycles_per_hour: s.average_bicycles_per_hour,
            over_speed_limit: s.over_speed_limit,
            junction_a_vehicles: s.junction_a_vehicles,
            junction_b_vehicles: s.junction_b_vehicles,
            scooter_percentage_junction_a: s.scooter_percentage_junction_a,
            busiest_hour_count: s.busiest_hour_count,
            busiest_hours: s
                .busiest_hours
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            rain_hours: s.rain_hours,
        }
    }
}

/// Renders the statistics block shown on the console and written to the log.
pub fn format_report(report: &SurveyReport) -> String {
    let s = &report.aggregation.statistics;
    let a = &report.junction_a;
    let b = &report.junction_b;

    let mut lines = vec![
        BANNER.to_string(),
        format!("Data file selected is {}", report.dataset),
    ];
    if let Some(date) = report.survey_date {
        lines.push(format!("Survey date is {date}"));
    }
    lines.push(BANNER.to_string());
    lines.extend([
        format!("The total number of vehicles recorded for this date is {}", s.total_vehicles),
        format!("The total number of trucks recorded for this date is {}", s.total_trucks),
        format!("The total number of electric vehicles for this date is {}", s.electric_vehicles),
        format!("The total number of two-wheeled vehicles for this date is {}", s.two_wheeled_vehicles),
        format!("The total number of Busses leaving {a} heading North is {}", s.buses_north_junction_a),
        format!("The total number of Vehicles through both junctions not turning left or right is {}", s.vehicles_not_turning),
        format!("The percentage of total vehicles recorded that are trucks for this date is {}%", s.truck_percentage),
        format!("the average number of Bikes per hour for this date is {}", s.average_bicycles_per_hour),
        format!("The total number of Vehicles recorded as over the speed limit for this date is {}", s.over_speed_limit),
        format!("The total number of vehicles recorded through {a} junction is {}", s.junction_a_vehicles),
        format!("The total number of vehicles recorded through {b} junction is {}", s.junction_b_vehicles),
        format!("{}% of vehicles recorded through {a} are scooters.", s.scooter_percentage_junction_a),
        format!("The highest number of vehicles in an hour on {b} is {}", s.busiest_hour_count),
        format!("The most vehicles through {b} were recorded between {}", report.busiest_hours_text()),
        format!("The number of hours of rain for this date is {}", s.rain_hours),
    ]);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Writes the report block to stdout.
pub fn print_report(report: &SurveyReport) {
    println!("\n{}", format_report(report));
}

/// Writes the report as pretty-printed JSON to stdout.
pub fn print_json(report: &SurveyReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::from)?;
    println!("{json}");
    Ok(())
}

/// Appends the report block and a separator line to the results log.
///
/// Creates the file if it does not already exist; existing content is kept.
pub fn append_report(path: impl AsRef<Path>, report: &SurveyReport) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Appending report block");

    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    write!(file, "\n{}\n{SEPARATOR}\n", format_report(report))?;
    file.flush()?;

    Ok(())
}

/// Appends the report as one row of a CSV summary file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_summary(path: impl AsRef<Path>, report: &SurveyReport) -> Result<()> {
    let path = path.as_ref();
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV summary row");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // headers only on the first write
        .from_writer(file);

    writer
        .serialize(SummaryRow::from(report))
        .map_err(std::io::Error::from)?;
    writer.flush()?;

    Ok(())
}

/// Renders both junctions' hourly counts side by side with proportional bars.
pub fn format_hourly_table(report: &SurveyReport) -> String {
    let a = &report.aggregation.junction_a_hourly;
    let b = &report.aggregation.junction_b_hourly;
    let scale = a.max().max(b.max());

    let title = match report.survey_date {
        Some(date) => format!("Vehicle frequency per hour ({date})"),
        None => format!("Vehicle frequency per hour ({})", report.dataset),
    };
    let mut lines = vec![
        title,
        format!("  A = {}", report.junction_a),
        format!("  B = {}", report.junction_b),
    ];
    for hour in 0..HOURS_PER_DAY {
        lines.push(format!("{hour:02}  A {}", bar(a, hour, scale)));
        lines.push(format!("    B {}", bar(b, hour, scale)));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn bar(hist: &HourlyHistogram, hour: usize, scale: usize) -> String {
    let count = hist.get(hour);
    let width = if scale == 0 { 0 } else { count * BAR_WIDTH / scale };
    format!("{:>4} {}", count, "#".repeat(width))
}
