//! Calendar-validated survey dates.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SurveyError};

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2024;

const THIRTY_DAY_MONTHS: [u32; 4] = [4, 6, 9, 11];

/// The day a survey dataset was recorded, restricted to the survey years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SurveyDate(NaiveDate);

impl SurveyDate {
    /// Validates each component's range, then the day against the month.
    pub fn new(day: u32, month: u32, year: i32) -> Result<Self> {
        check_range(i64::from(day), 1, 31)?;
        check_range(i64::from(month), 1, 12)?;
        check_range(i64::from(year), i64::from(MIN_YEAR), i64::from(MAX_YEAR))?;

        let max_day = days_in_month(month, year);
        if day > max_day {
            let msg = if month == 2 {
                format!("Invalid day for February in the year {year}. Maximum is {max_day}.")
            } else {
                format!("Invalid day for the month {month}. Maximum is {max_day}.")
            };
            return Err(SurveyError::InvalidDate(msg));
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .map(SurveyDate)
            .ok_or_else(|| SurveyError::InvalidDate(format!("{day:02}/{month:02}/{year}")))
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        m if THIRTY_DAY_MONTHS.contains(&m) => 30,
        _ => 31,
    }
}

fn check_range(value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(SurveyError::InvalidDate(format!(
            "Out of range - values must be in the range {min} and {max}."
        )));
    }
    Ok(())
}

fn parse_component(part: &str) -> Result<u32> {
    let part = part.trim();
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(SurveyError::InvalidDate(
            "Positive Integer required".to_string(),
        ));
    }
    part.parse()
        .map_err(|_| SurveyError::InvalidDate(format!("'{part}' is too large")))
}

impl FromStr for SurveyDate {
    type Err = SurveyError;

    /// Parses `DD/MM/YYYY`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('/').collect();
        let [day, month, year] = parts.as_slice() else {
            return Err(SurveyError::InvalidDate(format!(
                "expected DD/MM/YYYY, got '{s}'"
            )));
        };
        let day = parse_component(day)?;
        let month = parse_component(month)?;
        let year = i32::try_from(parse_component(year)?)
            .map_err(|_| SurveyError::InvalidDate(format!("year '{year}' is too large")))?;
        SurveyDate::new(day, month, year)
    }
}

impl fmt::Display for SurveyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{}", self.day(), self.month(), self.year())
    }
}
