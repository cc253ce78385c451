//! CSV parser for traffic-survey datasets.

use std::io::Read;

use crate::error::{Result, SurveyError};
use crate::observation::{RawObservation, TrafficObservation};

/// Decodes every row of a header-bearing survey CSV.
///
/// # Errors
///
/// The first row with a missing column or a non-integer speed/limit aborts the
/// whole dataset with [`SurveyError::MalformedRecord`]. Rows are never skipped.
pub fn parse_observations<R: Read>(reader: R) -> Result<Vec<TrafficObservation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, result) in rdr.deserialize::<RawObservation>().enumerate() {
        let line = index + 1;
        let raw = result.map_err(|e| csv_error(e, line))?;
        rows.push(TrafficObservation::from_raw(raw, line)?);
    }

    Ok(rows)
}

fn csv_error(err: csv::Error, line: usize) -> SurveyError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => SurveyError::Io(e),
        _ => SurveyError::malformed(line, reason),
    }
}
