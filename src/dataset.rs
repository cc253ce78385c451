//! Dataset loading from local files, plain or gzip-compressed.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SurveyError};
use crate::observation::TrafficObservation;
use crate::parser::parse_observations;

/// Opens a survey CSV and parses all of its rows.
///
/// Files ending in `.gz` are decompressed on the fly. A path that does not
/// exist yields [`SurveyError::DatasetNotFound`]; an existing file with only a
/// header parses to an empty vector and is rejected later by the aggregator.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<TrafficObservation>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SurveyError::DatasetNotFound {
            path: path.to_path_buf(),
        },
        _ => SurveyError::Io(e),
    })?;

    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let rows = parse_observations(reader)?;
    debug!(rows = rows.len(), "Dataset parsed");
    Ok(rows)
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}
