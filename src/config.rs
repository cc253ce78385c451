//! Survey configuration: which junctions the junction-scoped metrics use and
//! which vehicle-type literal counts as a bus.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SurveyError};

pub const DEFAULT_JUNCTION_A: &str = "Elm Avenue/Rabbit Road";
pub const DEFAULT_JUNCTION_B: &str = "Hanley Highway/Westway";

/// Vehicle-type literal the survey data uses for buses. The recorded data
/// spells it `Buss`, so matching `bus` would undercount.
pub const DEFAULT_BUS_TOKEN: &str = "Buss";

/// Junction names and literals consulted by the aggregator.
///
/// Loaded from a JSON object on disk; any omitted field keeps its default:
/// ```json
/// {
///   "junction_a": "Elm Avenue/Rabbit Road",
///   "junction_b": "Hanley Highway/Westway",
///   "bus_token": "Buss"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Junction with the bus-north count, scooter percentage and first histogram.
    pub junction_a: String,
    /// Junction with the busiest-hour metric and second histogram.
    pub junction_b: String,
    pub bus_token: String,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            junction_a: DEFAULT_JUNCTION_A.to_string(),
            junction_b: DEFAULT_JUNCTION_B.to_string(),
            bus_token: DEFAULT_BUS_TOKEN.to_string(),
        }
    }
}

impl SurveyConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SurveyError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: SurveyConfig =
            serde_json::from_str(content).map_err(|e| SurveyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        junction_a: Option<String>,
        junction_b: Option<String>,
        bus_token: Option<String>,
    ) -> Result<Self> {
        if let Some(j) = junction_a {
            self.junction_a = j;
        }
        if let Some(j) = junction_b {
            self.junction_b = j;
        }
        if let Some(t) = bus_token {
            self.bus_token = t;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("junction_a", &self.junction_a),
            ("junction_b", &self.junction_b),
            ("bus_token", &self.bus_token),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(SurveyError::Config(format!("{name} must not be empty")));
            }
        }
        if self.junction_a.trim().eq_ignore_ascii_case(self.junction_b.trim()) {
            return Err(SurveyError::Config(
                "junction_a and junction_b must name different junctions".to_string(),
            ));
        }
        Ok(())
    }
}
