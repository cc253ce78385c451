//! One traffic-survey record: a vehicle crossing a junction at a time of day.

use serde::Deserialize;

use crate::error::{Result, SurveyError};

pub const HOURS_PER_DAY: usize = 24;

/// A survey row exactly as it appears in the CSV. Column names are part of the
/// file contract, including the `elctricHybrid` spelling.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    #[serde(rename = "VehicleType")]
    pub vehicle_type: String,
    #[serde(rename = "elctricHybrid")]
    pub electric_hybrid: String,
    #[serde(rename = "JunctionName")]
    pub junction_name: String,
    #[serde(rename = "travel_Direction_in")]
    pub direction_in: String,
    #[serde(rename = "travel_Direction_out")]
    pub direction_out: String,
    #[serde(rename = "timeOfDay")]
    pub time_of_day: String,
    #[serde(rename = "VehicleSpeed")]
    pub vehicle_speed: String,
    #[serde(rename = "JunctionSpeedLimit")]
    pub junction_speed_limit: String,
    #[serde(rename = "Weather_Conditions")]
    pub weather_conditions: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficObservation {
    pub vehicle_type: String,
    pub electric_hybrid: bool,
    pub junction_name: String,
    pub direction_in: String,
    pub direction_out: String,
    pub time_of_day: String,
    pub vehicle_speed: i32,
    pub junction_speed_limit: i32,
    pub weather_conditions: String,
}

impl TrafficObservation {
    /// Text before the first colon of the time of day, e.g. `"08"` for `"08:15:00"`.
    pub fn hour_key(&self) -> &str {
        self.time_of_day
            .split(':')
            .next()
            .unwrap_or_default()
            .trim()
    }

    /// The hour bucket (0-23) named by [`hour_key`](Self::hour_key), if it is one.
    pub fn hour(&self) -> Option<usize> {
        self.hour_key()
            .parse::<usize>()
            .ok()
            .filter(|h| *h < HOURS_PER_DAY)
    }

    pub fn is_over_speed(&self) -> bool {
        self.vehicle_speed > self.junction_speed_limit
    }

    /// Inbound and outbound direction match, i.e. the vehicle went straight on.
    pub fn did_not_turn(&self) -> bool {
        eq_trimmed(&self.direction_in, &self.direction_out)
    }

    pub fn mentions_rain(&self) -> bool {
        self.weather_conditions.to_lowercase().contains("rain")
    }

    /// Validates a raw CSV row. `line` is the 1-based data row used in errors.
    pub fn from_raw(raw: RawObservation, line: usize) -> Result<Self> {
        let vehicle_speed = parse_int(&raw.vehicle_speed, "VehicleSpeed", line)?;
        let junction_speed_limit =
            parse_int(&raw.junction_speed_limit, "JunctionSpeedLimit", line)?;

        let observation = TrafficObservation {
            vehicle_type: raw.vehicle_type,
            electric_hybrid: raw.electric_hybrid.trim().eq_ignore_ascii_case("true"),
            junction_name: raw.junction_name,
            direction_in: raw.direction_in,
            direction_out: raw.direction_out,
            time_of_day: raw.time_of_day,
            vehicle_speed,
            junction_speed_limit,
            weather_conditions: raw.weather_conditions,
        };

        if observation.hour().is_none() {
            return Err(observation.bad_hour(line));
        }

        Ok(observation)
    }

    pub(crate) fn bad_hour(&self, line: usize) -> SurveyError {
        SurveyError::malformed(
            line,
            format!("timeOfDay '{}' has no hour 00-23", self.time_of_day),
        )
    }
}

fn eq_trimmed(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn parse_int(value: &str, field: &str, line: usize) -> Result<i32> {
    value
        .trim()
        .parse()
        .map_err(|_| SurveyError::malformed(line, format!("{field} '{value}' is not an integer")))
}
