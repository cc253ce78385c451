//! Single-pass aggregation of survey observations.

use serde::Serialize;
use tracing::debug;

use crate::config::SurveyConfig;
use crate::error::{Result, SurveyError};
use crate::observation::{HOURS_PER_DAY, TrafficObservation};
use crate::stats::{AggregateStatistics, HourlyHistogram};

const TWO_WHEELED: [&str; 3] = ["bicycle", "motorcycle", "scooter"];
const TRUCK: &str = "truck";
const BICYCLE: &str = "bicycle";
const SCOOTER: &str = "scooter";
const NORTH: &str = "n";

/// Everything one dataset produces: the statistics and the hourly traffic at
/// both configured junctions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub statistics: AggregateStatistics,
    pub junction_a_hourly: HourlyHistogram,
    pub junction_b_hourly: HourlyHistogram,
}

/// Folds observations into [`Aggregation`]s for a fixed [`SurveyConfig`].
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: SurveyConfig,
}

/// Running counters for one pass. Derived values are computed in `finish`.
#[derive(Default)]
struct Tally {
    total: usize,
    trucks: usize,
    electric: usize,
    two_wheeled: usize,
    buses_north: usize,
    not_turning: usize,
    bicycles: usize,
    over_speed: usize,
    junction_a: usize,
    junction_b: usize,
    scooters_a: usize,
    rain: [bool; HOURS_PER_DAY],
    hourly_a: HourlyHistogram,
    hourly_b: HourlyHistogram,
}

impl Tally {
    fn finish(self) -> Aggregation {
        let (busiest_hour_count, busiest_hours) = self.hourly_b.busiest();

        let statistics = AggregateStatistics {
            total_vehicles: self.total,
            total_trucks: self.trucks,
            truck_percentage: AggregateStatistics::pct(self.trucks, self.total),
            electric_vehicles: self.electric,
            two_wheeled_vehicles: self.two_wheeled,
            total_bicycles: self.bicycles,
            average_bicycles_per_hour: AggregateStatistics::per_hour(self.bicycles),
            buses_north_junction_a: self.buses_north,
            vehicles_not_turning: self.not_turning,
            over_speed_limit: self.over_speed,
            junction_a_vehicles: self.junction_a,
            junction_b_vehicles: self.junction_b,
            scooter_percentage_junction_a: AggregateStatistics::pct(
                self.scooters_a,
                self.junction_a,
            ),
            busiest_hour_count,
            busiest_hours,
            rain_hours: self.rain.iter().filter(|r| **r).count(),
        };

        Aggregation {
            statistics,
            junction_a_hourly: self.hourly_a,
            junction_b_hourly: self.hourly_b,
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

impl Aggregator {
    pub fn new(config: SurveyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    /// Computes the statistics for one dataset in a single pass.
    ///
    /// # Errors
    ///
    /// [`SurveyError::EmptyDataset`] for an empty slice, and
    /// [`SurveyError::MalformedRecord`] for the first observation without a
    /// valid hour. No partial result is returned in either case.
    pub fn aggregate(&self, observations: &[TrafficObservation]) -> Result<Aggregation> {
        if observations.is_empty() {
            return Err(SurveyError::EmptyDataset);
        }

        let junction_a = normalize(&self.config.junction_a);
        let junction_b = normalize(&self.config.junction_b);
        let bus = normalize(&self.config.bus_token);

        let mut t = Tally::default();

        for (index, obs) in observations.iter().enumerate() {
            let hour = obs.hour().ok_or_else(|| obs.bad_hour(index + 1))?;
            let vehicle = normalize(&obs.vehicle_type);
            let junction = normalize(&obs.junction_name);

            t.total += 1;

            if vehicle == TRUCK {
                t.trucks += 1;
            }
            if vehicle == BICYCLE {
                t.bicycles += 1;
            }
            if TWO_WHEELED.contains(&vehicle.as_str()) {
                t.two_wheeled += 1;
            }
            if obs.electric_hybrid {
                t.electric += 1;
            }
            if obs.did_not_turn() {
                t.not_turning += 1;
            }
            if obs.is_over_speed() {
                t.over_speed += 1;
            }
            if obs.mentions_rain() {
                t.rain[hour] = true;
            }

            if junction == junction_a {
                t.junction_a += 1;
                t.hourly_a.record(hour);
                if vehicle == SCOOTER {
                    t.scooters_a += 1;
                }
                if vehicle == bus && normalize(&obs.direction_out) == NORTH {
                    t.buses_north += 1;
                }
            } else if junction == junction_b {
                t.junction_b += 1;
                t.hourly_b.record(hour);
            }
        }

        let aggregation = t.finish();
        debug!(
            total = aggregation.statistics.total_vehicles,
            junction_a = aggregation.statistics.junction_a_vehicles,
            junction_b = aggregation.statistics.junction_b_vehicles,
            "Aggregation complete"
        );
        Ok(aggregation)
    }
}

/// Aggregates with the default junctions and bus literal.
pub fn aggregate(observations: &[TrafficObservation]) -> Result<Aggregation> {
    Aggregator::default().aggregate(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_JUNCTION_A, DEFAULT_JUNCTION_B};

    fn obs(vehicle: &str, junction: &str, time: &str) -> TrafficObservation {
        TrafficObservation {
            vehicle_type: vehicle.to_string(),
            electric_hybrid: false,
            junction_name: junction.to_string(),
            direction_in: "E".to_string(),
            direction_out: "S".to_string(),
            time_of_day: time.to_string(),
            vehicle_speed: 20,
            junction_speed_limit: 30,
            weather_conditions: "Clear".to_string(),
        }
    }

    fn at_a(vehicle: &str) -> TrafficObservation {
        obs(vehicle, DEFAULT_JUNCTION_A, "08:00:00")
    }

    fn at_b(time: &str) -> TrafficObservation {
        obs("Car", DEFAULT_JUNCTION_B, time)
    }

    #[test]
    fn test_empty_input_is_empty_dataset() {
        let err = aggregate(&[]).unwrap_err();
        assert!(matches!(err, SurveyError::EmptyDataset));
    }

    #[test]
    fn test_total_matches_length() {
        let rows: Vec<_> = (0..17).map(|_| at_a("Car")).collect();
        let stats = aggregate(&rows).unwrap().statistics;
        assert_eq!(stats.total_vehicles, 17);
    }

    #[test]
    fn test_truck_percentage_extremes() {
        let all_trucks: Vec<_> = (0..5).map(|_| at_a("Truck")).collect();
        assert_eq!(aggregate(&all_trucks).unwrap().statistics.truck_percentage, 100);

        let no_trucks: Vec<_> = (0..5).map(|_| at_a("Car")).collect();
        let stats = aggregate(&no_trucks).unwrap().statistics;
        assert_eq!(stats.total_trucks, 0);
        assert_eq!(stats.truck_percentage, 0);
    }

    #[test]
    fn test_truck_percentage_uses_final_counts() {
        // Trucks only early on; the reported value must reflect the full total.
        let rows = vec![at_a("Truck"), at_a("Car"), at_a("Car"), at_a("Car")];
        let stats = aggregate(&rows).unwrap().statistics;
        assert_eq!(stats.total_trucks, 1);
        assert_eq!(stats.truck_percentage, 25);
    }

    #[test]
    fn test_two_wheeled_mixed_case_and_padding() {
        let rows = vec![
            at_a(" Bicycle "),
            at_a("MOTORCYCLE"),
            at_a("scooter\t"),
            at_a("Car"),
            at_a("Bicycles"),
            at_a("Truck"),
        ];
        let stats = aggregate(&rows).unwrap().statistics;
        assert_eq!(stats.two_wheeled_vehicles, 3);
        assert_eq!(stats.total_bicycles, 1);
    }

    #[test]
    fn test_bus_north_needs_literal_junction_and_direction() {
        let mut north_buss = at_a("Buss");
        north_buss.direction_out = " n".to_string();
        let mut north_bus = at_a("Bus");
        north_bus.direction_out = "N".to_string();
        let mut south_buss = at_a("Buss");
        south_buss.direction_out = "S".to_string();
        let mut other_junction = at_b("09:00");
        other_junction.vehicle_type = "Buss".to_string();
        other_junction.direction_out = "N".to_string();

        let rows = vec![north_buss, north_bus, south_buss, other_junction];
        let stats = aggregate(&rows).unwrap().statistics;
        assert_eq!(stats.buses_north_junction_a, 1);
    }

    #[test]
    fn test_bus_token_is_configurable() {
        let mut north_bus = at_a("Bus");
        north_bus.direction_out = "N".to_string();
        let config = SurveyConfig {
            bus_token: "Bus".to_string(),
            ..SurveyConfig::default()
        };
        let stats = Aggregator::new(config)
            .aggregate(&[north_bus])
            .unwrap()
            .statistics;
        assert_eq!(stats.buses_north_junction_a, 1);
    }

    #[test]
    fn test_not_turning_is_case_insensitive() {
        let mut straight = at_a("Car");
        straight.direction_in = "W ".to_string();
        straight.direction_out = "w".to_string();
        let turning = at_a("Car");
        let stats = aggregate(&[straight, turning]).unwrap().statistics;
        assert_eq!(stats.vehicles_not_turning, 1);
    }

    #[test]
    fn test_over_speed_uses_row_limit() {
        let mut fast = at_a("Car");
        fast.vehicle_speed = 31;
        let mut at_limit = at_a("Car");
        at_limit.vehicle_speed = 30;
        let mut fast_on_highway = at_b("10:00");
        fast_on_highway.vehicle_speed = 45;
        fast_on_highway.junction_speed_limit = 50;

        let stats = aggregate(&[fast, at_limit, fast_on_highway]).unwrap().statistics;
        assert_eq!(stats.over_speed_limit, 1);
    }

    #[test]
    fn test_junction_tallies_and_scooter_percentage() {
        let mut rows = vec![
            at_a("Scooter"),
            at_a("Car"),
            at_a("Car"),
            at_a("Car"),
            at_b("08:00"),
        ];
        let mut padded = at_a("Car");
        padded.junction_name = " elm avenue/rabbit road ".to_string();
        rows.push(padded);
        let mut scooter_b = at_b("08:00");
        scooter_b.vehicle_type = "Scooter".to_string();
        rows.push(scooter_b);

        let stats = aggregate(&rows).unwrap().statistics;
        assert_eq!(stats.junction_a_vehicles, 5);
        assert_eq!(stats.junction_b_vehicles, 2);
        assert_eq!(stats.scooter_percentage_junction_a, 20);
    }

    #[test]
    fn test_scooter_percentage_zero_without_junction_a() {
        let stats = aggregate(&[at_b("08:00")]).unwrap().statistics;
        assert_eq!(stats.junction_a_vehicles, 0);
        assert_eq!(stats.scooter_percentage_junction_a, 0);
    }

    #[test]
    fn test_busiest_hour_ties() {
        let mut rows = Vec::new();
        rows.extend((0..5).map(|_| at_b("08:10")));
        rows.extend((0..5).map(|_| at_b("14:45:00")));
        rows.extend((0..3).map(|_| at_b("09:00")));
        // Traffic at the other junction does not affect the busiest hour.
        rows.extend((0..9).map(|_| obs("Car", DEFAULT_JUNCTION_A, "12:00")));

        let stats = aggregate(&rows).unwrap().statistics;
        assert_eq!(stats.busiest_hour_count, 5);
        let mut labels: Vec<String> = stats.busiest_hours.iter().map(ToString::to_string).collect();
        labels.sort();
        assert_eq!(labels, vec!["08:00 and 09:00", "14:00 and 15:00"]);
    }

    #[test]
    fn test_busiest_hour_without_junction_b() {
        let stats = aggregate(&[at_a("Car")]).unwrap().statistics;
        assert_eq!(stats.busiest_hour_count, 0);
        assert!(stats.busiest_hours.is_empty());
    }

    #[test]
    fn test_rain_hours_are_distinct() {
        let mut first = at_a("Car");
        first.time_of_day = "10:05".to_string();
        first.weather_conditions = "Heavy Rain".to_string();
        let mut second = at_b("10:40");
        second.weather_conditions = "light rain".to_string();
        let mut third = at_b("11:00");
        third.weather_conditions = "Drizzle/RAIN".to_string();
        let dry = at_b("12:00");

        let stats = aggregate(&[first, second, third, dry]).unwrap().statistics;
        assert_eq!(stats.rain_hours, 2);
    }

    #[test]
    fn test_hourly_histograms_per_junction() {
        let rows = vec![
            obs("Car", DEFAULT_JUNCTION_A, "07:59"),
            obs("Car", DEFAULT_JUNCTION_A, "07:01"),
            at_b("07:30"),
            at_b("23:59"),
            obs("Car", "Some Other Road", "07:00"),
        ];
        let result = aggregate(&rows).unwrap();
        assert_eq!(result.junction_a_hourly.get(7), 2);
        assert_eq!(result.junction_a_hourly.total(), 2);
        assert_eq!(result.junction_b_hourly.get(7), 1);
        assert_eq!(result.junction_b_hourly.get(23), 1);
        assert_eq!(result.statistics.total_vehicles, 5);
    }

    #[test]
    fn test_electric_and_bicycle_average() {
        let mut rows: Vec<_> = (0..36).map(|_| at_a("Bicycle")).collect();
        rows[0].electric_hybrid = true;
        rows[1].electric_hybrid = true;
        let stats = aggregate(&rows).unwrap().statistics;
        assert_eq!(stats.electric_vehicles, 2);
        assert_eq!(stats.total_bicycles, 36);
        assert_eq!(stats.average_bicycles_per_hour, 2);
    }

    #[test]
    fn test_invalid_hour_is_malformed() {
        let rows = vec![at_a("Car"), obs("Car", DEFAULT_JUNCTION_A, "late")];
        let err = aggregate(&rows).unwrap_err();
        assert!(matches!(err, SurveyError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_invalid_hour_at_other_junction_is_malformed() {
        let rows = vec![
            at_a("Car"),
            at_b("09:00"),
            obs("Car", "Some Other Road", ""),
            obs("Car", "Some Other Road", "07:00"),
        ];
        let err = aggregate(&rows).unwrap_err();
        assert!(matches!(err, SurveyError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn test_rain_hours_share_padded_and_unpadded_keys() {
        let mut unpadded = at_b("8:00");
        unpadded.weather_conditions = "Rain".to_string();
        let mut padded = at_b("08:30");
        padded.weather_conditions = "Heavy Rain".to_string();

        let stats = aggregate(&[unpadded, padded]).unwrap().statistics;
        assert_eq!(stats.rain_hours, 1);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let rows = vec![at_a("Truck"), at_b("08:00"), at_a("Scooter")];
        let aggregator = Aggregator::default();
        let first = aggregator.aggregate(&rows).unwrap();
        let second = aggregator.aggregate(&rows).unwrap();
        assert_eq!(first, second);
    }
}
