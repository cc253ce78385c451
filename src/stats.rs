use serde::{Serialize, Serializer};
use std::fmt;

use crate::observation::HOURS_PER_DAY;

/// Statistics for one survey dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStatistics {
    pub total_vehicles: usize,

    // vehicle types
    pub total_trucks: usize,
    pub truck_percentage: u32,
    pub electric_vehicles: usize,
    pub two_wheeled_vehicles: usize,
    pub total_bicycles: usize,
    pub average_bicycles_per_hour: u32,

    // movement
    pub buses_north_junction_a: usize,
    pub vehicles_not_turning: usize,
    pub over_speed_limit: usize,

    // junctions
    pub junction_a_vehicles: usize,
    pub junction_b_vehicles: usize,
    pub scooter_percentage_junction_a: u32,
    pub busiest_hour_count: usize,
    pub busiest_hours: Vec<HourRange>,

    // weather
    pub rain_hours: usize,
}

impl AggregateStatistics {
    /// Percentage of `part` in `total`, rounded half-to-even; 0 when `total` is 0.
    pub fn pct(part: usize, total: usize) -> u32 {
        if total == 0 {
            0
        } else {
            (part as f64 / total as f64 * 100.0).round_ties_even() as u32
        }
    }

    /// Bicycles per hour over a full 24-hour day, not over the hours observed.
    pub fn per_hour(count: usize) -> u32 {
        (count as f64 / HOURS_PER_DAY as f64).round_ties_even() as u32
    }
}

/// One-hour window starting on the hour, shown as `08:00 and 09:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourRange {
    pub start: usize,
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00 and {:02}:00", self.start, self.start + 1)
    }
}

impl Serialize for HourRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Observation counts per hour of day, zero for hours with no traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HourlyHistogram([usize; HOURS_PER_DAY]);

impl HourlyHistogram {
    /// Counts one observation in `hour`. Hours outside 0-23 are ignored.
    pub fn record(&mut self, hour: usize) {
        if let Some(slot) = self.0.get_mut(hour) {
            *slot += 1;
        }
    }

    pub fn get(&self, hour: usize) -> usize {
        self.0.get(hour).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn max(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// `(hour, count)` pairs in hour order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().copied().enumerate()
    }

    /// The peak count and every hour that reaches it, in hour order.
    /// An empty histogram has no busiest hour.
    pub fn busiest(&self) -> (usize, Vec<HourRange>) {
        let peak = self.max();
        if peak == 0 {
            return (0, Vec::new());
        }
        let hours = self
            .iter()
            .filter(|(_, count)| *count == peak)
            .map(|(start, _)| HourRange { start })
            .collect();
        (peak, hours)
    }
}

impl From<[usize; HOURS_PER_DAY]> for HourlyHistogram {
    fn from(counts: [usize; HOURS_PER_DAY]) -> Self {
        Self(counts)
    }
}
