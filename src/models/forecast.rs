//! Daily forecast model as returned by the weather service

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily metrics requested from the weather service, in request order
pub const DAILY_METRICS: [&str; 4] = [
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "windspeed_10m",
];

/// Parallel per-day arrays; index 0 is today.
///
/// The arrays are expected to share length and day alignment but this is not
/// checked. Reading past the end of any array yields `None`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DailyForecast {
    /// Calendar date of each entry
    #[serde(default)]
    pub time: Vec<NaiveDate>,
    /// Maximum temperature in °C
    #[serde(rename = "temperature_2m_max", default)]
    pub temperature_max: Vec<Option<f64>>,
    /// Minimum temperature in °C
    #[serde(rename = "temperature_2m_min", default)]
    pub temperature_min: Vec<Option<f64>>,
    /// Precipitation sum in mm
    #[serde(rename = "precipitation_sum", default)]
    pub precipitation_sum: Vec<Option<f64>>,
    /// Wind speed in m/s
    #[serde(rename = "windspeed_10m", default)]
    pub wind_speed: Vec<Option<f64>>,
}

/// One day's readings pulled out of the parallel arrays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayReading {
    pub date: Option<NaiveDate>,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub wind_speed: Option<f64>,
}

fn at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

impl DailyForecast {
    /// Readings for the day at `index`
    #[must_use]
    pub fn day(&self, index: usize) -> DayReading {
        DayReading {
            date: self.time.get(index).copied(),
            temperature_max: at(&self.temperature_max, index),
            temperature_min: at(&self.temperature_min, index),
            precipitation_sum: at(&self.precipitation_sum, index),
            wind_speed: at(&self.wind_speed, index),
        }
    }

    /// Number of days covered by the longest metric array
    #[must_use]
    pub fn days(&self) -> usize {
        [
            self.temperature_max.len(),
            self.temperature_min.len(),
            self.precipitation_sum.len(),
            self.wind_speed.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}
