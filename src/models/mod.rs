//! Data models for the weather widget
//!
//! - Location: coordinates and display labels
//! - Forecast: the daily forecast arrays returned by the weather service

pub mod forecast;
pub mod location;

pub use forecast::{DAILY_METRICS, DailyForecast, DayReading};
pub use location::{CURRENT_LOCATION_LABEL, Coordinates};
