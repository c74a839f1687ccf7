//! Rendered widget state
//!
//! `WeatherView` is what the page shows: the location heading, the current
//! conditions block, the forecast cards and the visibility of the weather and
//! error panels. It is rendered to HTML by [`crate::html`] and to terminal
//! text through its `Display` impl.

use crate::models::DailyForecast;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Number of forecast cards, starting with today
pub const FORECAST_DAYS: usize = 5;

/// Shown in place of a value the weather service did not provide
pub const MISSING_VALUE: &str = "--";

fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING_VALUE.to_string(), |v| v.to_string())
}

/// One day in the forecast list
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForecastCard {
    /// 1-based day label
    pub day: usize,
    pub date: Option<NaiveDate>,
    pub max_temperature: String,
    pub min_temperature: String,
    pub wind_speed: String,
}

impl ForecastCard {
    #[must_use]
    pub fn title(&self) -> String {
        format!("Day {}", self.day)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WeatherView {
    pub location: String,
    pub temperature: String,
    pub wind: String,
    pub precipitation: String,
    pub forecast: Vec<ForecastCard>,
    pub weather_visible: bool,
    /// The error panel is visible exactly when this is set
    pub error_message: Option<String>,
}

impl WeatherView {
    /// Show `forecast` for `label`, replacing any earlier cards
    pub fn render(&mut self, label: &str, forecast: &DailyForecast) {
        let today = forecast.day(0);

        self.location = label.to_string();
        self.temperature = format!(
            "Max Temp: {}°C, Min Temp: {}°C",
            reading(today.temperature_max),
            reading(today.temperature_min)
        );
        self.wind = format!("Wind Speed: {} m/s", reading(today.wind_speed));
        self.precipitation = format!("Precipitation: {} mm", reading(today.precipitation_sum));

        self.weather_visible = true;
        self.error_message = None;

        self.forecast.clear();
        self.forecast.extend((0..FORECAST_DAYS).map(|index| {
            let day = forecast.day(index);
            ForecastCard {
                day: index + 1,
                date: day.date,
                max_temperature: format!("Max Temp: {}°C", reading(day.temperature_max)),
                min_temperature: format!("Min Temp: {}°C", reading(day.temperature_min)),
                wind_speed: format!("Wind Speed: {} m/s", reading(day.wind_speed)),
            }
        }));
    }

    /// Show `message` in the error panel and hide the weather panel
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.weather_visible = false;
    }

    #[must_use]
    pub fn error_visible(&self) -> bool {
        self.error_message.is_some()
    }
}

impl fmt::Display for WeatherView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.error_message {
            writeln!(f, "{message}")?;
        }
        if !self.weather_visible {
            return Ok(());
        }

        writeln!(f, "{}", self.location)?;
        writeln!(f, "  {}", self.temperature)?;
        writeln!(f, "  {}", self.wind)?;
        writeln!(f, "  {}", self.precipitation)?;
        writeln!(f)?;
        for card in &self.forecast {
            match card.date {
                Some(date) => write!(f, "{} ({date})", card.title())?,
                None => write!(f, "{}", card.title())?,
            }
            writeln!(
                f,
                ": {} | {} | {}",
                card.max_temperature, card.min_temperature, card.wind_speed
            )?;
        }
        Ok(())
    }
}
