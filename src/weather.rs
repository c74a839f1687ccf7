//! Forecast retrieval from the Open-Meteo API

use crate::config::WidgetConfig;
use crate::models::{Coordinates, DAILY_METRICS, DailyForecast};
use crate::{Result, WidgetError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

const USER_AGENT: &str = concat!("weather-widget/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by the outbound service clients
pub fn http_client(timeout_seconds: u32) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(u64::from(timeout_seconds)))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WidgetError::config(format!("Failed to create HTTP client: {e}")))
}

/// Join query parameters onto a base URL that may already carry a query
pub(crate) fn with_query(base_url: &str, query: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}{query}")
}

/// Source of daily forecasts for a coordinate pair
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn daily_forecast(&self, coordinates: Coordinates) -> Result<DailyForecast>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyForecast,
}

/// Open-Meteo daily forecast client
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(client: Client, config: &WidgetConfig) -> Self {
        Self::new(client, config.weather.base_url.clone())
    }

    /// Full request URL for a coordinate pair
    #[must_use]
    pub fn forecast_url(&self, coordinates: Coordinates) -> String {
        with_query(
            &self.base_url,
            &format!(
                "latitude={}&longitude={}&daily={}&timezone=auto&wind_speed_unit=ms",
                coordinates.latitude,
                coordinates.longitude,
                DAILY_METRICS.join(",")
            ),
        )
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn daily_forecast(&self, coordinates: Coordinates) -> Result<DailyForecast> {
        let url = self.forecast_url(coordinates);
        debug!("Fetching data from URL: {}", url);
        let start_time = Instant::now();

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Weather request failed: {}", e);
            WidgetError::weather(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Weather service returned status {}", status);
            return Err(WidgetError::weather(format!(
                "Weather data could not be retrieved (HTTP {status})"
            )));
        }

        let body: ForecastResponse = response.json().await.map_err(|e| {
            error!("Failed to parse forecast response: {}", e);
            WidgetError::weather(format!("invalid forecast body: {e}"))
        })?;

        info!(
            "Retrieved {} forecast days in {:.3}s",
            body.daily.days(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(body.daily)
    }
}
