//! JSON API over the widget
//!
//! Both third-party services are called from here, so the geocoding key stays
//! on the server. Each request gets its own widget instance; only the HTTP
//! clients are shared.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;

use crate::{
    WidgetError,
    config::WidgetConfig,
    geocoding::{Geocoder, OpenCageClient},
    geolocation::{Geolocator, ReportedPosition},
    models::Coordinates,
    view::WeatherView,
    weather::{ForecastProvider, OpenMeteoClient, http_client},
    widget::{SearchOutcome, WeatherWidget},
};

/// Shared handles for building per-request widgets
#[derive(Clone)]
pub struct AppState {
    geocoder: Arc<dyn Geocoder>,
    forecasts: Arc<dyn ForecastProvider>,
    geolocation_timeout: Duration,
}

impl AppState {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecasts: Arc<dyn ForecastProvider>,
        geolocation_timeout: Duration,
    ) -> Self {
        Self {
            geocoder,
            forecasts,
            geolocation_timeout,
        }
    }

    pub fn from_config(config: &WidgetConfig) -> crate::Result<Self> {
        let client = http_client(config.weather.timeout_seconds)?;
        Ok(Self::new(
            Arc::new(OpenCageClient::from_config(client.clone(), config)),
            Arc::new(OpenMeteoClient::from_config(client, config)),
            Duration::from_secs(u64::from(config.geolocation.timeout_seconds)),
        ))
    }

    /// A fresh widget instance backed by the shared clients
    #[must_use]
    pub fn widget(&self) -> WeatherWidget {
        WeatherWidget::new(self.geocoder.clone(), self.forecasts.clone())
            .with_geolocation_timeout(self.geolocation_timeout)
    }
}

/// Query accepted by the page and the API
///
/// `geolocation` carries the browser's answer when it has no position to
/// give: `unsupported`, `denied`, `timeout` or any other failure reason.
/// Coordinates are kept as text; malformed values become a validation error
/// in the widget's error panel.
#[derive(Debug, Default, Deserialize)]
pub struct WidgetQuery {
    pub city: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub geolocation: Option<String>,
}

impl WidgetQuery {
    fn wants_current_location(&self) -> bool {
        self.geolocation.is_some() || self.latitude.is_some() || self.longitude.is_some()
    }
}

/// Run whichever lookup the query asks for
pub async fn run_query(widget: &WeatherWidget, query: &WidgetQuery) -> SearchOutcome {
    if query.wants_current_location() {
        return current_location(widget, query).await;
    }
    match query.city.as_deref() {
        Some(city) => widget.search_city(city).await,
        None => SearchOutcome::Ignored,
    }
}

fn parse_coordinate(name: &str, value: &str) -> crate::Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| WidgetError::validation(format!("{name} must be a number, got '{value}'")))
}

fn parse_position(latitude: &str, longitude: &str) -> crate::Result<Coordinates> {
    Coordinates::new(
        parse_coordinate("Latitude", latitude)?,
        parse_coordinate("Longitude", longitude)?,
    )
}

async fn current_location(widget: &WeatherWidget, query: &WidgetQuery) -> SearchOutcome {
    let reported = match (
        query.geolocation.as_deref(),
        query.latitude.as_deref(),
        query.longitude.as_deref(),
    ) {
        (Some("unsupported"), _, _) => None,
        (Some("denied"), _, _) => Some(ReportedPosition::Denied),
        (Some("timeout"), _, _) => Some(ReportedPosition::TimedOut),
        (Some(reason), _, _) => Some(ReportedPosition::Unavailable(reason.to_string())),
        (None, Some(lat), Some(lon)) => match parse_position(lat, lon) {
            Ok(coordinates) => Some(ReportedPosition::Position(coordinates)),
            Err(e) => return widget.show_error(e.user_message()),
        },
        (None, None, None) => None,
        (None, _, _) => {
            return widget.show_error(
                WidgetError::validation("latitude and longitude must be given together")
                    .user_message(),
            );
        }
    };

    widget
        .search_current_location(reported.as_ref().map(|r| r as &dyn Geolocator))
        .await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/weather", get(search_weather))
        .route("/weather/current", get(current_weather))
}

async fn search_weather(
    State(state): State<AppState>,
    Query(query): Query<WidgetQuery>,
) -> Json<WeatherView> {
    let widget = state.widget();
    let outcome = match query.city.as_deref() {
        Some(city) => widget.search_city(city).await,
        None => SearchOutcome::Ignored,
    };
    tracing::debug!("City search finished: {:?}", outcome);
    Json(widget.view())
}

async fn current_weather(
    State(state): State<AppState>,
    Query(query): Query<WidgetQuery>,
) -> Json<WeatherView> {
    let widget = state.widget();
    let outcome = current_location(&widget, &query).await;
    tracing::debug!("Current-location search finished: {:?}", outcome);
    Json(widget.view())
}
