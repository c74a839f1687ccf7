//! Widget coordination
//!
//! A `WeatherWidget` is one instance of the weather panel. It owns its view
//! state and runs the two lookup chains: city name → coordinates → forecast,
//! and current position → forecast. Every chain takes a new generation number
//! when it starts and may only touch the view while that number is still the
//! latest, so a slow, older lookup can never overwrite a newer one.

use crate::WidgetError;
use crate::geocoding::Geocoder;
use crate::geolocation::Geolocator;
use crate::models::{CURRENT_LOCATION_LABEL, Coordinates};
use crate::view::WeatherView;
use crate::weather::ForecastProvider;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Shown when the geocoding service knows no place by the searched name
pub const CITY_NOT_FOUND: &str = "City not found.";

const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// How a lookup chain ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The forecast was rendered
    Rendered,
    /// The error panel shows this message
    Failed(String),
    /// Blank input; nothing happened
    Ignored,
    /// A newer lookup started before this one finished; the view was left alone
    Superseded,
}

/// Called with the new state after every accepted view change
pub type ViewListener = Box<dyn Fn(&WeatherView) + Send + Sync>;

pub struct WeatherWidget {
    geocoder: Arc<dyn Geocoder>,
    forecasts: Arc<dyn ForecastProvider>,
    geolocation_timeout: Duration,
    view: Mutex<WeatherView>,
    generation: AtomicU64,
    listener: Option<ViewListener>,
}

impl WeatherWidget {
    pub fn new(geocoder: Arc<dyn Geocoder>, forecasts: Arc<dyn ForecastProvider>) -> Self {
        Self {
            geocoder,
            forecasts,
            geolocation_timeout: DEFAULT_GEOLOCATION_TIMEOUT,
            view: Mutex::new(WeatherView::default()),
            generation: AtomicU64::new(0),
            listener: None,
        }
    }

    #[must_use]
    pub fn with_geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout = timeout;
        self
    }

    /// Observe each accepted change while the view is still locked, so the
    /// listener sees exactly the state the change produced
    #[must_use]
    pub fn with_view_listener(
        mut self,
        listener: impl Fn(&WeatherView) + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Snapshot of the current view state
    #[must_use]
    pub fn view(&self) -> WeatherView {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look up the weather for a typed city name
    #[instrument(skip(self))]
    pub async fn search_city(&self, input: &str) -> SearchOutcome {
        let city = input.trim();
        if city.is_empty() {
            debug!("Ignoring blank search");
            return SearchOutcome::Ignored;
        }

        let generation = self.begin();
        match self.geocoder.resolve(city).await {
            Ok(Some(coordinates)) => self.fetch_and_render(generation, coordinates, city).await,
            Ok(None) => self.fail(generation, CITY_NOT_FOUND.to_string()),
            Err(e) => {
                warn!("Geocoding error: {}", e);
                self.fail(generation, e.user_message())
            }
        }
    }

    /// Look up the weather at the user's position
    ///
    /// `None` means no geolocation capability exists; no request is made.
    #[instrument(skip_all)]
    pub async fn search_current_location(
        &self,
        geolocator: Option<&dyn Geolocator>,
    ) -> SearchOutcome {
        let generation = self.begin();
        let Some(geolocator) = geolocator else {
            return self.fail(generation, WidgetError::GeolocationUnsupported.user_message());
        };

        let position =
            match tokio::time::timeout(self.geolocation_timeout, geolocator.current_position())
                .await
            {
                Ok(Ok(position)) => position,
                Ok(Err(e)) => {
                    warn!("Geolocation error: {}", e);
                    return self.fail(generation, e.user_message());
                }
                Err(_) => {
                    warn!(
                        "No position after {:.1}s",
                        self.geolocation_timeout.as_secs_f64()
                    );
                    return self.fail(generation, WidgetError::GeolocationTimeout.user_message());
                }
            };

        self.fetch_and_render(generation, position, CURRENT_LOCATION_LABEL)
            .await
    }

    /// Fetch and render the forecast for known coordinates
    pub async fn show_forecast(&self, coordinates: Coordinates, label: &str) -> SearchOutcome {
        let generation = self.begin();
        self.fetch_and_render(generation, coordinates, label).await
    }

    /// Put `message` in the error panel, as a chain of its own
    pub fn show_error(&self, message: impl Into<String>) -> SearchOutcome {
        let generation = self.begin();
        self.fail(generation, message.into())
    }

    async fn fetch_and_render(
        &self,
        generation: u64,
        coordinates: Coordinates,
        label: &str,
    ) -> SearchOutcome {
        match self.forecasts.daily_forecast(coordinates).await {
            Ok(forecast) => {
                if self.update(generation, |view| view.render(label, &forecast)) {
                    info!("Rendered forecast for {}", label);
                    SearchOutcome::Rendered
                } else {
                    SearchOutcome::Superseded
                }
            }
            Err(e) => {
                error!("Error fetching weather data: {}", e);
                self.fail(generation, e.user_message())
            }
        }
    }

    fn fail(&self, generation: u64, message: String) -> SearchOutcome {
        if self.update(generation, |view| view.show_error(message.clone())) {
            SearchOutcome::Failed(message)
        } else {
            SearchOutcome::Superseded
        }
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply `change` if `generation` is still the latest; the check and the
    /// write happen under the same lock.
    fn update(&self, generation: u64, change: impl FnOnce(&mut WeatherView)) -> bool {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding result of superseded lookup {}", generation);
            return false;
        }
        change(&mut view);
        if let Some(listener) = &self.listener {
            listener(&view);
        }
        true
    }
}
