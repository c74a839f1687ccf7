//! Weather widget
//!
//! Looks up a city (or the user's own position), fetches a daily forecast and
//! renders today's conditions plus a 5-day outlook. The HTTP server proxies
//! both third-party services so credentials stay server-side.

pub mod api;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod geolocation;
pub mod html;
pub mod logging;
pub mod models;
pub mod view;
pub mod weather;
pub mod web;
pub mod widget;

// Re-export core types for public API
pub use config::WidgetConfig;
pub use error::WidgetError;
pub use geocoding::{Geocoder, OpenCageClient};
pub use geolocation::{Geolocator, ReportedPosition};
pub use models::{Coordinates, DailyForecast};
pub use view::{ForecastCard, WeatherView};
pub use weather::{ForecastProvider, OpenMeteoClient};
pub use widget::{SearchOutcome, ViewListener, WeatherWidget};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
