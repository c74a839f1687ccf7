//! Error types and handling for the weather widget

use thiserror::Error;

/// Main error type for the weather widget
#[derive(Error, Debug)]
pub enum WidgetError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Geocoding service failures (transport, status or body)
    #[error("Geocoding error: {message}")]
    Geocoding { message: String },

    /// Weather service failures (transport, status or body)
    #[error("Weather error: {message}")]
    Weather { message: String },

    /// No geolocation capability is available
    #[error("Geolocation is not supported")]
    GeolocationUnsupported,

    /// The user refused to share their position
    #[error("Geolocation permission denied")]
    GeolocationDenied,

    /// The geolocation capability failed to produce a position
    #[error("Geolocation unavailable: {message}")]
    GeolocationUnavailable { message: String },

    /// The geolocation capability did not answer in time
    #[error("Geolocation timed out")]
    GeolocationTimeout,

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WidgetError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new geocoding error
    pub fn geocoding<S: Into<String>>(message: S) -> Self {
        Self::Geocoding {
            message: message.into(),
        }
    }

    /// Create a new weather error
    pub fn weather<S: Into<String>>(message: S) -> Self {
        Self::Weather {
            message: message.into(),
        }
    }

    pub fn geolocation_unavailable<S: Into<String>>(message: S) -> Self {
        Self::GeolocationUnavailable {
            message: message.into(),
        }
    }

    /// Get the message shown in the widget's error panel
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WidgetError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            WidgetError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            WidgetError::Geocoding { .. } => {
                "Unable to look up that city right now. Please try again later.".to_string()
            }
            WidgetError::Weather { .. } => {
                "Unable to fetch weather data. Please try again later.".to_string()
            }
            WidgetError::GeolocationUnsupported => {
                "Geolocation is not supported by your browser.".to_string()
            }
            WidgetError::GeolocationDenied => {
                "Unable to retrieve your location: permission was denied.".to_string()
            }
            WidgetError::GeolocationUnavailable { .. } => {
                "Unable to retrieve your location.".to_string()
            }
            WidgetError::GeolocationTimeout => {
                "Timed out while retrieving your location.".to_string()
            }
            WidgetError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_error_creation() {
        let config_err = WidgetError::config("missing API key");
        assert!(matches!(config_err, WidgetError::Config { .. }));

        let weather_err = WidgetError::weather("status 500");
        assert!(matches!(weather_err, WidgetError::Weather { .. }));

        let validation_err = WidgetError::validation("invalid coordinates");
        assert!(matches!(validation_err, WidgetError::Validation { .. }));
    }

    #[rstest]
    #[case(WidgetError::weather("boom"), "Unable to fetch weather data. Please try again later.")]
    #[case(WidgetError::GeolocationUnsupported, "Geolocation is not supported by your browser.")]
    #[case(WidgetError::geocoding("timeout"), "Unable to look up that city right now. Please try again later.")]
    #[case(WidgetError::GeolocationTimeout, "Timed out while retrieving your location.")]
    fn test_user_messages(#[case] err: WidgetError, #[case] expected: &str) {
        assert_eq!(err.user_message(), expected);
    }

    #[test]
    fn test_validation_message_carries_detail() {
        let err = WidgetError::validation("Latitude must be between -90 and 90, got: 91");
        assert!(err.user_message().contains("got: 91"));
    }

    #[test]
    fn test_internal_detail_not_in_user_message() {
        let err = WidgetError::weather("HTTP 503 from https://api.example.test");
        assert!(err.to_string().contains("503"));
        assert!(!err.user_message().contains("503"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let widget_err: WidgetError = io_err.into();
        assert!(matches!(widget_err, WidgetError::Io { .. }));
    }
}
