//! Configuration management for the weather widget
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WidgetError;
use crate::models::Coordinates;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the weather widget
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Geocoding service configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Weather service configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Current-position configuration
    #[serde(default)]
    pub geolocation: GeolocationConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Geocoding endpoint
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Server-held API key; never sent to the browser
    pub api_key: Option<String>,
}

/// Weather service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Forecast endpoint
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Timeout in seconds for each outbound request
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// Current-position settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// How long to wait for a position before giving up
    #[serde(default = "default_geolocation_timeout")]
    pub timeout_seconds: u32,
    /// Position reported by the CLI when none is given on the command line
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://api.opencagedata.com/geocode/v1/json".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_geolocation_timeout() -> u32 {
    10
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            api_key: None,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_geolocation_timeout(),
            latitude: None,
            longitude: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl GeolocationConfig {
    /// The configured position, if both halves are present and in range
    pub fn position(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).ok(),
            _ => None,
        }
    }
}

impl WidgetConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHER_WIDGET_GEOCODING__API_KEY -> geocoding.api_key
        builder = builder.add_source(
            Environment::with_prefix("WEATHER_WIDGET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WidgetConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weather-widget").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.geolocation.timeout_seconds == 0 {
            self.geolocation.timeout_seconds = default_geolocation_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_position()?;
        Ok(())
    }

    /// Validate the geocoding credential
    pub fn validate_api_keys(&self) -> Result<()> {
        // The key may be absent; lookups by name then fail with a config error.
        if let Some(api_key) = &self.geocoding.api_key {
            if api_key.is_empty() {
                return Err(WidgetError::config(
                    "Geocoding API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(WidgetError::config(
                    "Geocoding API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.len() > 100 {
                return Err(WidgetError::config(
                    "Geocoding API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(WidgetError::config("Weather API timeout cannot exceed 300 seconds").into());
        }

        if self.geolocation.timeout_seconds > 120 {
            return Err(WidgetError::config("Geolocation timeout cannot exceed 120 seconds").into());
        }

        if self.server.port == 0 {
            return Err(WidgetError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WidgetError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WidgetError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Weather", &self.weather.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WidgetError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_position(&self) -> Result<()> {
        match (self.geolocation.latitude, self.geolocation.longitude) {
            (Some(lat), Some(lon)) => {
                Coordinates::new(lat, lon)
                    .with_context(|| "Invalid configured geolocation position")?;
            }
            (None, None) => {}
            _ => {
                return Err(WidgetError::config(
                    "Geolocation latitude and longitude must be set together",
                )
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = WidgetConfig::default();
        assert_eq!(config.geocoding.base_url, "https://api.opencagedata.com/geocode/v1/json");
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.geolocation.timeout_seconds, 10);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.geocoding.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = WidgetConfig::default();
        config.geocoding.api_key = Some("short".to_string());
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_valid_api_key() {
        let mut config = WidgetConfig::default();
        config.geocoding.api_key = Some("valid_api_key_123".to_string());
        assert!(config.validate_api_keys().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WidgetConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WidgetConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_base_url_scheme() {
        let mut config = WidgetConfig::default();
        config.weather.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Weather API base URL"));
    }

    #[test]
    fn test_half_configured_position_is_rejected() {
        let mut config = WidgetConfig::default();
        config.geolocation.latitude = Some(48.85);
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("set together"));
    }

    #[test]
    fn test_configured_position() {
        let mut config = WidgetConfig::default();
        assert!(config.geolocation.position().is_none());

        config.geolocation.latitude = Some(48.8566);
        config.geolocation.longitude = Some(2.3522);
        let position = config.geolocation.position().unwrap();
        assert_eq!(position.latitude, 48.8566);
        assert_eq!(position.longitude, 2.3522);
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = WidgetConfig::default();
        config.weather.base_url.clear();
        config.logging.format.clear();
        config.geolocation.timeout_seconds = 0;
        config.apply_defaults();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.geolocation.timeout_seconds, 10);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("weather-widget-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[geocoding]\napi_key = \"file_api_key_123\"\n\n[server]\nport = 9191\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = WidgetConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.geocoding.api_key.as_deref(), Some("file_api_key_123"));
        assert_eq!(config.server.port, 9191);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.weather.timeout_seconds, 30);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = WidgetConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("weather-widget"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
