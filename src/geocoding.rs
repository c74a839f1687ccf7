//! Coordinate resolution
//!
//! Turns a free-text place name into coordinates using the OpenCage
//! geocoding API. Only the first result is used.

use crate::config::WidgetConfig;
use crate::models::Coordinates;
use crate::weather::with_query;
use crate::{Result, WidgetError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Resolves place names to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the service answered but knows no such place.
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>>;
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    lat: f64,
    lng: f64,
}

impl From<Geometry> for Coordinates {
    fn from(geometry: Geometry) -> Self {
        Self {
            latitude: geometry.lat,
            longitude: geometry.lng,
        }
    }
}

/// OpenCage forward geocoding client
#[derive(Debug, Clone)]
pub struct OpenCageClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenCageClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn from_config(client: Client, config: &WidgetConfig) -> Self {
        Self::new(
            client,
            config.geocoding.base_url.clone(),
            config.geocoding.api_key.clone(),
        )
    }
}

#[async_trait]
impl Geocoder for OpenCageClient {
    #[instrument(skip(self))]
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(WidgetError::config("geocoding API key is not configured"));
        };

        let url = with_query(
            &self.base_url,
            &format!(
                "q={}&key={}",
                urlencoding::encode(place),
                urlencoding::encode(api_key)
            ),
        );
        debug!("Geocoding '{}' via {}", place, self.base_url);

        // reqwest errors carry the request URL, which holds the key.
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                WidgetError::geocoding(format!("request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::geocoding(format!(
                "geocoding service returned HTTP {status}"
            )));
        }

        let body: GeocodingResponse = response.json().await.map_err(|e| {
            WidgetError::geocoding(format!("invalid geocoding body: {}", e.without_url()))
        })?;

        match body.results.into_iter().flatten().next() {
            Some(first) => {
                let coordinates = Coordinates::from(first.geometry);
                info!("Coordinates for '{}': {}", place, coordinates.format_coordinates());
                Ok(Some(coordinates))
            }
            None => {
                warn!("No results found for location '{}'", place);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::http_client;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenCageClient {
        OpenCageClient::new(
            http_client(5).unwrap(),
            format!("{}/geocode/v1/json", server.uri()),
            Some("test_api_key_123".to_string()),
        )
    }

    #[tokio::test]
    async fn test_first_result_wins() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/v1/json"))
            .and(query_param("q", "San José"))
            .and(query_param("key", "test_api_key_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    { "geometry": { "lat": 9.9325, "lng": -84.0796 } },
                    { "geometry": { "lat": 37.3362, "lng": -121.8906 } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let coords = client_for(&server).resolve("San José").await.unwrap().unwrap();
        assert_eq!(coords.latitude, 9.9325);
        assert_eq!(coords.longitude, -84.0796);
    }

    #[tokio::test]
    async fn test_zero_results_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
            )
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).resolve("Atlantis").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_results_field_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": { "code": 200 }
            })))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).resolve("Atlantis").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_null_results_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": null })),
            )
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).resolve("Atlantis").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_http_failure_is_a_geocoding_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve("Paris").await.unwrap_err();
        assert!(matches!(err, WidgetError::Geocoding { .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_geocoding_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve("Paris").await.unwrap_err();
        assert!(matches!(err, WidgetError::Geocoding { .. }));
        assert!(!err.to_string().contains("test_api_key_123"));
    }

    #[tokio::test]
    async fn test_unreachable_service_does_not_leak_key() {
        let client = OpenCageClient::new(
            http_client(1).unwrap(),
            "http://127.0.0.1:9/geocode/v1/json",
            Some("test_api_key_123".to_string()),
        );
        let err = client.resolve("Paris").await.unwrap_err();
        assert!(matches!(err, WidgetError::Geocoding { .. }));
        assert!(!err.to_string().contains("test_api_key_123"));
        assert!(!format!("{err:?}").contains("test_api_key_123"));
    }

    #[tokio::test]
    async fn test_missing_api_key_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = OpenCageClient::new(
            http_client(5).unwrap(),
            format!("{}/geocode/v1/json", server.uri()),
            None,
        );
        let err = client.resolve("Paris").await.unwrap_err();
        assert!(matches!(err, WidgetError::Config { .. }));
    }
}
