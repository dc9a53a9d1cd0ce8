use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::model::{WindData, WindDataParams};

use super::{WindFetcher, validate_coordinates};

pub const DEFAULT_WIND_ENDPOINT: &str = "/wind";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches wind data from `GET {base_url}{endpoint}?latitude=..&longitude=..`.
#[derive(Debug, Clone)]
pub struct HttpWindFetcher {
    base_url: String,
    endpoint: String,
    http: Client,
}

impl HttpWindFetcher {
    pub fn new(
        base_url: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Request setup failed: {e}"))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoint: endpoint.into(),
            http,
        })
    }

    fn url(&self) -> String {
        if self.endpoint.starts_with('/') {
            format!("{}{}", self.base_url, self.endpoint)
        } else {
            format!("{}/{}", self.base_url, self.endpoint)
        }
    }
}

#[async_trait]
impl WindFetcher for HttpWindFetcher {
    async fn fetch_wind_data(&self, params: WindDataParams) -> Result<WindData> {
        validate_coordinates(params)?;

        let url = self.url();
        tracing::debug!(
            %url,
            latitude = params.latitude,
            longitude = params.longitude,
            "Requesting wind data"
        );

        let res = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    anyhow!("Request setup failed: {e}")
                } else {
                    anyhow!("No response received from the API")
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!(
                "API request failed: {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ));
        }

        res.json::<WindData>().await.map_err(|e| anyhow!("Unexpected error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(server: &MockServer) -> HttpWindFetcher {
        HttpWindFetcher::new(server.uri(), DEFAULT_WIND_ENDPOINT, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetches_wind_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wind"))
            .and(query_param("latitude", "51.5074"))
            .and(query_param("longitude", "-0.1278"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "windSpeed": 6.2,
                "windDirection": 225.0,
                "timestamp": 1_700_000_000_000_i64
            })))
            .mount(&server)
            .await;

        let data = fetcher(&server)
            .fetch_wind_data(WindDataParams { latitude: 51.5074, longitude: -0.1278 })
            .await
            .unwrap();

        assert_eq!(data.wind_speed, 6.2);
        assert_eq!(data.wind_direction, 225.0);
        assert_eq!(data.timestamp, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn non_success_status_is_described() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wind"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetcher(&server)
            .fetch_wind_data(WindDataParams { latitude: 10.0, longitude: 10.0 })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API request failed: 503 - Service Unavailable");
    }

    #[tokio::test]
    async fn malformed_body_is_an_unexpected_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wind"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"windSpeed\": \"fast\"}"))
            .mount(&server)
            .await;

        let err = fetcher(&server)
            .fetch_wind_data(WindDataParams { latitude: 1.0, longitude: 1.0 })
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Unexpected error: "));
    }

    #[tokio::test]
    async fn invalid_coordinates_never_hit_the_network() {
        let server = MockServer::start().await;

        let err = fetcher(&server)
            .fetch_wind_data(WindDataParams { latitude: 120.0, longitude: 0.0 })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Latitude must be between -90 and 90");
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn unreachable_host() {
        let fetcher =
            HttpWindFetcher::new("http://127.0.0.1:9", "wind", Duration::from_secs(2)).unwrap();

        let err = fetcher
            .fetch_wind_data(WindDataParams { latitude: 0.0, longitude: 0.0 })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No response received from the API");
    }
}
