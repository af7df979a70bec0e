//! Open-Meteo forecast client
//!
//! Performs a single GET per request with a bounded timeout. Nothing is
//! retried: every failure is mapped to an error kind and reported.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{ForecastSource, forecast_url};
use crate::config::UpstreamConfig;
use crate::geo::GeoCoordinate;
use crate::models::ForecastPayload;
use crate::{PvcastError, Result};

/// Open-Meteo public API
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1";
/// Upper bound on a single upstream call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the Open-Meteo daily forecast endpoint
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl OpenMeteoClient {
    /// Create a new client against `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("PvCast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PvcastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    /// Create a client from the `[upstream]` configuration section
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_transport_error(&self, err: &reqwest::Error) -> PvcastError {
        if err.is_timeout() {
            warn!(timeout = ?self.timeout, "Weather API timed out");
            PvcastError::upstream_timeout(format!(
                "no response within {:.1}s",
                self.timeout.as_secs_f64()
            ))
        } else {
            warn!(error = %err, "Weather API request failed");
            PvcastError::upstream_unreachable(err.to_string())
        }
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn fetch_daily(&self, coordinate: GeoCoordinate) -> Result<ForecastPayload> {
        let url = forecast_url(&self.base_url, &coordinate);
        debug!("Open-Meteo request URL: {}", url);
        let start = Instant::now();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        let status = response.status();
        let response = response.error_for_status().map_err(|e| {
            warn!(%status, "Weather API returned an error status");
            PvcastError::upstream_unreachable(e.to_string())
        })?;

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, bytes = body.len(), "Weather API body is not JSON");
            PvcastError::upstream_malformed(e.to_string())
        })?;

        let payload = ForecastPayload::from_value(value)?;
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched daily forecast for {}",
            coordinate.format_coordinates()
        );
        Ok(payload)
    }
}
