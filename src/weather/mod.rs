//! Forecast provider abstraction
//!
//! Handlers depend on [`ForecastSource`] rather than on a concrete HTTP
//! client, so the provider can be swapped for a fake in tests.

use async_trait::async_trait;

use crate::Result;
use crate::geo::GeoCoordinate;
use crate::models::ForecastPayload;

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Daily series requested from the provider
pub const DAILY_FIELDS: [&str; 5] = [
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "sunshine_duration",
    "surface_pressure_mean",
];

/// Source of daily forecasts for a coordinate
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Fetch the daily forecast, returned as the provider sent it
    async fn fetch_daily(&self, coordinate: GeoCoordinate) -> Result<ForecastPayload>;
}

/// Daily forecast request URL for `coordinate` against `base_url`
#[must_use]
pub fn forecast_url(base_url: &str, coordinate: &GeoCoordinate) -> String {
    format!(
        "{}/forecast?latitude={}&longitude={}&daily={}&timezone=auto",
        base_url.trim_end_matches('/'),
        coordinate.latitude,
        coordinate.longitude,
        DAILY_FIELDS.join(",")
    )
}
