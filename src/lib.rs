//! `PvCast` - weather forecast gateway with photovoltaic estimates
//!
//! This library validates coordinates, fetches the daily forecast from the
//! provider, and enriches it with a per-day PV energy estimate or a weekly
//! weather summary before it is returned over HTTP.

pub mod api;
pub mod config;
pub mod enrich;
pub mod error;
pub mod geo;
pub mod models;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::{AppState, router};
pub use config::PvcastConfig;
pub use enrich::{ForecastSummary, PanelSpec, SummaryRules, WeatherSummary};
pub use enrich::{compute_pv_energy, compute_summary};
pub use error::PvcastError;
pub use geo::{GeoCoordinate, is_valid_geolocation};
pub use models::{DailyForecast, ForecastPayload};
pub use weather::{ForecastSource, OpenMeteoClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PvcastError>;
