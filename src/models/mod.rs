//! Data models for the PvCast gateway
//!
//! - Forecast: the provider payload and its typed daily view

pub mod forecast;

pub use forecast::{DAILY_KEY, DAILY_UNITS_KEY, DailyForecast, ForecastPayload};
