//! Weekly weather summary derived from the daily series

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{DailyForecast, ForecastPayload};
use crate::{PvcastError, Result};

/// Lowest WMO weather code describing any kind of precipitation (drizzle)
pub const RAIN_CODE_THRESHOLD: u8 = 51;
/// Precipitation days needed in a week to call it rainy
pub const RAINY_DAYS_PER_WEEK: usize = 4;
pub const WEEK_DAYS: usize = 7;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Classification thresholds for the summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryRules {
    pub rain_code_threshold: u8,
    pub rainy_days_per_week: usize,
}

impl Default for SummaryRules {
    fn default() -> Self {
        Self {
            rain_code_threshold: RAIN_CODE_THRESHOLD,
            rainy_days_per_week: RAINY_DAYS_PER_WEEK,
        }
    }
}

impl SummaryRules {
    /// Whether the given weather code counts as a precipitation day
    #[must_use]
    pub fn is_precipitation(&self, weather_code: f64) -> bool {
        weather_code >= f64::from(self.rain_code_threshold)
    }

    /// Classify a window of weather codes.
    ///
    /// The weekly quota is scaled to the window length, so a 7-day window
    /// is rainy with 4 or more precipitation days.
    #[must_use]
    pub fn classify(&self, weather_codes: &[f64]) -> WeatherSummary {
        let rainy_days = weather_codes
            .iter()
            .filter(|&&code| self.is_precipitation(code))
            .count();
        if rainy_days * WEEK_DAYS >= self.rainy_days_per_week * weather_codes.len() {
            WeatherSummary::Rainy
        } else {
            WeatherSummary::NotRainy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherSummary {
    #[serde(rename = "rainy")]
    Rainy,
    #[serde(rename = "not rainy")]
    NotRainy,
}

/// Scalar summary attached to the top level of the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub weather_summary: WeatherSummary,
    /// Lowest daily minimum temperature
    pub temperature_min: f64,
    /// Highest daily maximum temperature
    pub temperature_max: f64,
    /// Mean surface pressure in hPa, 2 decimals
    pub avg_surface_pressure: f64,
    /// Mean sunshine duration in hours, 2 decimals
    pub avg_sunshine_duration: f64,
}

/// Summarize a daily forecast. An empty window has no summary.
pub fn compute_summary(daily: &DailyForecast, rules: &SummaryRules) -> Result<ForecastSummary> {
    if daily.days() == 0 {
        return Err(PvcastError::upstream_incomplete(
            "daily forecast contains no days",
        ));
    }

    let temperature_min = daily
        .temperature_2m_min
        .iter()
        .copied()
        .reduce(f64::min)
        .ok_or_else(|| PvcastError::upstream_incomplete("no minimum temperatures"))?;
    let temperature_max = daily
        .temperature_2m_max
        .iter()
        .copied()
        .reduce(f64::max)
        .ok_or_else(|| PvcastError::upstream_incomplete("no maximum temperatures"))?;

    Ok(ForecastSummary {
        weather_summary: rules.classify(&daily.weather_code),
        temperature_min,
        temperature_max,
        avg_surface_pressure: round2(mean(&daily.surface_pressure_mean)),
        avg_sunshine_duration: round2(mean(&daily.sunshine_duration) / SECONDS_PER_HOUR),
    })
}

/// Add the summary fields to the top level of the payload
#[tracing::instrument(level = "debug", skip(payload))]
pub fn attach_summary(payload: &mut ForecastPayload, rules: &SummaryRules) -> Result<ForecastSummary> {
    let daily = payload.daily_forecast()?;
    let summary = compute_summary(&daily, rules)?;
    tracing::debug!(days = daily.days(), summary = ?summary.weather_summary, "computed summary");

    let Value::Object(fields) = serde_json::to_value(&summary).map_err(|e| {
        PvcastError::upstream_incomplete(format!("summary not representable as JSON: {e}"))
    })?
    else {
        return Err(PvcastError::upstream_incomplete(
            "summary not representable as a JSON object",
        ));
    };
    for (key, value) in fields {
        payload.insert(&key, value);
    }
    Ok(summary)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Round to 2 decimals, ties to even on the exact decimal value of `value`.
///
/// `value * 100.0` may itself round onto a tie, so on a tie the sign of the
/// fused residual decides the direction.
fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 {
        let residual = value.mul_add(100.0, -scaled);
        if residual > 0.0 {
            scaled.ceil()
        } else if residual < 0.0 {
            scaled.floor()
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };
    rounded / 100.0
}
