//! Forecast payload passed through from the provider, and its typed daily view

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{PvcastError, Result};

/// Key of the per-day series section in the provider response
pub const DAILY_KEY: &str = "daily";
/// Key of the unit labels for the per-day series
pub const DAILY_UNITS_KEY: &str = "daily_units";

/// Provider response kept as an untouched JSON object.
///
/// Only the shape is checked on construction (an object with a `daily`
/// object); field values are interpreted lazily by the enrichers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ForecastPayload(Map<String, Value>);

impl ForecastPayload {
    /// Wrap a parsed provider body, checking it carries a daily section
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(body) = value else {
            return Err(PvcastError::upstream_incomplete(
                "response body is not a JSON object",
            ));
        };
        match body.get(DAILY_KEY) {
            Some(Value::Object(_)) => Ok(Self(body)),
            Some(_) => Err(PvcastError::upstream_incomplete(
                "'daily' section is not an object",
            )),
            None => Err(PvcastError::upstream_incomplete("missing 'daily' section")),
        }
    }

    /// Top-level field lookup
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a top-level field, replacing any previous value
    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    /// The per-day series section
    #[must_use]
    pub fn daily(&self) -> Option<&Map<String, Value>> {
        self.0.get(DAILY_KEY).and_then(Value::as_object)
    }

    /// Read one numeric per-day series. Nulls and non-numbers are rejected.
    pub fn series(&self, field: &str) -> Result<Vec<f64>> {
        let values = self
            .daily()
            .and_then(|daily| daily.get(field))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                PvcastError::upstream_incomplete(format!("missing daily series '{field}'"))
            })?;

        values
            .iter()
            .enumerate()
            .map(|(day, value)| {
                value.as_f64().ok_or_else(|| {
                    PvcastError::upstream_incomplete(format!(
                        "daily series '{field}' has no numeric value for day {day}"
                    ))
                })
            })
            .collect()
    }

    /// Typed view of the full daily section
    pub fn daily_forecast(&self) -> Result<DailyForecast> {
        let daily = self
            .daily()
            .ok_or_else(|| PvcastError::upstream_incomplete("missing 'daily' section"))?;
        let forecast: DailyForecast = serde_json::from_value(Value::Object(daily.clone()))
            .map_err(|e| {
                PvcastError::upstream_incomplete(format!("unusable daily section: {e}"))
            })?;
        forecast.check_alignment()?;
        Ok(forecast)
    }

    /// Add a per-day series next to the provider's own
    pub fn insert_daily(&mut self, field: &str, value: Value) {
        if let Value::Object(daily) = self
            .0
            .entry(DAILY_KEY)
            .or_insert_with(|| Value::Object(Map::new()))
        {
            daily.insert(field.to_string(), value);
        }
    }

    /// Add a unit label, creating `daily_units` if the provider omitted it
    pub fn insert_daily_unit(&mut self, field: &str, unit: &str) {
        let units = self
            .0
            .entry(DAILY_UNITS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if !units.is_object() {
            *units = Value::Object(Map::new());
        }
        if let Value::Object(units) = units {
            units.insert(field.to_string(), Value::String(unit.to_string()));
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Day-aligned daily series requested from the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Day stamps as sent (ISO dates or unix seconds, per `timeformat`)
    #[serde(default)]
    pub time: Vec<Value>,
    /// WMO weather interpretation code
    pub weather_code: Vec<f64>,
    /// Maximum air temperature at 2 m in °C
    pub temperature_2m_max: Vec<f64>,
    /// Minimum air temperature at 2 m in °C
    pub temperature_2m_min: Vec<f64>,
    /// Sunshine duration in seconds
    pub sunshine_duration: Vec<f64>,
    /// Mean surface pressure in hPa
    pub surface_pressure_mean: Vec<f64>,
}

impl DailyForecast {
    /// Number of forecast days
    #[must_use]
    pub fn days(&self) -> usize {
        self.weather_code.len()
    }

    fn check_alignment(&self) -> Result<()> {
        let days = self.days();
        let lengths = [
            ("temperature_2m_max", self.temperature_2m_max.len()),
            ("temperature_2m_min", self.temperature_2m_min.len()),
            ("sunshine_duration", self.sunshine_duration.len()),
            ("surface_pressure_mean", self.surface_pressure_mean.len()),
        ];
        for (field, len) in lengths {
            if len != days {
                return Err(PvcastError::upstream_incomplete(format!(
                    "daily series '{field}' has {len} values, expected {days}"
                )));
            }
        }
        if !self.time.is_empty() && self.time.len() != days {
            return Err(PvcastError::upstream_incomplete(format!(
                "daily series 'time' has {} values, expected {days}",
                self.time.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_body() -> Value {
        json!({
            "latitude": 52.22,
            "longitude": 21.0,
            "timezone": "Europe/Warsaw",
            "daily_units": { "sunshine_duration": "s" },
            "daily": {
                "time": ["2024-06-01", "2024-06-02"],
                "weather_code": [3, 61],
                "temperature_2m_max": [21.5, 18.0],
                "temperature_2m_min": [11.0, 9.5],
                "sunshine_duration": [36000.0, 7200.0],
                "surface_pressure_mean": [1001.0, 1003.0]
            }
        })
    }

    #[test]
    fn test_from_value_requires_daily() {
        let err = ForecastPayload::from_value(json!({ "latitude": 1.0 })).unwrap_err();
        assert!(matches!(err, PvcastError::UpstreamIncomplete { .. }));

        let err = ForecastPayload::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, PvcastError::UpstreamIncomplete { .. }));

        let err = ForecastPayload::from_value(json!({ "daily": 7 })).unwrap_err();
        assert!(matches!(err, PvcastError::UpstreamIncomplete { .. }));
    }

    #[test]
    fn test_daily_forecast_view() {
        let payload = ForecastPayload::from_value(sample_body()).unwrap();
        let daily = payload.daily_forecast().unwrap();
        assert_eq!(daily.days(), 2);
        assert_eq!(daily.weather_code, vec![3.0, 61.0]);
        assert_eq!(daily.time[0], json!("2024-06-01"));
    }

    #[test]
    fn test_daily_forecast_accepts_provider_number_formats() {
        let mut body = sample_body();
        body["daily"]["time"] = json!([1_717_200_000, 1_717_286_400]);
        body["daily"]["weather_code"] = json!([61.0, 300]);
        let payload = ForecastPayload::from_value(body).unwrap();

        let daily = payload.daily_forecast().unwrap();
        assert_eq!(daily.weather_code, vec![61.0, 300.0]);
        assert_eq!(daily.time, vec![json!(1_717_200_000), json!(1_717_286_400)]);
    }

    #[test]
    fn test_daily_forecast_checks_time_length() {
        let mut body = sample_body();
        body["daily"]["time"] = json!([1_717_200_000]);
        let payload = ForecastPayload::from_value(body).unwrap();
        let err = payload.daily_forecast().unwrap_err();
        assert!(err.to_string().contains("'time'"));
    }

    #[test]
    fn test_daily_forecast_rejects_nulls_and_misalignment() {
        let mut body = sample_body();
        body["daily"]["temperature_2m_min"] = json!([11.0, null]);
        let payload = ForecastPayload::from_value(body).unwrap();
        assert!(matches!(
            payload.daily_forecast(),
            Err(PvcastError::UpstreamIncomplete { .. })
        ));

        let mut body = sample_body();
        body["daily"]["surface_pressure_mean"] = json!([1001.0]);
        let payload = ForecastPayload::from_value(body).unwrap();
        let err = payload.daily_forecast().unwrap_err();
        assert!(err.to_string().contains("surface_pressure_mean"));
    }

    #[test]
    fn test_series_lookup() {
        let payload = ForecastPayload::from_value(sample_body()).unwrap();
        assert_eq!(
            payload.series("sunshine_duration").unwrap(),
            vec![36000.0, 7200.0]
        );
        assert!(payload.series("precipitation_sum").is_err());
    }

    #[test]
    fn test_insertions_keep_provider_fields() {
        let mut payload = ForecastPayload::from_value(sample_body()).unwrap();
        payload.insert_daily("energy", json!([1.0, 2.0]));
        payload.insert_daily_unit("energy", "kWh");
        payload.insert("note", json!("x"));

        let value = payload.into_value();
        assert_eq!(value["daily"]["energy"], json!([1.0, 2.0]));
        assert_eq!(value["daily"]["weather_code"], json!([3, 61]));
        assert_eq!(value["daily_units"]["energy"], "kWh");
        assert_eq!(value["daily_units"]["sunshine_duration"], "s");
        assert_eq!(value["timezone"], "Europe/Warsaw");
        assert_eq!(value["note"], "x");
    }

    #[test]
    fn test_unit_section_created_when_missing() {
        let mut body = sample_body();
        body.as_object_mut().unwrap().remove(DAILY_UNITS_KEY);
        let mut payload = ForecastPayload::from_value(body).unwrap();
        payload.insert_daily_unit("energy", "kWh");
        assert_eq!(payload.get(DAILY_UNITS_KEY).unwrap()["energy"], "kWh");
    }
}
