use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    PvcastError, Result,
    config::PvcastConfig,
    enrich::{PanelSpec, SummaryRules, attach_energy, attach_summary},
    geo::GeoCoordinate,
    weather::ForecastSource,
};

/// Shared, read-only dependencies of the handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ForecastSource>,
    pub panel: PanelSpec,
    pub rules: SummaryRules,
}

impl AppState {
    pub fn new(source: Arc<dyn ForecastSource>) -> Self {
        Self {
            source,
            panel: PanelSpec::default(),
            rules: SummaryRules::default(),
        }
    }

    pub fn from_config(source: Arc<dyn ForecastSource>, config: &PvcastConfig) -> Self {
        Self {
            source,
            panel: config.panel.spec(),
            rules: config.summary.rules(),
        }
    }
}

/// Raw query values; parsed by the validator so bad numbers map to 400.
#[derive(Debug, Deserialize)]
pub struct CoordinateQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl CoordinateQuery {
    fn coordinate(&self) -> Result<GeoCoordinate> {
        GeoCoordinate::parse(
            self.lat.as_deref().unwrap_or_default(),
            self.lon.as_deref().unwrap_or_default(),
        )
    }
}

/// Coordinates of a request for `subject`. A query string that does not
/// deserialize is invalid input like an out-of-range value.
fn requested_coordinate(
    query: std::result::Result<Query<CoordinateQuery>, QueryRejection>,
    subject: &str,
) -> Result<GeoCoordinate> {
    query
        .map_err(|rejection| PvcastError::invalid_input(rejection.body_text()))
        .and_then(|Query(query)| query.coordinate())
        .map_err(|e| e.fetching(subject))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/forecast/daily", get(get_daily_forecast))
        .route("/forecast/summary", get(get_forecast_summary))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[tracing::instrument(skip(state))]
async fn get_daily_forecast(
    State(state): State<AppState>,
    query: std::result::Result<Query<CoordinateQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let coordinate = requested_coordinate(query, "forecast")?;
    let mut payload = state.source.fetch_daily(coordinate).await?;
    attach_energy(&mut payload, &state.panel)?;
    Ok(Json(payload.into_value()))
}

#[tracing::instrument(skip(state))]
async fn get_forecast_summary(
    State(state): State<AppState>,
    query: std::result::Result<Query<CoordinateQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let coordinate = requested_coordinate(query, "summary")?;
    let mut payload = state.source.fetch_daily(coordinate).await?;
    attach_summary(&mut payload, &state.rules)?;
    Ok(Json(payload.into_value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastPayload;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Clone, Copy)]
    enum Reply {
        Week,
        Timeout,
        Unreachable,
        Malformed,
        Incomplete,
    }

    struct FakeSource {
        reply: Reply,
        calls: Mutex<Vec<GeoCoordinate>>,
    }

    impl FakeSource {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    fn week_body() -> Value {
        json!({
            "latitude": 52.25,
            "longitude": 21.0,
            "timezone": "Europe/Warsaw",
            "daily_units": {
                "time": "iso8601",
                "weather_code": "wmo code",
                "sunshine_duration": "s"
            },
            "daily": {
                "time": ["2024-06-01", "2024-06-02", "2024-06-03", "2024-06-04",
                         "2024-06-05", "2024-06-06", "2024-06-07"],
                "weather_code": [61, 63, 3, 80, 95, 1, 0],
                "temperature_2m_max": [20.1, 22.4, 25.0, 19.8, 18.2, 23.3, 24.0],
                "temperature_2m_min": [10.2, 11.5, 13.0, 9.1, 8.7, 12.0, 12.5],
                "sunshine_duration": [3600.0, 7200.0, 36000.0, 0.0, 1800.0, 28800.0, 36000.0],
                "surface_pressure_mean": [1000.0, 1002.0, 1001.0, 1003.0, 1002.0, 1004.0, 1002.0]
            }
        })
    }

    #[async_trait]
    impl ForecastSource for FakeSource {
        async fn fetch_daily(&self, coordinate: GeoCoordinate) -> Result<ForecastPayload> {
            self.calls.lock().unwrap().push(coordinate);
            match self.reply {
                Reply::Week => ForecastPayload::from_value(week_body()),
                Reply::Timeout => Err(PvcastError::upstream_timeout("no response within 5.0s")),
                Reply::Unreachable => Err(PvcastError::upstream_unreachable("connection refused")),
                Reply::Malformed => Err(PvcastError::upstream_malformed("expected value")),
                Reply::Incomplete => ForecastPayload::from_value(json!({ "reason": "x" })),
            }
        }
    }

    async fn get(source: Arc<FakeSource>, uri: &str) -> (StatusCode, Value) {
        let app = router(AppState::new(source));
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = get(FakeSource::new(Reply::Week), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn daily_forecast_adds_energy() {
        let source = FakeSource::new(Reply::Week);
        let (status, body) = get(source.clone(), "/forecast/daily?lat=52.23&lon=21.01").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["daily_units"]["energy"], "kWh");
        assert_eq!(body["daily_units"]["sunshine_duration"], "s");
        let energy = body["daily"]["energy"].as_array().unwrap();
        assert_eq!(energy.len(), 7);
        assert_eq!(energy[0], json!(0.5));
        assert_eq!(energy[1], json!(1.0));
        assert_eq!(energy[3], json!(0.0));
        assert_eq!(body["timezone"], "Europe/Warsaw");
        assert!(body.get("weather_summary").is_none());

        let calls = source.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[GeoCoordinate::new(52.23, 21.01).unwrap()]);
    }

    #[tokio::test]
    async fn summary_adds_top_level_fields() {
        let (status, body) =
            get(FakeSource::new(Reply::Week), "/forecast/summary?lat=52.23&lon=21.01").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["weather_summary"], "rainy");
        assert_eq!(body["temperature_min"], json!(8.7));
        assert_eq!(body["temperature_max"], json!(25.0));
        assert_eq!(body["avg_surface_pressure"], json!(1002.0));
        assert_eq!(body["avg_sunshine_duration"], json!(4.5));
        assert_eq!(body["daily"]["weather_code"], json!([61, 63, 3, 80, 95, 1, 0]));
        assert!(body["daily"].get("energy").is_none());
    }

    #[tokio::test]
    async fn invalid_coordinates_are_rejected_without_upstream_call() {
        for uri in [
            "/forecast/daily?lat=91&lon=0",
            "/forecast/daily?lat=0&lon=-180.01",
            "/forecast/summary?lat=abc&lon=0",
            "/forecast/summary?lat=10",
            "/forecast/daily",
        ] {
            let source = FakeSource::new(Reply::Week);
            let (status, body) = get(source.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["detail"].is_string());
            assert!(source.calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn undecodable_query_strings_get_json_detail() {
        for uri in [
            "/forecast/daily?lat=1&lat=2&lon=3",
            "/forecast/summary?lat=1&lon=2&lon=3",
            "/forecast/daily?lat=%FF%FE&lon=3",
        ] {
            let source = FakeSource::new(Reply::Week);
            let (status, body) = get(source.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            let detail = body["detail"].as_str().unwrap();
            assert!(detail.starts_with("Invalid coordinates"), "{detail}");
            assert!(source.calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn invalid_input_detail_names_the_endpoint() {
        let (_, body) = get(FakeSource::new(Reply::Week), "/forecast/daily?lat=91&lon=0").await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("cannot fetch forecast"), "{detail}");
        assert!(detail.contains("latitude"), "{detail}");

        let (_, body) = get(FakeSource::new(Reply::Week), "/forecast/summary?lat=91&lon=0").await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("cannot fetch summary"), "{detail}");

        let (_, body) = get(FakeSource::new(Reply::Week), "/forecast/summary?lat=1&lat=2").await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("cannot fetch summary"), "{detail}");
        assert!(detail.contains("duplicate field"), "{detail}");
    }

    #[tokio::test]
    async fn upstream_failures_map_to_status() {
        let cases = [
            (Reply::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (Reply::Unreachable, StatusCode::BAD_GATEWAY),
            (Reply::Malformed, StatusCode::INTERNAL_SERVER_ERROR),
            (Reply::Incomplete, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (reply, expected) in cases {
            for path in ["/forecast/daily", "/forecast/summary"] {
                let uri = format!("{path}?lat=1&lon=2");
                let (status, body) = get(FakeSource::new(reply), &uri).await;
                assert_eq!(status, expected, "{uri}");
                let fields = body.as_object().unwrap();
                assert_eq!(fields.len(), 1);
                assert!(fields.contains_key("detail"));
            }
        }
    }

    #[tokio::test]
    async fn derived_fields_are_stable_across_calls() {
        let source = FakeSource::new(Reply::Week);
        let (_, first) = get(source.clone(), "/forecast/summary?lat=1&lon=2").await;
        let (_, second) = get(source.clone(), "/forecast/summary?lat=1&lon=2").await;
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );

        let (_, first) = get(source.clone(), "/forecast/daily?lat=1&lon=2").await;
        let (_, second) = get(source, "/forecast/daily?lat=1&lon=2").await;
        assert_eq!(first["daily"]["energy"], second["daily"]["energy"]);
    }
}
