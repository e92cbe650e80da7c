//! HTTP API routes
//!
//! Defines all REST API endpoints for the server. Handlers only parse and
//! shape requests; all ping semantics live in `PingStore`.

use crate::error::Error;
use crate::ping::{now_millis, NewPing, Ping};
use crate::server::state::AppState;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/pings", post(record_handler).get(list_handler))
        .route(
            "/api/pings/nearby",
            get(nearby_handler).delete(delete_nearby_user_handler),
        )
        .route("/api/pings/:user_id", delete(delete_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError::new(err.to_string(), code)
    }
}

/// A number sent either as a JSON number or as a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    /// Finite numeric value, or None if the text is not a finite float
    ///
    /// `"NaN"` and `"inf"` parse as floats but cannot be sent back as JSON,
    /// so they count as missing.
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().ok()?,
        };
        Some(value).filter(|v| v.is_finite())
    }

    /// Value as epoch milliseconds, fractional part truncated
    pub fn to_millis(&self) -> Option<i64> {
        self.to_f64().map(|v| v.trunc() as i64)
    }
}

/// Record ping request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPingRequest {
    pub user_id: Option<String>,
    pub sport: Option<String>,
    pub latitude: Option<NumberOrText>,
    pub longitude: Option<NumberOrText>,
    /// Epoch milliseconds; server time is used when absent or unusable
    pub timestamp: Option<NumberOrText>,
}

impl From<RecordPingRequest> for NewPing {
    fn from(req: RecordPingRequest) -> Self {
        NewPing {
            user_id: req.user_id,
            sport: req.sport,
            latitude: req.latitude.as_ref().and_then(NumberOrText::to_f64),
            longitude: req.longitude.as_ref().and_then(NumberOrText::to_f64),
            timestamp: req.timestamp.as_ref().and_then(NumberOrText::to_millis),
        }
    }
}

/// Record ping response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordPingResponse {
    pub success: bool,
    pub ping: Ping,
}

/// Record (or replace) the caller's ping
///
/// POST /api/pings
async fn record_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecordPingRequest>, JsonRejection>,
) -> Result<Json<RecordPingResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        ApiError::new(format!("Invalid request body: {}", e.body_text()), "INVALID_BODY")
    })?;

    let ping = state.store.record(req.into()).await?;

    Ok(Json(RecordPingResponse { success: true, ping }))
}

/// Ping list response
#[derive(Debug, Serialize, Deserialize)]
pub struct PingsResponse {
    pub pings: Vec<Ping>,
}

/// List all active pings
///
/// GET /api/pings
async fn list_handler(State(state): State<Arc<AppState>>) -> Json<PingsResponse> {
    Json(PingsResponse {
        pings: state.store.list_active().await,
    })
}

/// Nearby query parameters, kept as raw text so parsing rules live here
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub radius: Option<String>,
}

/// Parse a coordinate query parameter, NaN when absent or unparsable
fn parse_coordinate(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(f64::NAN)
}

/// Resolve the search radius
///
/// Falls back to `default` when the radius is absent, unparsable, NaN, zero
/// or negative.
pub fn resolve_radius(raw: Option<&str>, default: f64) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|r| *r > 0.0)
        .unwrap_or(default)
}

/// Find active pings around a point
///
/// GET /api/pings/nearby?lat=..&lon=..&radius=..
async fn nearby_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<PingsResponse>, ApiError> {
    let lat = parse_coordinate(query.lat.as_deref());
    let lon = parse_coordinate(query.lon.as_deref());
    let radius = resolve_radius(query.radius.as_deref(), state.default_radius());

    let pings = state
        .store
        .query_nearby(lat, lon, radius, now_millis())
        .await
        .map_err(|e| ApiError::new(e.to_string(), "INVALID_COORDINATES"))?;

    Ok(Json(PingsResponse { pings }))
}

/// Generic success response
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Remove a user's ping
///
/// DELETE /api/pings/:user_id
async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<SuccessResponse> {
    state.store.delete_by_user(&user_id).await;
    Json(SuccessResponse { success: true })
}

/// Remove the ping of the user literally named "nearby"
///
/// The static nearby route shadows `/:user_id` for this one id.
///
/// DELETE /api/pings/nearby
async fn delete_nearby_user_handler(State(state): State<Arc<AppState>>) -> Json<SuccessResponse> {
    delete_handler(State(state), Path("nearby".to_string())).await
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Stored pings, including expired ones not yet swept
    pub active_pings: usize,
}

/// Health check
///
/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        active_pings: state.store.len().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn create_test_state() -> Arc<AppState> {
        Arc::new(AppState::from_config(Config::default()))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/pings")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(create_test_state());

        let (status, body) = send(&app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_value(body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.active_pings, 0);
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let app = create_router(create_test_state());

        let (status, body) = send(
            &app,
            post_json(serde_json::json!({
                "userId": "u1",
                "sport": "run",
                "latitude": 37.7749,
                "longitude": -122.4194
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let recorded: RecordPingResponse = serde_json::from_value(body).unwrap();
        assert!(recorded.success);
        assert_eq!(recorded.ping.user_id, "u1");

        let (status, body) = send(&app, get("/api/pings")).await;
        assert_eq!(status, StatusCode::OK);
        let list: PingsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(list.pings, vec![recorded.ping]);
    }

    #[tokio::test]
    async fn test_record_uses_camel_case_wire_format() {
        let app = create_router(create_test_state());

        let (_, body) = send(
            &app,
            post_json(serde_json::json!({
                "userId": "u1",
                "sport": "run",
                "latitude": 1.5,
                "longitude": 2.5,
                "timestamp": now_millis()
            })),
        )
        .await;

        assert_eq!(body["success"], true);
        assert_eq!(body["ping"]["userId"], "u1");
        assert!(body["ping"]["id"].is_string());
        assert!(body["ping"]["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn test_record_accepts_numeric_strings() {
        let app = create_router(create_test_state());

        let (status, body) = send(
            &app,
            post_json(serde_json::json!({
                "userId": "u1",
                "sport": "bike",
                "latitude": "37.7749",
                "longitude": "-122.4194"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ping"]["latitude"], 37.7749);
        assert_eq!(body["ping"]["longitude"], -122.4194);
    }

    #[tokio::test]
    async fn test_record_missing_sport() {
        let app = create_router(create_test_state());

        let (status, body) = send(
            &app,
            post_json(serde_json::json!({
                "userId": "u1",
                "latitude": 37.7749,
                "longitude": -122.4194
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ApiError = serde_json::from_value(body).unwrap();
        assert_eq!(err.error, "Missing required fields");
        assert_eq!(err.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_record_invalid_body() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/api/pings")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn test_rerecord_keeps_single_ping() {
        let app = create_router(create_test_state());

        for lat in [10.0, 20.0] {
            let (status, _) = send(
                &app,
                post_json(serde_json::json!({
                    "userId": "u1",
                    "sport": "run",
                    "latitude": lat,
                    "longitude": 0.0
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = send(&app, get("/api/pings")).await;
        let list: PingsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(list.pings.len(), 1);
        assert_eq!(list.pings[0].latitude, 20.0);
    }

    #[tokio::test]
    async fn test_nearby_radius() {
        let state = create_test_state();
        state
            .store
            .record(NewPing::new("u1", "run", 37.7749, -122.4194))
            .await
            .unwrap();
        let app = create_router(state);

        let (status, body) = send(
            &app,
            get("/api/pings/nearby?lat=37.7750&lon=-122.4194&radius=200"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let found: PingsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(found.pings.len(), 1);

        let (_, body) = send(&app, get("/api/pings/nearby?lat=37.7750&lon=-122.4194&radius=5")).await;
        let found: PingsResponse = serde_json::from_value(body).unwrap();
        assert!(found.pings.is_empty());
    }

    #[tokio::test]
    async fn test_nearby_default_radius() {
        let state = create_test_state();
        // ~111m and ~333m north of the query point
        state
            .store
            .record(NewPing::new("close", "run", 0.001, 0.0))
            .await
            .unwrap();
        state
            .store
            .record(NewPing::new("distant", "run", 0.003, 0.0))
            .await
            .unwrap();
        let app = create_router(state);

        for uri in [
            "/api/pings/nearby?lat=0&lon=0",
            "/api/pings/nearby?lat=0&lon=0&radius=0",
            "/api/pings/nearby?lat=0&lon=0&radius=abc",
            "/api/pings/nearby?lat=0&lon=0&radius=-50",
        ] {
            let (status, body) = send(&app, get(uri)).await;
            assert_eq!(status, StatusCode::OK);
            let found: PingsResponse = serde_json::from_value(body).unwrap();
            assert_eq!(found.pings.len(), 1, "unexpected result for {}", uri);
            assert_eq!(found.pings[0].user_id, "close");
        }
    }

    #[tokio::test]
    async fn test_nearby_invalid_coordinates() {
        let app = create_router(create_test_state());

        for uri in [
            "/api/pings/nearby?lat=abc&lon=0",
            "/api/pings/nearby?lon=0",
            "/api/pings/nearby?lat=0",
            "/api/pings/nearby",
        ] {
            let (status, body) = send(&app, get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let err: ApiError = serde_json::from_value(body).unwrap();
            assert_eq!(err.error, "Invalid coordinates");
            assert_eq!(err.code, "INVALID_COORDINATES");
        }
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let state = create_test_state();
        state
            .store
            .record(NewPing::new("u1", "run", 1.0, 1.0))
            .await
            .unwrap();
        let app = create_router(state.clone());

        for _ in 0..2 {
            let request = Request::builder()
                .method("DELETE")
                .uri("/api/pings/u1")
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, serde_json::json!({ "success": true }));
        }

        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_health_counts_unswept_expired_pings() {
        let state = create_test_state();
        let stale = now_millis() - 10 * 60 * 1000;
        state
            .store
            .record(NewPing::new("u1", "run", 1.0, 1.0).with_timestamp(stale))
            .await
            .unwrap();
        let app = create_router(state);

        let (_, body) = send(&app, get("/api/pings")).await;
        let list: PingsResponse = serde_json::from_value(body).unwrap();
        assert!(list.pings.is_empty());

        let (_, body) = send(&app, get("/health")).await;
        assert_eq!(body["activePings"], 1);
    }

    #[tokio::test]
    async fn test_record_rejects_non_finite_coordinates() {
        let state = create_test_state();
        let app = create_router(state.clone());

        let (status, body) = send(
            &app,
            post_json(serde_json::json!({
                "userId": "u1",
                "sport": "run",
                "latitude": "NaN",
                "longitude": "inf"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ApiError = serde_json::from_value(body).unwrap();
        assert_eq!(err.error, "Missing required fields");
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert!(state.store.is_empty().await);

        let (status, _) = send(
            &app,
            post_json(serde_json::json!({
                "userId": "u1",
                "sport": "run",
                "latitude": 1.0,
                "longitude": "-infinity"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, get("/api/pings")).await;
        let list: PingsResponse = serde_json::from_value(body).unwrap();
        assert!(list.pings.is_empty());
    }

    #[tokio::test]
    async fn test_record_accepts_float_and_text_timestamps() {
        let app = create_router(create_test_state());
        let now = now_millis();

        let (status, body) = send(
            &app,
            post_json(serde_json::json!({
                "userId": "u1",
                "sport": "run",
                "latitude": 1.0,
                "longitude": 2.0,
                "timestamp": now as f64 + 0.75
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ping"]["timestamp"], now);

        let (status, body) = send(
            &app,
            post_json(serde_json::json!({
                "userId": "u2",
                "sport": "run",
                "latitude": 1.0,
                "longitude": 2.0,
                "timestamp": now.to_string()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ping"]["timestamp"], now);
    }

    #[tokio::test]
    async fn test_unusable_timestamp_falls_back_to_server_time() {
        let app = create_router(create_test_state());
        let before = now_millis();

        let (status, body) = send(
            &app,
            post_json(serde_json::json!({
                "userId": "u1",
                "sport": "run",
                "latitude": 1.0,
                "longitude": 2.0,
                "timestamp": "soon"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["ping"]["timestamp"].as_i64().unwrap() >= before);
    }

    #[tokio::test]
    async fn test_delete_user_named_nearby() {
        let state = create_test_state();
        state
            .store
            .record(NewPing::new("nearby", "run", 1.0, 1.0))
            .await
            .unwrap();
        let app = create_router(state.clone());

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/pings/nearby")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "success": true }));
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[test]
    fn test_resolve_radius() {
        assert_eq!(resolve_radius(None, 200.0), 200.0);
        assert_eq!(resolve_radius(Some("0"), 200.0), 200.0);
        assert_eq!(resolve_radius(Some("NaN"), 200.0), 200.0);
        assert_eq!(resolve_radius(Some("-1"), 200.0), 200.0);
        assert_eq!(resolve_radius(Some("junk"), 200.0), 200.0);
        assert_eq!(resolve_radius(Some("750.5"), 200.0), 750.5);
        assert_eq!(resolve_radius(Some(" 5 "), 200.0), 5.0);
    }
}
