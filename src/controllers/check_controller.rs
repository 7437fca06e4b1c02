use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;
use crate::services::alert_cycle;

/// The cycle trigger is open to localhost, to callers carrying the cron
/// bearer secret, and to schedulers that stamp an `x-cron-trigger` header.
fn is_authorized(headers: &HeaderMap, cron_secret: &str) -> bool {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if host.contains("localhost") || host.starts_with("127.0.0.1") {
        return true;
    }

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if authorization == format!("Bearer {cron_secret}") {
        return true;
    }

    headers.contains_key("x-cron-trigger")
}

// GET /check-alerts
pub async fn get_check_alerts(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !is_authorized(&headers, &state.settings.cron_secret) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response();
    }

    match alert_cycle::run_cycle(&state).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            tracing::error!("check cycle failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to check alerts" })),
            )
                .into_response()
        }
    }
}
