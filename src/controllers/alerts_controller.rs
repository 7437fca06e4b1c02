use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::error::StoreError;
use crate::models::{AlertCondition, CoinId};

fn device_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-device-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// GET /alerts
pub async fn get_alerts(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(device) = device_id(&headers) else {
        return error_json(StatusCode::BAD_REQUEST, "Missing device ID");
    };

    match state.store.alerts_for_device(&device).await {
        Ok(alerts) => (StatusCode::OK, Json(json!({ "alerts": alerts }))).into_response(),
        Err(e) => {
            tracing::error!("list alerts failed: {}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get alerts")
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertBody {
    pub coin: Option<String>,
    pub condition: Option<String>,
    pub target_price: Option<f64>,
}

// POST /alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateAlertBody>,
) -> Response {
    let Some(device) = device_id(&headers) else {
        return error_json(StatusCode::BAD_REQUEST, "Missing device ID");
    };

    let (Some(coin), Some(condition), Some(target_price)) =
        (body.coin, body.condition, body.target_price)
    else {
        return error_json(StatusCode::BAD_REQUEST, "Missing required fields");
    };

    let Ok(coin) = coin.parse::<CoinId>() else {
        return error_json(StatusCode::BAD_REQUEST, "Invalid coin");
    };
    let Ok(condition) = condition.parse::<AlertCondition>() else {
        return error_json(StatusCode::BAD_REQUEST, "Invalid condition");
    };
    if !target_price.is_finite() || target_price <= 0.0 {
        return error_json(StatusCode::BAD_REQUEST, "Target price must be positive");
    }

    match state
        .store
        .add_alert(&device, coin, condition, target_price)
        .await
    {
        Ok(alert) => (StatusCode::OK, Json(json!({ "alert": alert }))).into_response(),
        // Known rough edge: quota surfaces as a 500 with its message, not a 400.
        Err(e @ StoreError::QuotaExceeded) => {
            error_json(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(e) => {
            tracing::error!("create alert failed: {}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create alert")
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAlertBody {
    pub alert_id: Option<String>,
}

// DELETE /alerts
pub async fn delete_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<DeleteAlertBody>,
) -> Response {
    let Some(device) = device_id(&headers) else {
        return error_json(StatusCode::BAD_REQUEST, "Missing device ID");
    };
    let Some(alert_id) = body.alert_id.filter(|s| !s.is_empty()) else {
        return error_json(StatusCode::BAD_REQUEST, "Missing alert ID");
    };

    match state.store.remove_alert(&alert_id, &device).await {
        // Not-found and not-owned collapse into one 404 on purpose.
        Ok(false) => error_json(StatusCode::NOT_FOUND, "Alert not found"),
        Ok(true) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            tracing::error!("delete alert failed: {}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete alert")
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchAlertBody {
    pub alert_id: Option<String>,
    pub action: Option<String>,
}

// PATCH /alerts
pub async fn patch_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PatchAlertBody>,
) -> Response {
    let Some(device) = device_id(&headers) else {
        return error_json(StatusCode::BAD_REQUEST, "Missing device ID");
    };

    let alert_id = body.alert_id.filter(|s| !s.is_empty());
    let (Some(alert_id), Some("reset")) = (alert_id, body.action.as_deref()) else {
        return error_json(StatusCode::BAD_REQUEST, "Invalid request");
    };

    match state.store.reset_alert(&alert_id, &device).await {
        Ok(false) => error_json(StatusCode::NOT_FOUND, "Alert not found"),
        Ok(true) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            tracing::error!("reset alert failed: {}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Failed to reset alert")
        }
    }
}
