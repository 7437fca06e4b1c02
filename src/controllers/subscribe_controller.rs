use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::models::{PushSubscription, SubscriptionKeys};

fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionBody {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub keys: SubscriptionKeys,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeBody {
    pub device_id: Option<String>,
    pub subscription: Option<SubscriptionBody>,
}

// POST /subscribe
pub async fn post_subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeBody>,
) -> Response {
    let device_id = body.device_id.filter(|s| !s.is_empty());
    let (Some(device_id), Some(subscription)) = (device_id, body.subscription) else {
        return error_json(StatusCode::BAD_REQUEST, "Missing deviceId or subscription");
    };

    if subscription.endpoint.is_empty() {
        return error_json(
            StatusCode::BAD_REQUEST,
            "Invalid subscription: missing endpoint",
        );
    }

    let subscription = PushSubscription {
        endpoint: subscription.endpoint,
        keys: subscription.keys,
    };

    match state.store.put_subscription(&device_id, subscription).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            tracing::error!("save subscription failed: {}", e);
            error_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save subscription",
            )
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeBody {
    pub device_id: Option<String>,
}

// DELETE /subscribe
pub async fn delete_subscribe(
    State(state): State<AppState>,
    Json(body): Json<UnsubscribeBody>,
) -> Response {
    let Some(device_id) = body.device_id.filter(|s| !s.is_empty()) else {
        return error_json(StatusCode::BAD_REQUEST, "Missing deviceId");
    };

    match state.store.delete_subscription(&device_id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => {
            tracing::error!("remove subscription failed: {}", e);
            error_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to remove subscription",
            )
        }
    }
}
