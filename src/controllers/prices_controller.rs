use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;

// GET /prices
pub async fn get_prices(State(state): State<AppState>) -> Response {
    match state.prices.fetch_prices().await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        // Only reachable when the upstream fails and no cache exists yet.
        Err(e) => {
            tracing::error!("price fetch failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch prices" })),
            )
                .into_response()
        }
    }
}
