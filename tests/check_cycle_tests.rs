use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    http::{Request, StatusCode, header},
    routing::get,
};
use coinping::{AppState, config, routes};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn test_state(feed_url: &str, cache_ttl_ms: i64) -> AppState {
    let mut settings = config::load();
    settings.data_file =
        std::env::temp_dir().join(format!("coinping-test-{}.json", uuid::Uuid::new_v4()));
    settings.vapid_private_key = String::new();
    settings.coingecko_api_url = feed_url.to_string();
    settings.price_cache_ttl_ms = cache_ttl_ms;
    settings.cron_secret = "test-cron-secret".to_string();
    AppState::from_settings(settings)
}

/// Stands in for CoinGecko: serves `response` for the first `ok_responses`
/// requests, then 500s.
async fn spawn_price_feed(response: serde_json::Value, ok_responses: usize) -> String {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route(
        "/simple/price",
        get(move || {
            let n = hits.fetch_add(1, Ordering::SeqCst);
            let body = response.clone();
            async move {
                if n < ok_responses {
                    Ok(Json(body))
                } else {
                    Err(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn feed_body(bitcoin_usd: f64) -> serde_json::Value {
    serde_json::json!({
        "bitcoin": { "usd": bitcoin_usd, "usd_24h_change": 1.2 },
        "ethereum": { "usd": 2_500.0, "usd_24h_change": -0.4 },
        "solana": { "usd": 150.0, "usd_24h_change": 3.1 },
    })
}

fn json_request(
    method: &str,
    uri: &str,
    device: &str,
    body: serde_json::Value,
) -> Request<axum::body::Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-device-id", device)
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

fn check_request(secret: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri("/check-alerts")
        .header(header::AUTHORIZATION, format!("Bearer {secret}"))
        .body(axum::body::Body::empty())
        .unwrap()
}

async fn response_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn run_check(state: &AppState) -> (StatusCode, serde_json::Value) {
    let res = routes::app(state.clone())
        .oneshot(check_request(&state.settings.cron_secret))
        .await
        .unwrap();
    let status = res.status();
    (status, response_json(res).await)
}

#[tokio::test]
async fn cycle_triggers_alert_once_and_counts_the_rest() {
    let feed = spawn_price_feed(feed_body(51_000.0), usize::MAX).await;
    let state = test_state(&feed, 30_000);
    let app = || routes::app(state.clone());

    // d1 subscribes and sets a threshold below the current price.
    let res = app()
        .oneshot(json_request(
            "POST",
            "/subscribe",
            "d1",
            serde_json::json!({
                "deviceId": "d1",
                "subscription": { "endpoint": "https://push.example/d1", "keys": {} },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app()
        .oneshot(json_request(
            "POST",
            "/alerts",
            "d1",
            serde_json::json!({ "coin": "bitcoin", "condition": "above", "targetPrice": 50_000.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // d2 has an alert but never subscribed, so it must not fire.
    let res = app()
        .oneshot(json_request(
            "POST",
            "/alerts",
            "d2",
            serde_json::json!({ "coin": "bitcoin", "condition": "above", "targetPrice": 1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (status, body) = run_check(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["triggered"], 1);
    assert_eq!(body["checked"], 1);
    assert_eq!(body["prices"]["bitcoin"], 51_000.0);

    let alerts = state.store.alerts_for_device("d1").await.unwrap();
    assert!(alerts[0].triggered);
    assert!(!state.store.alerts_for_device("d2").await.unwrap()[0].triggered);

    // Unchanged prices: the fired alert stays fired.
    let (status, body) = run_check(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["triggered"], 0);
    assert_eq!(body["checked"], 1);
}

#[tokio::test]
async fn reset_restores_eligibility_for_the_next_cycle() {
    let feed = spawn_price_feed(feed_body(51_000.0), usize::MAX).await;
    let state = test_state(&feed, 30_000);

    state
        .store
        .put_subscription(
            "d1",
            coinping::models::PushSubscription {
                endpoint: "https://push.example/d1".to_string(),
                keys: Default::default(),
            },
        )
        .await
        .unwrap();
    let alert = state
        .store
        .add_alert(
            "d1",
            coinping::models::CoinId::Bitcoin,
            coinping::models::AlertCondition::Above,
            50_000.0,
        )
        .await
        .unwrap();

    let (_, body) = run_check(&state).await;
    assert_eq!(body["triggered"], 1);

    let res = routes::app(state.clone())
        .oneshot(json_request(
            "PATCH",
            "/alerts",
            "d1",
            serde_json::json!({ "alertId": alert.id, "action": "reset" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (_, body) = run_check(&state).await;
    assert_eq!(body["triggered"], 1);
}

#[tokio::test]
async fn cycle_requires_authorization() {
    let feed = spawn_price_feed(feed_body(51_000.0), usize::MAX).await;
    let state = test_state(&feed, 30_000);

    let res = routes::app(state.clone())
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/check-alerts")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = routes::app(state.clone())
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/check-alerts")
                .header(header::AUTHORIZATION, "Bearer wrong-secret")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // A scheduler header is enough on its own.
    let res = routes::app(state.clone())
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/check-alerts")
                .header("x-cron-trigger", "1")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // So is a localhost Host header.
    let res = routes::app(state.clone())
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/check-alerts")
                .header(header::HOST, "localhost:3000")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn cycle_aborts_when_feed_is_down_and_no_cache_exists() {
    let state = test_state("http://127.0.0.1:1", 30_000);

    let (status, body) = run_check(&state).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn cycle_proceeds_on_stale_cache_when_feed_fails() {
    // TTL zero forces a live fetch every time; the feed dies after one
    // success, so the second cycle runs against the stale snapshot.
    let feed = spawn_price_feed(feed_body(49_000.0), 1).await;
    let state = test_state(&feed, 0);

    state
        .store
        .put_subscription(
            "d1",
            coinping::models::PushSubscription {
                endpoint: "https://push.example/d1".to_string(),
                keys: Default::default(),
            },
        )
        .await
        .unwrap();
    state
        .store
        .add_alert(
            "d1",
            coinping::models::CoinId::Bitcoin,
            coinping::models::AlertCondition::Above,
            50_000.0,
        )
        .await
        .unwrap();

    let (status, body) = run_check(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["triggered"], 0);

    // 49,000 < 50,000: still no fire, but the cycle completes.
    let (status, body) = run_check(&state).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["triggered"], 0);
    assert_eq!(body["checked"], 1);
    assert_eq!(body["prices"]["bitcoin"], 49_000.0);
}
