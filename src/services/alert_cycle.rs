use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::json;

use crate::error::CycleError;
use crate::models::CoinId;
use crate::services::evaluator::{self, FiringAlert};
use crate::AppState;
use crate::services::push::{PushPayload, format_usd};

/// What one check cycle did: `checked` counts alerts still eligible after
/// the cycle, `triggered` the alerts newly fired, `prices` the spot
/// snapshot the evaluation ran against.
#[derive(Debug, Serialize)]
pub struct CycleReport {
    pub checked: usize,
    pub triggered: usize,
    pub prices: HashMap<CoinId, f64>,
}

/// One synchronous evaluate-and-dispatch pass.
///
/// A price-fetch failure aborts the whole cycle (the adapter may still
/// hand back a stale cache, which proceeds normally). Every firing alert
/// is marked triggered before any push goes out, so a delivery failure or
/// crash mid-dispatch can never re-fire an alert on the next cycle.
pub async fn run_cycle(state: &AppState) -> Result<CycleReport, CycleError> {
    let snapshot = state.prices.fetch_prices().await?;
    let spot = snapshot.spot();

    let data = state.store.read().await?;
    let live_devices: HashSet<String> = data.subscriptions.keys().cloned().collect();

    let firing = evaluator::firing_alerts(&data.alerts, &spot, &live_devices);

    for f in &firing {
        state.store.set_triggered(&f.alert.id, true).await?;
    }

    let mut delivered = 0;
    for f in &firing {
        let payload = alert_payload(f);
        if state
            .push
            .deliver(&state.store, &f.alert.device_id, &payload)
            .await
        {
            delivered += 1;
        }
    }

    let untriggered_before = data.alerts.iter().filter(|a| !a.triggered).count();
    let report = CycleReport {
        checked: untriggered_before - firing.len(),
        triggered: firing.len(),
        prices: spot,
    };

    tracing::info!(
        "check cycle: {} checked, {} triggered, {} delivered",
        report.checked,
        report.triggered,
        delivered
    );

    Ok(report)
}

fn alert_payload(firing: &FiringAlert) -> PushPayload {
    let alert = &firing.alert;
    let symbol = alert.coin.symbol();

    PushPayload {
        title: format!("{symbol} Alert Triggered!"),
        body: format!(
            "{symbol} is now {} ({} {})",
            format_usd(firing.current_price),
            alert.condition,
            format_usd(alert.target_price)
        ),
        tag: format!("alert-{}", alert.id),
        data: json!({
            "alertId": alert.id,
            "coin": alert.coin,
            "currentPrice": firing.current_price,
        }),
    }
}
