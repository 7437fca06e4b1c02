use std::collections::{HashMap, HashSet};

use crate::models::{Alert, AlertCondition, CoinId};

/// An alert that should fire this cycle, paired with the price it fired at.
#[derive(Debug, Clone)]
pub struct FiringAlert {
    pub alert: Alert,
    pub current_price: f64,
}

/// Pure evaluation pass: no I/O, no mutation. Preserves input order.
///
/// An alert is skipped when it already triggered, when its device has no
/// live subscription, or when the snapshot has no usable price for its coin
/// (zero/non-finite counts as "no data", never as satisfying "below").
/// Comparisons are inclusive: a price exactly at the target fires.
pub fn firing_alerts(
    alerts: &[Alert],
    prices: &HashMap<CoinId, f64>,
    live_devices: &HashSet<String>,
) -> Vec<FiringAlert> {
    alerts
        .iter()
        .filter_map(|alert| {
            if alert.triggered {
                return None;
            }
            if !live_devices.contains(&alert.device_id) {
                return None;
            }

            let price = *prices.get(&alert.coin)?;
            if !price.is_finite() || price <= 0.0 {
                return None;
            }

            let hit = match alert.condition {
                AlertCondition::Above => price >= alert.target_price,
                AlertCondition::Below => price <= alert.target_price,
            };

            hit.then(|| FiringAlert {
                alert: alert.clone(),
                current_price: price,
            })
        })
        .collect()
}
