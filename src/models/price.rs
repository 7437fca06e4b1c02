use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::CoinId;

/// Normalized quote served by `GET /prices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoPrice {
    pub id: CoinId,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change24h: f64,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One fetch result, possibly served from the adapter's short-lived cache.
/// `stale` means the upstream call failed and an expired cache entry was
/// returned instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub prices: Vec<CryptoPrice>,
    pub timestamp: i64,
    pub cached: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stale: bool,
}

impl PriceSnapshot {
    /// Spot map for the evaluator. Coins the upstream didn't return carry
    /// a zero price, which the evaluator treats as "no data".
    pub fn spot(&self) -> HashMap<CoinId, f64> {
        self.prices.iter().map(|p| (p.id, p.price)).collect()
    }
}
