use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::PriceError;
use crate::models::{CoinId, CryptoPrice, PriceSnapshot};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw `/simple/price` entry. Missing fields default to zero so a coin the
/// upstream dropped never aborts a cycle.
#[derive(Debug, Deserialize)]
struct UpstreamQuote {
    #[serde(default)]
    usd: f64,
    #[serde(default)]
    usd_24h_change: f64,
}

/// CoinGecko adapter with a short-lived snapshot cache. The cache is owned
/// by the client instance (one per process, shared through `AppState`), not
/// module state.
#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
    cache_ttl_ms: i64,
    cache: Arc<Mutex<Option<PriceSnapshot>>>,
}

impl CoinGeckoClient {
    pub fn new(base_url: String, cache_ttl_ms: i64) -> Self {
        Self {
            http: Client::new(),
            base_url,
            cache_ttl_ms,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the current snapshot, served from cache inside the TTL
    /// window. A live-fetch failure falls back to whatever cache exists
    /// (marked stale); only a failure with no cache at all is an error.
    pub async fn fetch_prices(&self) -> Result<PriceSnapshot, PriceError> {
        let now = Utc::now().timestamp_millis();

        {
            let cache = self.cache.lock().await;
            if let Some(snap) = cache.as_ref() {
                if now - snap.timestamp < self.cache_ttl_ms {
                    let mut out = snap.clone();
                    out.cached = true;
                    return Ok(out);
                }
            }
        }

        match self.fetch_live().await {
            Ok(prices) => {
                let snap = PriceSnapshot {
                    prices,
                    timestamp: now,
                    cached: false,
                    stale: false,
                };
                *self.cache.lock().await = Some(snap.clone());
                Ok(snap)
            }
            Err(e) => {
                let cache = self.cache.lock().await;
                match cache.as_ref() {
                    Some(snap) => {
                        tracing::warn!("price fetch failed, serving stale cache: {}", e);
                        let mut out = snap.clone();
                        out.cached = true;
                        out.stale = true;
                        Ok(out)
                    }
                    None => Err(e),
                }
            }
        }
    }

    async fn fetch_live(&self) -> Result<Vec<CryptoPrice>, PriceError> {
        let url = format!("{}/simple/price", self.base_url);
        let ids = CoinId::ALL.map(|c| c.api_id()).join(",");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(PriceError::Status(res.status().as_u16()));
        }

        let data: HashMap<String, UpstreamQuote> = res.json().await?;

        // Fixed order: BTC, ETH, SOL. Coins the upstream omitted show up
        // with a zero price rather than failing the whole fetch.
        let prices = CoinId::ALL
            .iter()
            .map(|&coin| {
                let quote = data.get(coin.api_id());
                CryptoPrice {
                    id: coin,
                    symbol: coin.symbol().to_string(),
                    name: coin.display_name().to_string(),
                    price: quote.map(|q| q.usd).unwrap_or(0.0),
                    change24h: quote.map(|q| q.usd_24h_change).unwrap_or(0.0),
                }
            })
            .collect();

        Ok(prices)
    }
}
