use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    /// Single-file JSON store.
    pub data_file: PathBuf,

    pub coingecko_api_url: String,
    pub price_cache_ttl_ms: i64,

    /// Shared secret for the external scheduler hitting /check-alerts.
    pub cron_secret: String,

    pub vapid_subject: String,
    /// PEM-encoded P-256 private key. Empty means push delivery is disabled.
    pub vapid_private_key: String,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let data_file = env::var("DATA_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/store.json"));

    let coingecko_api_url = env::var("COINGECKO_API_URL")
        .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string());

    let price_cache_ttl_ms = env::var("PRICE_CACHE_TTL_MS")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(30_000);

    let cron_secret =
        env::var("CRON_SECRET").unwrap_or_else(|_| "change-me-dev-cron-secret".to_string());

    let vapid_subject =
        env::var("VAPID_SUBJECT").unwrap_or_else(|_| "mailto:alerts@example.com".to_string());
    let vapid_private_key = env::var("VAPID_PRIVATE_KEY").unwrap_or_default();

    Settings {
        host,
        port,
        data_file,
        coingecko_api_url,
        price_cache_ttl_ms,
        cron_secret,
        vapid_subject,
        vapid_private_key,
    }
}
