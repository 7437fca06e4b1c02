//! Library entrypoint for coinping.
//!
//! This file exists mainly to make controller tests easy (integration tests
//! under `tests/` can import the app state, routers, controllers, services).

pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod controllers;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: services::store::JsonStore,
    pub prices: services::coingecko::CoinGeckoClient,
    pub push: services::push::PushSender,
}

impl AppState {
    pub fn from_settings(settings: config::Settings) -> Self {
        let store = services::store::JsonStore::new(&settings.data_file);
        let prices = services::coingecko::CoinGeckoClient::new(
            settings.coingecko_api_url.clone(),
            settings.price_cache_ttl_ms,
        );
        let push = services::push::PushSender::new(
            settings.vapid_private_key.clone(),
            settings.vapid_subject.clone(),
        );

        AppState {
            settings,
            store,
            prices,
            push,
        }
    }
}
