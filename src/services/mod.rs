pub mod alert_cycle;
pub mod coingecko;
pub mod evaluator;
pub mod push;
pub mod store;
