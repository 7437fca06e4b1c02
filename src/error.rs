use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Maximum 20 alerts per device")]
    QuotaExceeded,

    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Price feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Price feed returned status {0}")]
    Status(u16),
}

#[derive(Error, Debug)]
pub enum CycleError {
    #[error(transparent)]
    Price(#[from] PriceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
