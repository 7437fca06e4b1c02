pub mod alert;
pub mod price;
pub mod subscription;

pub use alert::{Alert, AlertCondition, CoinId};
pub use price::{CryptoPrice, PriceSnapshot};
pub use subscription::{PushSubscription, StoredSubscription, SubscriptionKeys};
