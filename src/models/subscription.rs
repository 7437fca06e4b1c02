use serde::{Deserialize, Serialize};

/// Key material issued by the browser's push service. Keys may be absent
/// in a subscribe request; delivery to such a subscription simply fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    #[serde(default)]
    pub p256dh: String,
    #[serde(default)]
    pub auth: String,
}

/// Push endpoint descriptor, opaque to us and owned by the push service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub keys: SubscriptionKeys,
}

/// One active subscription per device, last-write-wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubscription {
    pub device_id: String,
    pub subscription: PushSubscription,
    pub created_at: i64,
}
