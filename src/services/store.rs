use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Alert, AlertCondition, CoinId, PushSubscription, StoredSubscription};

pub const MAX_ALERTS_PER_DEVICE: usize = 20;

/// Everything the app persists, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub subscriptions: HashMap<String, StoredSubscription>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Whole-file JSON store. Every mutation is read-entire-state, mutate in
/// memory, write-entire-state, serialized by an advisory mutex so
/// concurrent requests cannot interleave their read-modify-write windows.
#[derive(Clone)]
pub struct JsonStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn read(&self) -> Result<StoreData, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(data) => Ok(data),
                Err(e) => {
                    tracing::warn!("store file unreadable, starting empty: {}", e);
                    Ok(StoreData::default())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreData::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write(&self, data: &StoreData) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_vec_pretty(data)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }

    // ---------------- Subscriptions ----------------

    pub async fn put_subscription(
        &self,
        device_id: &str,
        subscription: PushSubscription,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.read().await?;
        data.subscriptions.insert(
            device_id.to_string(),
            StoredSubscription {
                device_id: device_id.to_string(),
                subscription,
                created_at: Utc::now().timestamp_millis(),
            },
        );
        self.write(&data).await
    }

    pub async fn delete_subscription(&self, device_id: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.read().await?;
        data.subscriptions.remove(device_id);
        self.write(&data).await
    }

    pub async fn subscription(
        &self,
        device_id: &str,
    ) -> Result<Option<StoredSubscription>, StoreError> {
        let data = self.read().await?;
        Ok(data.subscriptions.get(device_id).cloned())
    }

    pub async fn all_subscriptions(&self) -> Result<Vec<StoredSubscription>, StoreError> {
        let data = self.read().await?;
        Ok(data.subscriptions.into_values().collect())
    }

    // ---------------- Alerts ----------------

    pub async fn add_alert(
        &self,
        device_id: &str,
        coin: CoinId,
        condition: AlertCondition,
        target_price: f64,
    ) -> Result<Alert, StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.read().await?;

        let device_alerts = data
            .alerts
            .iter()
            .filter(|a| a.device_id == device_id)
            .count();
        if device_alerts >= MAX_ALERTS_PER_DEVICE {
            return Err(StoreError::QuotaExceeded);
        }

        let alert = Alert {
            id: Uuid::new_v4().to_string(),
            device_id: device_id.to_string(),
            coin,
            coin_symbol: coin.symbol().to_string(),
            condition,
            target_price,
            triggered: false,
            created_at: Utc::now().timestamp_millis(),
        };

        data.alerts.push(alert.clone());
        self.write(&data).await?;
        Ok(alert)
    }

    /// Ownership-checked delete. Returns false when the alert does not
    /// exist or belongs to another device; callers cannot tell which.
    pub async fn remove_alert(&self, alert_id: &str, device_id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.read().await?;

        let before = data.alerts.len();
        data.alerts
            .retain(|a| !(a.id == alert_id && a.device_id == device_id));

        if data.alerts.len() < before {
            self.write(&data).await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Ownership-checked reset of the triggered flag, same false-on-missing
    /// contract as `remove_alert`.
    pub async fn reset_alert(&self, alert_id: &str, device_id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.read().await?;

        match data
            .alerts
            .iter_mut()
            .find(|a| a.id == alert_id && a.device_id == device_id)
        {
            Some(alert) => {
                alert.triggered = false;
                self.write(&data).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Evaluator path: flips the triggered flag by id alone. Unknown ids
    /// are a silent no-op.
    pub async fn set_triggered(&self, alert_id: &str, triggered: bool) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.read().await?;

        if let Some(alert) = data.alerts.iter_mut().find(|a| a.id == alert_id) {
            alert.triggered = triggered;
            self.write(&data).await?;
        }
        Ok(())
    }

    pub async fn alerts_for_device(&self, device_id: &str) -> Result<Vec<Alert>, StoreError> {
        let data = self.read().await?;
        Ok(data
            .alerts
            .into_iter()
            .filter(|a| a.device_id == device_id)
            .collect())
    }

    pub async fn all_alerts(&self) -> Result<Vec<Alert>, StoreError> {
        let data = self.read().await?;
        Ok(data.alerts)
    }
}
