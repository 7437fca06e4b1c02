use std::io::Cursor;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder,
};

use crate::models::PushSubscription;
use crate::services::store::JsonStore;

const DEFAULT_ICON: &str = "/icons/icon-192.png";
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Notification content. `tag` lets the client collapse repeated
/// notifications for the same alert; `data` carries the deep-link blob.
#[derive(Debug, Clone, Serialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub data: serde_json::Value,
}

/// Web-push delivery with VAPID signing. Failures are logged and reported
/// as `false`, never raised: one dead endpoint must not block the rest of
/// a dispatch loop.
#[derive(Clone)]
pub struct PushSender {
    vapid_private_key: String,
    vapid_subject: String,
}

impl PushSender {
    pub fn new(vapid_private_key: String, vapid_subject: String) -> Self {
        Self {
            vapid_private_key,
            vapid_subject,
        }
    }

    fn has_key(&self) -> bool {
        !self.vapid_private_key.trim().is_empty()
    }

    /// Delivers to one device. No registered subscription is not an error,
    /// merely nothing to deliver to.
    pub async fn deliver(&self, store: &JsonStore, device_id: &str, payload: &PushPayload) -> bool {
        let stored = match store.subscription(device_id).await {
            Ok(Some(s)) => s,
            Ok(None) => {
                tracing::debug!("no subscription for device {}", device_id);
                return false;
            }
            Err(e) => {
                tracing::error!("subscription lookup failed for {}: {}", device_id, e);
                return false;
            }
        };

        self.send(&stored.subscription, payload).await
    }

    /// Broadcasts to every stored subscription; returns the success count.
    pub async fn deliver_all(&self, store: &JsonStore, payload: &PushPayload) -> usize {
        let subscriptions = match store.all_subscriptions().await {
            Ok(subs) => subs,
            Err(e) => {
                tracing::error!("subscription listing failed: {}", e);
                return 0;
            }
        };

        let mut delivered = 0;
        for stored in &subscriptions {
            if self.send(&stored.subscription, payload).await {
                delivered += 1;
            }
        }
        delivered
    }

    async fn send(&self, subscription: &PushSubscription, payload: &PushPayload) -> bool {
        if !self.has_key() {
            tracing::warn!("VAPID_PRIVATE_KEY is not set, push delivery disabled");
            return false;
        }
        if subscription.endpoint.is_empty() {
            tracing::warn!("invalid subscription: missing endpoint");
            return false;
        }

        let body = json!({
            "title": payload.title,
            "body": payload.body,
            "icon": DEFAULT_ICON,
            "badge": DEFAULT_ICON,
            "tag": payload.tag,
            "data": payload.data,
        });
        let body = match serde_json::to_vec(&body) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!("push payload serialization failed: {}", e);
                return false;
            }
        };

        match tokio::time::timeout(DELIVERY_TIMEOUT, self.send_raw(subscription, &body)).await {
            Ok(Ok(())) => true,
            // Expired/invalid endpoint. Deliberately no store cleanup here:
            // the subscription stays until the device re-subscribes or
            // unsubscribes itself.
            Ok(Err(WebPushError::EndpointNotFound | WebPushError::EndpointNotValid)) => {
                tracing::info!("subscription expired or invalid: {}", subscription.endpoint);
                false
            }
            Ok(Err(e)) => {
                tracing::warn!("push to {} failed: {}", subscription.endpoint, e);
                false
            }
            Err(_) => {
                tracing::warn!("push to {} timed out", subscription.endpoint);
                false
            }
        }
    }

    async fn send_raw(
        &self,
        subscription: &PushSubscription,
        body: &[u8],
    ) -> Result<(), WebPushError> {
        let info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.keys.p256dh,
            &subscription.keys.auth,
        );

        let mut signature =
            VapidSignatureBuilder::from_pem(Cursor::new(self.vapid_private_key.as_bytes()), &info)?;
        signature.add_claim("sub", self.vapid_subject.clone());

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, body);
        builder.set_vapid_signature(signature.build()?);

        let client = HyperWebPushClient::new();
        client.send(builder.build()?).await
    }
}

/// `$51,000` / `$0.52` style formatting, matching what users see in the
/// notification body.
pub fn format_usd(value: f64) -> String {
    let whole = value.trunc() as i64;
    let mut digits = whole.abs().to_string();

    let mut grouped = String::new();
    while digits.len() > 3 {
        let tail = digits.split_off(digits.len() - 3);
        grouped = if grouped.is_empty() {
            tail
        } else {
            format!("{tail},{grouped}")
        };
    }
    grouped = if grouped.is_empty() {
        digits
    } else {
        format!("{digits},{grouped}")
    };

    let fract = (value.abs().fract() * 100.0).round() as u64;
    if fract == 0 || fract >= 100 {
        format!("${grouped}")
    } else {
        format!("${grouped}.{fract:02}")
    }
}
