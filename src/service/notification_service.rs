// service/notification_service.rs
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::json;
use sha2::Sha256;

use crate::{
    config::{Config, PusherConfig},
    db::{db::DBClient, notificationdb::NotificationExt, userdb::UserExt},
    models::notificationmodel::Notification,
    service::error::ServiceError,
};

type HmacSha256 = Hmac<Sha256>;

pub const PUSHER_EVENT: &str = "NewNotification";
pub const RELAY_EVENT: &str = "localNotification";

/// Which transport, if any, accepted the notification.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Pusher,
    Relay,
    Undelivered,
}

#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn publish(&self, notification: &Notification) -> Result<(), ServiceError>;
}

/// Last known reachability of the push provider, written by the probe job.
#[derive(Debug, Default)]
pub struct ProviderHealth {
    reachable: AtomicBool,
}

impl ProviderHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::Relaxed)
    }

    /// Store the probe result and return the previous value.
    pub fn set_reachable(&self, reachable: bool) -> bool {
        self.reachable.swap(reachable, Ordering::Relaxed)
    }
}

pub struct PusherTransport {
    client: reqwest::Client,
    config: PusherConfig,
    base_url: String,
}

impl PusherTransport {
    pub fn new(config: PusherConfig) -> Self {
        let base_url = format!("https://api-{}.pusher.com", config.cluster);
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            config,
            base_url,
        }
    }

    fn events_path(&self) -> String {
        format!("/apps/{}/events", self.config.app_id)
    }

    /// Query string carrying the auth parameters and the HMAC-SHA256 signature.
    pub fn signed_query(&self, body: &str, timestamp: i64) -> Result<String, ServiceError> {
        let mut params = BTreeMap::new();
        params.insert("auth_key", self.config.key.clone());
        params.insert("auth_timestamp", timestamp.to_string());
        params.insert("auth_version", "1.0".to_string());
        params.insert("body_md5", format!("{:x}", md5::compute(body.as_bytes())));

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let to_sign = format!("POST\n{}\n{}", self.events_path(), query);

        let mut mac = HmacSha256::new_from_slice(self.config.secret.as_bytes())
            .map_err(|e| ServiceError::Transport(format!("Invalid Pusher secret: {}", e)))?;
        mac.update(to_sign.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{}&auth_signature={}", query, signature))
    }

    pub fn event_body(notification: &Notification) -> Result<String, ServiceError> {
        let data = serde_json::to_string(notification)
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        serde_json::to_string(&json!({
            "name": PUSHER_EVENT,
            "channels": [format!("notifications.{}", notification.receiver_id)],
            "data": data,
        }))
        .map_err(|e| ServiceError::Transport(e.to_string()))
    }
}

#[async_trait]
impl RealtimeTransport for PusherTransport {
    fn name(&self) -> &'static str {
        "pusher"
    }

    async fn publish(&self, notification: &Notification) -> Result<(), ServiceError> {
        let body = Self::event_body(notification)?;
        let query = self.signed_query(&body, Utc::now().timestamp())?;
        let url = format!("{}{}?{}", self.base_url, self.events_path(), query);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(format!("Pusher request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Transport(format!("Pusher returned {}: {}", status, text)));
        }

        Ok(())
    }
}

/// Local socket relay used when the provider cannot take the event.
pub struct RelayTransport {
    client: reqwest::Client,
    url: String,
}

impl RelayTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }

    pub fn payload(notification: &Notification) -> serde_json::Value {
        json!({
            "event": RELAY_EVENT,
            "room": format!("user_{}", notification.receiver_id),
            "data": notification,
        })
    }
}

#[async_trait]
impl RealtimeTransport for RelayTransport {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn publish(&self, notification: &Notification) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(&self.url)
            .json(&Self::payload(notification))
            .send()
            .await
            .map_err(|e| ServiceError::Transport(format!("Relay request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::Transport(format!(
                "Relay returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Picks the provider or the relay for each notification. Never retries.
#[derive(Clone)]
pub struct Dispatcher {
    primary: Option<Arc<dyn RealtimeTransport>>,
    fallback: Arc<dyn RealtimeTransport>,
    health: Arc<ProviderHealth>,
}

impl Dispatcher {
    pub fn new(
        primary: Option<Arc<dyn RealtimeTransport>>,
        fallback: Arc<dyn RealtimeTransport>,
        health: Arc<ProviderHealth>,
    ) -> Self {
        Self { primary, fallback, health }
    }

    pub fn from_config(config: &Config, health: Arc<ProviderHealth>) -> Self {
        let primary: Option<Arc<dyn RealtimeTransport>> = if config.pusher.is_complete() {
            Some(Arc::new(PusherTransport::new(config.pusher.clone())))
        } else {
            tracing::warn!("Pusher credentials incomplete, notifications go through the relay");
            None
        };

        Self::new(
            primary,
            Arc::new(RelayTransport::new(config.realtime_relay_url.clone())),
            health,
        )
    }

    pub async fn dispatch(&self, notification: &Notification) -> DeliveryOutcome {
        match &self.primary {
            Some(primary) if self.health.is_reachable() => {
                match primary.publish(notification).await {
                    Ok(()) => return DeliveryOutcome::Pusher,
                    Err(e) => tracing::error!(
                        "Failed to publish notification {} through {}: {}",
                        notification.id,
                        primary.name(),
                        e
                    ),
                }
            }
            Some(_) => tracing::warn!("Push provider unreachable, using relay for notification {}", notification.id),
            None => {}
        }

        match self.fallback.publish(notification).await {
            Ok(()) => DeliveryOutcome::Relay,
            Err(e) => {
                tracing::error!(
                    "Failed to deliver notification {} through {}: {}",
                    notification.id,
                    self.fallback.name(),
                    e
                );
                DeliveryOutcome::Undelivered
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("primary", &self.primary.as_ref().map(|p| p.name()))
            .field("fallback", &self.fallback.name())
            .field("health", &self.health.is_reachable())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
    dispatcher: Dispatcher,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>, dispatcher: Dispatcher) -> Self {
        Self { db_client, dispatcher }
    }

    /// Persist a notification, then push it. The row is kept whatever the delivery outcome.
    pub async fn send(
        &self,
        sender_id: i64,
        receiver_id: i64,
        notification_type: &str,
        message: &str,
    ) -> Result<(Notification, DeliveryOutcome), ServiceError> {
        self.db_client
            .get_user(Some(receiver_id), None)
            .await?
            .ok_or(ServiceError::UserNotFound(receiver_id))?;

        let notification = self
            .db_client
            .create_notification(sender_id, receiver_id, notification_type, message)
            .await?;

        let outcome = self.dispatcher.dispatch(&notification).await;

        tracing::info!(
            "Notification {} from {} to {} delivered via {:?}",
            notification.id,
            sender_id,
            receiver_id,
            outcome
        );

        Ok((notification, outcome))
    }

    /// Fire-and-forget variant for domain events. Failures are only logged.
    pub async fn notify(&self, sender_id: i64, receiver_id: i64, notification_type: &str, message: &str) {
        if let Err(e) = self.send(sender_id, receiver_id, notification_type, message).await {
            tracing::error!(
                "Failed to store {} notification for user {}: {}",
                notification_type,
                receiver_id,
                e
            );
        }
    }

    pub async fn list_for(&self, receiver_id: i64) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.db_client.get_notifications_for_receiver(receiver_id).await?)
    }

    /// Set the read flag. Only the receiver may change it. Repeating is a no-op.
    pub async fn set_read(
        &self,
        user_id: i64,
        notification_id: i64,
        read: bool,
    ) -> Result<Notification, ServiceError> {
        let current = self.db_client.get_notification(notification_id).await?;

        match read_change(current, user_id, notification_id, read)? {
            ReadChange::Unchanged(notification) => Ok(notification),
            ReadChange::Update => self
                .db_client
                .set_read_status(notification_id, read)
                .await?
                .ok_or(ServiceError::NotificationNotFound(notification_id)),
        }
    }
}

#[derive(Debug)]
pub enum ReadChange {
    Unchanged(Notification),
    Update,
}

/// Decide what a read toggle on `current` has to do for `user_id`.
pub fn read_change(
    current: Option<Notification>,
    user_id: i64,
    notification_id: i64,
    read: bool,
) -> Result<ReadChange, ServiceError> {
    let notification = current.ok_or(ServiceError::NotificationNotFound(notification_id))?;

    if notification.receiver_id != user_id {
        return Err(ServiceError::NotNotificationReceiver(user_id, notification_id));
    }

    if notification.read_status == read {
        return Ok(ReadChange::Unchanged(notification));
    }

    Ok(ReadChange::Update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeTransport {
        name: &'static str,
        fail: bool,
        sent: Mutex<Vec<i64>>,
    }

    impl FakeTransport {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self { name, fail, sent: Mutex::new(Vec::new()) })
        }

        fn sent(&self) -> Vec<i64> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RealtimeTransport for FakeTransport {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn publish(&self, notification: &Notification) -> Result<(), ServiceError> {
            self.sent.lock().unwrap().push(notification.id);
            if self.fail {
                Err(ServiceError::Transport("down".into()))
            } else {
                Ok(())
            }
        }
    }

    fn notification() -> Notification {
        Notification {
            id: 11,
            sender_id: 1,
            receiver_id: 7,
            notification_type: "payment".into(),
            message: "Rent received".into(),
            sent_date: Utc::now(),
            read_status: false,
        }
    }

    fn health(reachable: bool) -> Arc<ProviderHealth> {
        let health = Arc::new(ProviderHealth::new());
        health.set_reachable(reachable);
        health
    }

    #[tokio::test]
    async fn uses_provider_when_reachable() {
        let pusher = FakeTransport::new("pusher", false);
        let relay = FakeTransport::new("relay", false);
        let dispatcher = Dispatcher::new(Some(pusher.clone() as Arc<dyn RealtimeTransport>), relay.clone(), health(true));

        assert_eq!(dispatcher.dispatch(&notification()).await, DeliveryOutcome::Pusher);
        assert_eq!(pusher.sent(), vec![11]);
        assert!(relay.sent().is_empty());
    }

    #[tokio::test]
    async fn falls_back_when_provider_fails() {
        let pusher = FakeTransport::new("pusher", true);
        let relay = FakeTransport::new("relay", false);
        let dispatcher = Dispatcher::new(Some(pusher.clone() as Arc<dyn RealtimeTransport>), relay.clone(), health(true));

        assert_eq!(dispatcher.dispatch(&notification()).await, DeliveryOutcome::Relay);
        assert_eq!(pusher.sent(), vec![11]);
        assert_eq!(relay.sent(), vec![11]);
    }

    #[tokio::test]
    async fn skips_provider_when_unreachable_or_unconfigured() {
        let pusher = FakeTransport::new("pusher", false);
        let relay = FakeTransport::new("relay", false);

        let unreachable = Dispatcher::new(Some(pusher.clone() as Arc<dyn RealtimeTransport>), relay.clone(), health(false));
        assert_eq!(unreachable.dispatch(&notification()).await, DeliveryOutcome::Relay);
        assert!(pusher.sent().is_empty());

        let unconfigured = Dispatcher::new(None, relay.clone(), health(true));
        assert_eq!(unconfigured.dispatch(&notification()).await, DeliveryOutcome::Relay);
        assert_eq!(relay.sent(), vec![11, 11]);
    }

    #[tokio::test]
    async fn both_failing_is_undelivered() {
        let pusher = FakeTransport::new("pusher", true);
        let relay = FakeTransport::new("relay", true);
        let dispatcher = Dispatcher::new(Some(pusher as Arc<dyn RealtimeTransport>), relay, health(true));

        assert_eq!(dispatcher.dispatch(&notification()).await, DeliveryOutcome::Undelivered);
    }

    #[test]
    fn health_starts_unreachable() {
        let health = ProviderHealth::new();
        assert!(!health.is_reachable());
        assert!(!health.set_reachable(true));
        assert!(health.is_reachable());
    }

    #[test]
    fn signs_requests_like_pusher_reference() {
        let transport = PusherTransport::new(PusherConfig {
            app_id: "3".into(),
            key: "278d425bdf160c739803".into(),
            secret: "7ad3773142a6692b25b8".into(),
            cluster: "mt1".into(),
        });
        let body = r#"{"name":"foo","channels":["project-3"],"data":"{\"some\":\"data\"}"}"#;

        let query = transport.signed_query(body, 1353088179).unwrap();

        assert_eq!(
            query,
            "auth_key=278d425bdf160c739803&auth_timestamp=1353088179&auth_version=1.0\
             &body_md5=ec365a775a4cd0599faeb73354201b6f\
             &auth_signature=da454824c97ba181a32ccc17a72625ba02771f50b50e1e7430e47a1f3f457e6c"
        );
    }

    #[test]
    fn event_targets_receiver_channel() {
        let body: serde_json::Value =
            serde_json::from_str(&PusherTransport::event_body(&notification()).unwrap()).unwrap();

        assert_eq!(body["name"], "NewNotification");
        assert_eq!(body["channels"][0], "notifications.7");

        let data: Notification = serde_json::from_str(body["data"].as_str().unwrap()).unwrap();
        assert_eq!(data.id, 11);
        assert_eq!(data.receiver_id, 7);
    }

    #[test]
    fn relay_payload_uses_user_room() {
        let payload = RelayTransport::payload(&notification());
        assert_eq!(payload["event"], "localNotification");
        assert_eq!(payload["room"], "user_7");
        assert_eq!(payload["data"]["message"], "Rent received");
    }

    #[test]
    fn marking_read_twice_needs_one_write() {
        let mut stored = notification();
        assert!(matches!(read_change(Some(stored.clone()), 7, 11, true), Ok(ReadChange::Update)));

        stored.read_status = true;
        match read_change(Some(stored), 7, 11, true) {
            Ok(ReadChange::Unchanged(n)) => assert!(n.read_status),
            other => panic!("expected no change, got {:?}", other),
        }
    }

    #[test]
    fn only_the_receiver_toggles_read() {
        let err = read_change(Some(notification()), 1, 11, true).unwrap_err();
        assert!(matches!(err, ServiceError::NotNotificationReceiver(1, 11)));
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_notification_is_not_found() {
        let err = read_change(None, 7, 99, false).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
