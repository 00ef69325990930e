//! Processed-notification storage.
//!
//! The store answers whether an incoming payload was already handled and
//! records payloads once they are displayed or consumed by the developer.
//!
//! - `MemoryNotificationStore`: In-memory storage using DashMap (default)
//!
//! Use `create_notification_store()` to create the backend named in configuration.

mod memory_backend;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::StoreConfig;
use crate::notification::JsonObject;

pub use memory_backend::MemoryNotificationStore;

/// A notification the store has seen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedNotification {
    pub notification_id: String,
    /// Slot the notification was displayed into, `-1` when nothing was shown
    pub android_notification_id: i32,
    /// Whether the developer consumed the message without a display
    pub handled_by_developer: bool,
    pub saved_at: DateTime<Utc>,
}

impl ProcessedNotification {
    pub fn new(notification_id: String, android_notification_id: i32, handled_by_developer: bool) -> Self {
        Self {
            notification_id,
            android_notification_id,
            handled_by_developer,
            saved_at: Utc::now(),
        }
    }

    /// Check if this entry is older than the retention window
    pub fn is_expired(&self, retention_seconds: u64) -> bool {
        let elapsed = Utc::now().signed_duration_since(self.saved_at);
        elapsed.num_seconds() >= retention_seconds as i64
    }
}

/// Statistics snapshot for a notification store
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    /// Backend type identifier
    pub backend_type: String,
    /// Entries currently held
    pub entries: u64,
    /// Total saves, including repeated saves of a known id
    pub total_saved: u64,
    /// Total lookups that found a duplicate or an invalid payload
    pub total_rejected: u64,
    /// Total entries removed by retention cleanup
    pub total_expired: u64,
}

/// Duplicate detection and persistence of processed notifications.
///
/// Implementations are shared across concurrently handled envelopes and must
/// treat repeated saves of the same id as idempotent.
pub trait NotificationStore: Send + Sync {
    /// True when the payload has no notification id or its id is already known.
    fn is_invalid_or_duplicate(&self, payload: &JsonObject) -> bool;

    /// Record a payload as processed.
    fn save_notification(&self, payload: &JsonObject, handled_by_developer: bool, android_notification_id: i32);

    /// Look up a processed notification by id.
    fn get(&self, notification_id: &str) -> Option<ProcessedNotification>;

    /// Remove entries older than the retention window.
    ///
    /// # Returns
    ///
    /// The number of entries removed.
    fn cleanup_expired(&self) -> usize;

    /// Get store statistics.
    fn stats(&self) -> StoreStats;
}

/// Read the notification id (`custom.i`) straight from a raw payload.
///
/// Returns `None` when the custom data is missing, malformed or has an empty id.
pub fn payload_notification_id(payload: &JsonObject) -> Option<String> {
    let custom = match payload.get("custom")? {
        Value::String(encoded) => serde_json::from_str::<JsonObject>(encoded).ok()?,
        Value::Object(object) => object.clone(),
        _ => return None,
    };

    match custom.get("i")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        _ => None,
    }
}

/// Create a notification store based on configuration.
///
/// - `"memory"` (default): Returns a `MemoryNotificationStore`
///
/// Unknown backend names fall back to memory with a warning.
pub fn create_notification_store(settings: &StoreConfig) -> Arc<dyn NotificationStore> {
    match settings.backend.as_str() {
        "memory" => {
            tracing::info!(
                backend = "memory",
                retention_seconds = settings.retention_seconds,
                "Creating memory notification store"
            );
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown notification store backend, falling back to memory"
            );
        }
    }

    Arc::new(MemoryNotificationStore::new(settings.retention_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_notification_id() {
        let payload = json!({ "custom": "{\"i\":\"abc\"}" });
        assert_eq!(
            payload_notification_id(payload.as_object().unwrap()),
            Some("abc".to_string())
        );

        let inline = json!({ "custom": { "i": "inline" } });
        assert_eq!(
            payload_notification_id(inline.as_object().unwrap()),
            Some("inline".to_string())
        );
    }

    #[test]
    fn test_payload_notification_id_missing() {
        for payload in [
            json!({}),
            json!({ "custom": "{}" }),
            json!({ "custom": "{\"i\":\"\"}" }),
            json!({ "custom": "not json" }),
            json!({ "custom": 42 }),
        ] {
            assert_eq!(payload_notification_id(payload.as_object().unwrap()), None);
        }
    }

    #[test]
    fn test_processed_notification_expiry() {
        let entry = ProcessedNotification::new("abc".to_string(), 3, false);

        assert!(!entry.is_expired(30));
        assert!(entry.is_expired(0));
    }

    #[test]
    fn test_factory_falls_back_to_memory() {
        let config = StoreConfig {
            backend: "sqlite".to_string(),
            retention_seconds: 60,
            cleanup_interval_seconds: 60,
        };

        let store = create_notification_store(&config);
        assert_eq!(store.stats().backend_type, "memory");
    }
}
