//! Notification display.
//!
//! `NotificationRenderer` is the seam to the platform's notification
//! subsystem. `BundleProcessor` is the default renderer: it persists the
//! payload, picks a slot and keeps the displayed notifications in a tray.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;

use crate::notification::{JsonObject, OverrideSettings};
use crate::store::{payload_notification_id, NotificationStore};

/// Displays (or persists) a payload with platform default styling.
pub trait NotificationRenderer: Send + Sync {
    /// Display the payload, returning the slot it was displayed into.
    ///
    /// `overrides` is already merged with the invocation's base settings.
    fn process(&self, restoring: bool, payload: &JsonObject, overrides: Option<&OverrideSettings>) -> i32;
}

/// A notification currently shown in a slot
#[derive(Debug, Clone, Serialize)]
pub struct DisplayedNotification {
    pub android_notification_id: i32,
    pub notification_id: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub extender: Option<Value>,
    pub restoring: bool,
    pub displayed_at: DateTime<Utc>,
}

/// Default renderer backed by a notification store.
pub struct BundleProcessor {
    store: Arc<dyn NotificationStore>,
    /// android_notification_id -> shown notification; a slot holds one notification
    tray: DashMap<i32, DisplayedNotification>,
}

impl BundleProcessor {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self {
            store,
            tray: DashMap::new(),
        }
    }

    /// Notification currently shown in a slot
    pub fn displayed(&self, android_notification_id: i32) -> Option<DisplayedNotification> {
        self.tray.get(&android_notification_id).map(|r| r.value().clone())
    }

    /// Number of occupied slots
    pub fn displayed_count(&self) -> usize {
        self.tray.len()
    }

    /// Drop tray entries displayed more than `retention_seconds` ago
    pub fn cleanup_expired(&self, retention_seconds: u64) -> usize {
        let before = self.tray.len();
        let now = Utc::now();

        self.tray.retain(|_, displayed| {
            let age = now.signed_duration_since(displayed.displayed_at).num_seconds();
            age < 0 || (age as u64) < retention_seconds
        });

        before.saturating_sub(self.tray.len())
    }
}

impl NotificationRenderer for BundleProcessor {
    fn process(&self, restoring: bool, payload: &JsonObject, overrides: Option<&OverrideSettings>) -> i32 {
        let android_notification_id = overrides
            .and_then(|o| o.android_notification_id)
            .unwrap_or_else(|| rand::random_range(0..=i32::MAX));

        // Restored payloads are already in the store
        if !restoring {
            self.store.save_notification(payload, false, android_notification_id);
        }

        let displayed = DisplayedNotification {
            android_notification_id,
            notification_id: payload_notification_id(payload),
            title: text(payload, "title"),
            message: text(payload, "alert"),
            extender: overrides.and_then(|o| o.extender.clone()),
            restoring,
            displayed_at: Utc::now(),
        };

        tracing::info!(
            android_notification_id = android_notification_id,
            notification_id = ?displayed.notification_id,
            restoring = restoring,
            extended = displayed.extender.is_some(),
            "Displaying notification"
        );

        self.tray.insert(android_notification_id, displayed);
        android_notification_id
    }
}

fn text(payload: &JsonObject, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}
