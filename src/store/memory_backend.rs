//! In-memory notification store using DashMap.
//!
//! Processed notifications are held in memory and will be lost on restart.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::metrics::StoreMetrics;
use crate::notification::JsonObject;

use super::{payload_notification_id, NotificationStore, ProcessedNotification, StoreStats};

/// Statistics for the store (atomic counters for thread safety).
#[derive(Debug, Default)]
struct Stats {
    total_saved: AtomicU64,
    total_rejected: AtomicU64,
    total_expired: AtomicU64,
}

/// In-memory notification store.
///
/// Uses `DashMap` for concurrent access from parallel invocations.
pub struct MemoryNotificationStore {
    retention_seconds: u64,
    /// notification_id -> ProcessedNotification
    entries: DashMap<String, ProcessedNotification>,
    stats: Stats,
}

impl MemoryNotificationStore {
    pub fn new(retention_seconds: u64) -> Self {
        Self {
            retention_seconds,
            entries: DashMap::new(),
            stats: Stats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NotificationStore for MemoryNotificationStore {
    fn is_invalid_or_duplicate(&self, payload: &JsonObject) -> bool {
        let Some(notification_id) = payload_notification_id(payload) else {
            self.stats.total_rejected.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Payload has no notification id");
            return true;
        };

        if self.entries.contains_key(&notification_id) {
            self.stats.total_rejected.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                notification_id = %notification_id,
                "Duplicate notification"
            );
            return true;
        }

        false
    }

    fn save_notification(&self, payload: &JsonObject, handled_by_developer: bool, android_notification_id: i32) {
        let Some(notification_id) = payload_notification_id(payload) else {
            tracing::warn!("Not saving notification without an id");
            return;
        };

        // First save wins; concurrent saves of the same id leave one entry
        self.entries
            .entry(notification_id.clone())
            .or_insert_with(|| {
                ProcessedNotification::new(notification_id.clone(), android_notification_id, handled_by_developer)
            });
        self.stats.total_saved.fetch_add(1, Ordering::Relaxed);
        StoreMetrics::set_entries(self.entries.len());

        tracing::trace!(
            notification_id = %notification_id,
            android_notification_id = android_notification_id,
            handled_by_developer = handled_by_developer,
            "Saved notification"
        );
    }

    fn get(&self, notification_id: &str) -> Option<ProcessedNotification> {
        self.entries.get(notification_id).map(|r| r.value().clone())
    }

    fn cleanup_expired(&self) -> usize {
        let retention = self.retention_seconds;
        let mut expired_count = 0;

        self.entries.retain(|_, entry| {
            if entry.is_expired(retention) {
                expired_count += 1;
                false
            } else {
                true
            }
        });

        if expired_count > 0 {
            self.stats
                .total_expired
                .fetch_add(expired_count as u64, Ordering::Relaxed);
            StoreMetrics::record_expired(expired_count);
            StoreMetrics::set_entries(self.entries.len());
            tracing::debug!(expired_count = expired_count, "Removed expired notifications");
        }

        expired_count
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            backend_type: "memory".to_string(),
            entries: self.entries.len() as u64,
            total_saved: self.stats.total_saved.load(Ordering::Relaxed),
            total_rejected: self.stats.total_rejected.load(Ordering::Relaxed),
            total_expired: self.stats.total_expired.load(Ordering::Relaxed),
        }
    }
}
