use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::config::StoreConfig;
use crate::display::BundleProcessor;
use crate::store::NotificationStore;

/// Background task removing processed notifications past their retention.
///
/// When a tray is attached, displayed notifications older than the same
/// retention are dropped from it too.
pub struct StoreCleanupTask {
    config: StoreConfig,
    store: Arc<dyn NotificationStore>,
    tray: Option<Arc<BundleProcessor>>,
    shutdown: broadcast::Receiver<()>,
}

impl StoreCleanupTask {
    pub fn new(
        config: StoreConfig,
        store: Arc<dyn NotificationStore>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            config,
            store,
            tray: None,
            shutdown,
        }
    }

    /// Also prune the displayed notifications of `tray`
    pub fn with_tray(mut self, tray: Arc<BundleProcessor>) -> Self {
        self.tray = Some(tray);
        self
    }

    /// Run until the shutdown signal fires
    pub async fn run(mut self) {
        let cleanup_interval = Duration::from_secs(self.config.cleanup_interval_seconds.max(1));
        let mut cleanup_timer = tokio::time::interval(cleanup_interval);

        // Skip immediate first tick
        cleanup_timer.tick().await;

        tracing::info!(
            cleanup_interval_secs = self.config.cleanup_interval_seconds,
            retention_secs = self.config.retention_seconds,
            "Store cleanup task started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Store cleanup task received shutdown signal");
                    break;
                }
                _ = cleanup_timer.tick() => {
                    self.cleanup();
                }
            }
        }

        tracing::info!("Store cleanup task stopped");
    }

    fn cleanup(&self) {
        let removed = self.store.cleanup_expired();
        let stats = self.store.stats();
        let pruned = self
            .tray
            .as_ref()
            .map_or(0, |tray| tray.cleanup_expired(self.config.retention_seconds));

        tracing::debug!(
            removed = removed,
            remaining = stats.entries,
            tray_pruned = pruned,
            "Store cleanup completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::NotificationRenderer;
    use crate::store::MemoryNotificationStore;
    use serde_json::json;

    fn config(cleanup_interval_seconds: u64) -> StoreConfig {
        StoreConfig {
            backend: "memory".to_string(),
            retention_seconds: 0,
            cleanup_interval_seconds,
        }
    }

    #[tokio::test]
    async fn test_task_stops_on_shutdown() {
        let store: Arc<dyn NotificationStore> = Arc::new(MemoryNotificationStore::new(0));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(StoreCleanupTask::new(config(3600), store, shutdown_rx).run());
        shutdown_tx.send(()).unwrap();

        let joined = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("task did not stop");
        tokio_test::assert_ok!(joined);
    }

    #[tokio::test]
    async fn test_task_removes_expired_entries() {
        let store = Arc::new(MemoryNotificationStore::new(0));
        let payload = json!({ "custom": "{\"i\":\"old\"}" }).as_object().cloned().unwrap();
        store.save_notification(&payload, false, 1);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(StoreCleanupTask::new(config(1), store.clone(), shutdown_rx).run());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(store.is_empty());

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_task_prunes_attached_tray() {
        let store = Arc::new(MemoryNotificationStore::new(0));
        let tray = Arc::new(BundleProcessor::new(store.clone()));
        let payload = json!({ "custom": "{\"i\":\"shown\"}" }).as_object().cloned().unwrap();
        for _ in 0..20 {
            tray.process(false, &payload, None);
        }
        assert_eq!(tray.displayed_count(), 20);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = StoreCleanupTask::new(config(1), store.clone(), shutdown_rx).with_tray(tray.clone());
        let handle = tokio::spawn(task.run());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(tray.displayed_count(), 0);
        assert!(store.is_empty());

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
