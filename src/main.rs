use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::{JoinError, JoinSet};

use push_extender::config::Settings;
use push_extender::display::BundleProcessor;
use push_extender::metrics::encode_metrics;
use push_extender::notification::{DeliveryEnvelope, NotificationExtenderService, Resolution};
use push_extender::store::create_notification_store;
use push_extender::tasks::StoreCleanupTask;
use push_extender::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_telemetry(&settings.log)?;
    tracing::info!("Configuration loaded");

    let store = create_notification_store(&settings.store);
    let renderer = Arc::new(BundleProcessor::new(store.clone()));
    let service = Arc::new(NotificationExtenderService::new(store.clone(), renderer.clone()));

    // Start store and tray cleanup in background
    let (shutdown_tx, _) = broadcast::channel(1);
    let cleanup_task = StoreCleanupTask::new(settings.store.clone(), store.clone(), shutdown_tx.subscribe())
        .with_tray(renderer);
    let cleanup_handle = tokio::spawn(cleanup_task.run());

    let concurrency = settings.worker.concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));
    let mut workers = JoinSet::new();
    let mut resolutions: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    tracing::info!(concurrency = concurrency, "Reading delivery envelopes from stdin");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, stopping intake");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let envelope: DeliveryEnvelope = match serde_json::from_str(&line) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable envelope line");
                continue;
            }
        };

        let permit = permits.clone().acquire_owned().await?;
        let service = service.clone();
        // The processor is synchronous, keep it off the async workers
        workers.spawn_blocking(move || {
            let _permit = permit;
            service.handle(&envelope)
        });

        drain_finished(&mut workers, &mut resolutions);
    }

    while let Some(joined) = workers.join_next().await {
        tally(&mut resolutions, joined);
    }

    let _ = shutdown_tx.send(());
    let _ = cleanup_handle.await;

    tracing::info!(
        resolutions = ?resolutions,
        store = ?store.stats(),
        "All envelopes processed"
    );
    match encode_metrics() {
        Ok(metrics) => tracing::debug!(metrics = %metrics, "Final metrics"),
        Err(e) => tracing::warn!(error = %e, "Failed to encode metrics"),
    }

    Ok(())
}

/// Collect results of workers that already finished, without waiting
fn drain_finished(workers: &mut JoinSet<Resolution>, resolutions: &mut BTreeMap<&'static str, usize>) -> usize {
    let mut drained = 0;
    while let Some(joined) = workers.try_join_next() {
        tally(resolutions, joined);
        drained += 1;
    }
    drained
}

fn tally(resolutions: &mut BTreeMap<&'static str, usize>, joined: Result<Resolution, JoinError>) {
    match joined {
        Ok(resolution) => *resolutions.entry(resolution.as_str()).or_default() += 1,
        Err(e) => tracing::error!(error = %e, "Envelope worker failed"),
    }
}
