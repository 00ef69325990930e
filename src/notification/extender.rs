use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;

use crate::display::NotificationRenderer;
use crate::metrics::{EnvelopeMetrics, HookMetrics};
use crate::store::NotificationStore;

use super::envelope::DeliveryEnvelope;
use super::gate::{DecisionGate, DisplayResult};
use super::overrides::OverrideSettings;
use super::parser::parse_notification;
use super::types::{JsonObject, Notification};

/// Slot recorded for notifications the developer consumed without a display
const NOT_DISPLAYED_SLOT: i32 = -1;

/// Developer hook deciding how an incoming notification is displayed.
///
/// Called once per notification. The hook may display the notification with
/// its own overrides through `gate`. When it does not, returning `true`
/// consumes the notification silently and returning `false` (or failing)
/// falls back to the default display.
pub trait NotificationProcessor: Send + Sync {
    fn on_notification_processing(
        &self,
        notification: &Notification,
        gate: &mut DecisionGate<'_>,
    ) -> anyhow::Result<bool>;
}

/// Processor that never intervenes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProcessor;

impl NotificationProcessor for NoopProcessor {
    fn on_notification_processing(&self, _: &Notification, _: &mut DecisionGate<'_>) -> anyhow::Result<bool> {
        Ok(false)
    }
}

impl<F> NotificationProcessor for F
where
    F: Fn(&Notification, &mut DecisionGate<'_>) -> anyhow::Result<bool> + Send + Sync,
{
    fn on_notification_processing(
        &self,
        notification: &Notification,
        gate: &mut DecisionGate<'_>,
    ) -> anyhow::Result<bool> {
        self(notification, gate)
    }
}

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// Invalid or already processed, nothing was done
    Duplicate,
    /// The envelope payload could not be decoded
    Malformed,
    /// The processor displayed the notification with its overrides
    Extended(DisplayResult),
    /// The processor consumed the notification; it was recorded as processed
    MarkedProcessed,
    /// The processor consumed a replayed notification; nothing was recorded
    HandledWhileRestoring,
    /// The default notification was displayed
    DefaultDisplayed { android_notification_id: i32 },
    /// The processor requested a display but the renderer failed; no second display is attempted
    DisplayInterrupted,
}

/// What running the processor amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessorOutcome {
    Returned { handled: bool },
    Failed { displayed: bool },
}

impl ProcessorOutcome {
    fn handled(self) -> bool {
        matches!(self, ProcessorOutcome::Returned { handled: true })
    }
}

impl Resolution {
    /// Label used for metrics and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Duplicate => "duplicate",
            Resolution::Malformed => "malformed",
            Resolution::Extended(_) => "extended",
            Resolution::MarkedProcessed => "marked_processed",
            Resolution::HandledWhileRestoring => "handled_while_restoring",
            Resolution::DefaultDisplayed { .. } => "default_displayed",
            Resolution::DisplayInterrupted => "display_interrupted",
        }
    }

    /// Slot of the displayed notification, if one was displayed
    pub fn android_notification_id(&self) -> Option<i32> {
        match self {
            Resolution::Extended(result) => Some(result.android_notification_id),
            Resolution::DefaultDisplayed {
                android_notification_id,
            } => Some(*android_notification_id),
            _ => None,
        }
    }
}

/// Turns delivery envelopes into displayed or recorded notifications.
///
/// Holds no per-message state; every call works on its own payload and
/// decision gate, so one service can handle envelopes from many threads.
pub struct NotificationExtenderService {
    store: Arc<dyn NotificationStore>,
    renderer: Arc<dyn NotificationRenderer>,
    processor: Arc<dyn NotificationProcessor>,
}

impl NotificationExtenderService {
    /// Create a service that always falls back to the default display
    pub fn new(store: Arc<dyn NotificationStore>, renderer: Arc<dyn NotificationRenderer>) -> Self {
        Self::with_processor(store, renderer, Arc::new(NoopProcessor))
    }

    /// Create a service with a developer supplied processor
    pub fn with_processor(
        store: Arc<dyn NotificationStore>,
        renderer: Arc<dyn NotificationRenderer>,
        processor: Arc<dyn NotificationProcessor>,
    ) -> Self {
        Self {
            store,
            renderer,
            processor,
        }
    }

    /// Handle one delivery envelope end to end.
    #[tracing::instrument(
        name = "extender.handle",
        skip(self, envelope),
        fields(restoring = envelope.restoring)
    )]
    pub fn handle(&self, envelope: &DeliveryEnvelope) -> Resolution {
        EnvelopeMetrics::record_received();

        let payload = match envelope.decode_payload() {
            Ok(payload) => payload,
            Err(e) => {
                EnvelopeMetrics::record_malformed();
                tracing::error!(error = %e, "Failed to decode notification payload");
                return record(Resolution::Malformed);
            }
        };

        if !envelope.restoring && self.store.is_invalid_or_duplicate(&payload) {
            EnvelopeMetrics::record_duplicate();
            return record(Resolution::Duplicate);
        }

        let base = envelope.base_override_settings();
        self.process_payload(&payload, envelope.restoring, base.as_ref())
    }

    /// Parse a decoded payload, run the processor and resolve the outcome.
    #[tracing::instrument(name = "extender.process_payload", skip(self, payload, base))]
    pub fn process_payload(
        &self,
        payload: &JsonObject,
        restoring: bool,
        base: Option<&OverrideSettings>,
    ) -> Resolution {
        let notification = parse_notification(payload, restoring);

        let mut gate = DecisionGate::new(payload, restoring, base, self.renderer.as_ref());
        let developer_processed = self.run_processor(&notification, &mut gate).handled();

        // A requested display decides the outcome, whatever the processor returned
        let resolution = match gate.accepted() {
            Some(result) => Resolution::Extended(result),
            None if gate.is_decided() => Resolution::DisplayInterrupted,
            None if developer_processed => {
                if restoring {
                    Resolution::HandledWhileRestoring
                } else {
                    // Recorded so a re-delivery under another id is not shown again
                    self.store.save_notification(payload, true, NOT_DISPLAYED_SLOT);
                    Resolution::MarkedProcessed
                }
            }
            None => Resolution::DefaultDisplayed {
                android_notification_id: self.renderer.process(restoring, payload, base),
            },
        };

        tracing::debug!(
            notification_id = %notification.notification_id,
            resolution = resolution.as_str(),
            "Notification processed"
        );
        record(resolution)
    }

    /// Run the processor, treating an error or panic as "not handled".
    fn run_processor(&self, notification: &Notification, gate: &mut DecisionGate<'_>) -> ProcessorOutcome {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.processor.on_notification_processing(notification, gate)
        }));

        let error = match outcome {
            Ok(Ok(handled)) => return ProcessorOutcome::Returned { handled },
            Ok(Err(e)) => format!("{:#}", e),
            Err(panic) => panic_message(panic.as_ref()),
        };

        let displayed = gate.is_decided();
        HookMetrics::record_failure(displayed);
        if displayed {
            tracing::error!(
                notification_id = %notification.notification_id,
                error = %error,
                "Notification processor failed. Extended notification displayed but custom processing did not finish"
            );
        } else {
            tracing::error!(
                notification_id = %notification.notification_id,
                error = %error,
                "Notification processor failed. Displaying default notification"
            );
        }

        ProcessorOutcome::Failed { displayed }
    }
}

fn record(resolution: Resolution) -> Resolution {
    EnvelopeMetrics::record_resolution(resolution.as_str());
    resolution
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "processor panicked".to_string()
    }
}
