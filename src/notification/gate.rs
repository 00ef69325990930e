use serde::Serialize;

use crate::display::NotificationRenderer;

use super::overrides::{merge, OverrideSettings};
use super::types::JsonObject;

/// Outcome of an accepted display request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayResult {
    /// Slot the notification was displayed into
    pub android_notification_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Open,
    /// A display was requested and the renderer has not returned
    Displaying,
    Accepted(DisplayResult),
}

/// At-most-once display guard for a single invocation.
///
/// Handed to the processing hook, which may call
/// [`display_notification`](Self::display_notification) to show the
/// notification with its own overrides. The first accepted call closes the
/// gate; later calls have no effect.
pub struct DecisionGate<'a> {
    payload: &'a JsonObject,
    restoring: bool,
    base: Option<&'a OverrideSettings>,
    renderer: &'a dyn NotificationRenderer,
    state: GateState,
}

impl<'a> DecisionGate<'a> {
    pub fn new(
        payload: &'a JsonObject,
        restoring: bool,
        base: Option<&'a OverrideSettings>,
        renderer: &'a dyn NotificationRenderer,
    ) -> Self {
        Self {
            payload,
            restoring,
            base,
            renderer,
            state: GateState::Open,
        }
    }

    /// Display the notification with `overrides` merged over the base settings.
    ///
    /// Returns `None` without displaying anything when a display was already
    /// accepted in this invocation or when no overrides are given.
    pub fn display_notification(&mut self, overrides: Option<OverrideSettings>) -> Option<DisplayResult> {
        if self.state != GateState::Open {
            tracing::debug!("Display already requested for this notification, ignoring request");
            return None;
        }
        let overrides = overrides?;

        // Closed before rendering: a renderer failure must not lead to a second display
        self.state = GateState::Displaying;

        let merged = merge(self.base, overrides);
        let android_notification_id = self.renderer.process(self.restoring, self.payload, Some(&merged));

        let result = DisplayResult {
            android_notification_id,
        };
        self.state = GateState::Accepted(result);
        Some(result)
    }

    /// The accepted display, if the renderer completed it
    pub fn accepted(&self) -> Option<DisplayResult> {
        match self.state {
            GateState::Accepted(result) => Some(result),
            _ => None,
        }
    }

    /// True once a display was requested, even if the renderer failed
    pub fn is_decided(&self) -> bool {
        self.state != GateState::Open
    }
}
