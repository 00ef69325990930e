use serde::{Deserialize, Serialize};

/// Partial display configuration.
///
/// Every field stays optional so an override only replaces what it sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideSettings {
    /// Platform display extension, handed to the renderer untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extender: Option<serde_json::Value>,
    /// Notification slot to display into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_notification_id: Option<i32>,
}

impl OverrideSettings {
    /// Settings that only pin the notification slot
    pub fn with_notification_id(android_notification_id: i32) -> Self {
        Self {
            android_notification_id: Some(android_notification_id),
            ..Self::default()
        }
    }

    /// Fill every unset field from `base`, keeping fields already set.
    pub fn override_from(&mut self, base: Option<&OverrideSettings>) {
        let Some(base) = base else {
            return;
        };

        if self.extender.is_none() {
            self.extender = base.extender.clone();
        }
        if self.android_notification_id.is_none() {
            self.android_notification_id = base.android_notification_id;
        }
    }
}

/// Merge an overlay onto base settings; the overlay wins wherever it is set.
pub fn merge(base: Option<&OverrideSettings>, overlay: OverrideSettings) -> OverrideSettings {
    let mut merged = overlay;
    merged.override_from(base);
    merged
}
