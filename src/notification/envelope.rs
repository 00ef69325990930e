use serde::{Deserialize, Serialize};

use crate::error::{ExtenderError, Result};

use super::overrides::OverrideSettings;
use super::types::JsonObject;

/// One delivery handed over by the push transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryEnvelope {
    /// JSON encoded payload
    pub json_payload: String,
    /// Replay of a previously received message (e.g. after reboot)
    #[serde(default)]
    pub restoring: bool,
    /// Slot pre-assigned by the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android_notif_id: Option<i32>,
}

impl DeliveryEnvelope {
    pub fn new(json_payload: impl Into<String>) -> Self {
        Self {
            json_payload: json_payload.into(),
            restoring: false,
            android_notif_id: None,
        }
    }

    /// Mark the envelope as a replay
    pub fn restoring(mut self, restoring: bool) -> Self {
        self.restoring = restoring;
        self
    }

    /// Set the pre-assigned slot
    pub fn android_notif_id(mut self, id: i32) -> Self {
        self.android_notif_id = Some(id);
        self
    }

    /// Decode the top-level payload, which must be a JSON object.
    pub fn decode_payload(&self) -> Result<JsonObject> {
        match serde_json::from_str::<serde_json::Value>(&self.json_payload)? {
            serde_json::Value::Object(payload) => Ok(payload),
            _ => Err(ExtenderError::PayloadNotObject),
        }
    }

    /// Base override settings carried by the envelope itself
    pub fn base_override_settings(&self) -> Option<OverrideSettings> {
        self.android_notif_id.map(OverrideSettings::with_notification_id)
    }
}
