use serde::{Deserialize, Serialize};

/// A decoded JSON object, as carried by push payloads
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Structured view of one push payload, handed to the processing hook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification id from the custom data (`custom.i`), empty when missing
    pub notification_id: String,
    /// Body text (`alert`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    /// Group key (`grp`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Summary text shown for the group (`grp_msg`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub led_color: Option<String>,
    /// Lock screen visibility level (`vis`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<i32>,
    /// Developer supplied data (`custom.a`), with the reserved action keys removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_buttons: Option<Vec<ActionButton>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image_layout: Option<BackgroundImageLayout>,
    /// True only when `bgn` is exactly `"1"`
    pub background_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_project_number: Option<String>,
    /// True when this is a replay of an already received message
    pub restoring: bool,
}

/// A button attached to the notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub id: Option<String>,
    pub text: Option<String>,
    pub icon: Option<String>,
}

/// Custom background layout (`bg_img`)
///
/// Keys missing from the layout object read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImageLayout {
    pub image: String,
    pub title_text_color: String,
    pub body_text_color: String,
}

impl Notification {
    /// An empty model for the given delivery mode
    pub fn empty(restoring: bool) -> Self {
        Self {
            restoring,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_notification() {
        let notification = Notification::empty(true);
        assert!(notification.restoring);
        assert!(notification.notification_id.is_empty());
        assert!(!notification.background_data);
    }

    #[test]
    fn test_serialization_uses_camel_case_and_skips_absent() {
        let notification = Notification {
            notification_id: "abc".to_string(),
            launch_url: Some("http://x".to_string()),
            ..Notification::default()
        };

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["notificationId"], "abc");
        assert_eq!(json["launchUrl"], "http://x");
        assert!(json.get("title").is_none());
        assert_eq!(json["backgroundData"], false);
    }
}
