//! Push payload parsing.
//!
//! Turns a raw payload into a [`Notification`]. Parsing is total: every
//! malformed field is logged and left absent, and the caller always gets a
//! model back.

use serde_json::Value;

use crate::error::PayloadError;
use crate::metrics::PayloadMetrics;

use super::types::{ActionButton, BackgroundImageLayout, JsonObject, Notification};

/// Keys consumed from `additionalData` once action buttons are extracted
const RESERVED_ADDITIONAL_DATA_KEYS: [&str; 2] = ["actionSelected", "actionButtons"];

/// Parse a payload into a notification model.
///
/// Never fails. A broken custom data section stops the remaining field
/// assignments and leaves a partial model; visibility, action buttons and
/// the background layout are each guarded on their own.
pub fn parse_notification(payload: &JsonObject, restoring: bool) -> Notification {
    let mut notification = Notification::empty(restoring);

    if let Err(e) = assign_fields(&mut notification, payload) {
        report(&e, "Error assigning notification payload values");
    }

    notification
}

fn assign_fields(notification: &mut Notification, payload: &JsonObject) -> Result<(), PayloadError> {
    let custom = custom_data(payload)?;
    notification.notification_id = opt_string(&custom, "i").unwrap_or_default();
    notification.additional_data = custom.get("a").and_then(Value::as_object).cloned();
    notification.launch_url = opt_string(&custom, "u");

    notification.message = opt_string(payload, "alert");
    notification.title = opt_string(payload, "title");
    notification.small_icon = opt_string(payload, "sicon");
    notification.big_picture = opt_string(payload, "bicon");
    notification.large_icon = opt_string(payload, "licon");
    notification.sound = opt_string(payload, "sound");
    notification.group = opt_string(payload, "grp");
    notification.group_message = opt_string(payload, "grp_msg");
    notification.background_color = opt_string(payload, "bgac");
    notification.led_color = opt_string(payload, "ledc");
    notification.visibility = visibility(payload).unwrap_or_else(|e| {
        report(&e, "Error parsing notification visibility");
        None
    });
    notification.background_data = opt_string(payload, "bgn").as_deref() == Some("1");
    notification.from_project_number = opt_string(payload, "from");

    if let Some(additional_data) = notification.additional_data.as_mut() {
        match action_buttons(additional_data) {
            Ok(Some(buttons)) => {
                strip_reserved_keys(additional_data);
                notification.action_buttons = Some(buttons);
            }
            Ok(None) => {}
            Err(e) => report(&e, "Error assigning notification action buttons"),
        }
    }

    match background_image_layout(payload) {
        Ok(layout) => notification.background_image_layout = layout,
        Err(e) => report(&e, "Error assigning notification background image layout"),
    }

    Ok(())
}

/// Decode the nested custom data object.
///
/// Transports deliver it as a JSON encoded string; an inline object is
/// accepted as well.
fn custom_data(payload: &JsonObject) -> Result<JsonObject, PayloadError> {
    match payload.get("custom") {
        None | Some(Value::Null) => Err(PayloadError::MissingCustomData),
        Some(value) => json_object(value).map_err(PayloadError::InvalidCustomData),
    }
}

fn visibility(payload: &JsonObject) -> Result<Option<i32>, PayloadError> {
    let Some(raw) = opt_string(payload, "vis") else {
        return Ok(None);
    };

    // No whitespace trimming: " 1 " is not a visibility level
    raw.parse::<i32>()
        .map(Some)
        .map_err(|source| PayloadError::InvalidVisibility { value: raw, source })
}

/// Read `actionButtons` from the additional data, if present.
///
/// The list is all or nothing: one malformed entry rejects every button.
fn action_buttons(additional_data: &JsonObject) -> Result<Option<Vec<ActionButton>>, PayloadError> {
    let Some(raw) = additional_data.get("actionButtons") else {
        return Ok(None);
    };

    let entries = raw
        .as_array()
        .ok_or_else(|| PayloadError::InvalidActionButtons(format!("expected an array, got {}", raw)))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| -> Result<ActionButton, PayloadError> {
            let button = entry.as_object().ok_or_else(|| {
                PayloadError::InvalidActionButtons(format!("entry {} is not an object", index))
            })?;

            Ok(ActionButton {
                id: opt_string(button, "id"),
                text: opt_string(button, "text"),
                icon: opt_string(button, "icon"),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Remove the keys that only drive action buttons, once they were consumed.
fn strip_reserved_keys(additional_data: &mut JsonObject) {
    for key in RESERVED_ADDITIONAL_DATA_KEYS {
        additional_data.remove(key);
    }
}

fn background_image_layout(payload: &JsonObject) -> Result<Option<BackgroundImageLayout>, PayloadError> {
    let layout = match payload.get("bg_img") {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => json_object(value).map_err(PayloadError::InvalidBackgroundImage)?,
    };

    Ok(Some(BackgroundImageLayout {
        image: opt_string(&layout, "img").unwrap_or_default(),
        title_text_color: opt_string(&layout, "tc").unwrap_or_default(),
        body_text_color: opt_string(&layout, "bc").unwrap_or_default(),
    }))
}

/// Interpret a value as a JSON object, decoding it first if it is a string.
fn json_object(value: &Value) -> Result<JsonObject, String> {
    match value {
        Value::Object(object) => Ok(object.clone()),
        Value::String(encoded) => serde_json::from_str::<JsonObject>(encoded).map_err(|e| e.to_string()),
        other => Err(format!("expected a JSON object, got {}", other)),
    }
}

/// Read a key as text.
///
/// Numbers and booleans are rendered as text, `null` and missing keys are
/// absent.
fn opt_string(object: &JsonObject, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn report(error: &PayloadError, message: &'static str) {
    PayloadMetrics::record_field_error(error.field());
    tracing::error!(field = error.field(), error = %error, "{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_minimal_payload() {
        let raw = payload(json!({
            "custom": "{\"i\":\"abc\",\"u\":\"http://x\"}",
            "alert": "Hi"
        }));

        let notification = parse_notification(&raw, false);

        assert_eq!(
            notification,
            Notification {
                notification_id: "abc".to_string(),
                launch_url: Some("http://x".to_string()),
                message: Some("Hi".to_string()),
                ..Notification::default()
            }
        );
    }

    #[test]
    fn test_all_presentation_fields() {
        let raw = payload(json!({
            "custom": "{\"i\":\"id-1\",\"a\":{\"k\":\"v\"}}",
            "alert": "body",
            "title": "head",
            "sicon": "ic_small",
            "bicon": "https://img/big.png",
            "licon": "ic_large",
            "sound": "ding",
            "grp": "chat",
            "grp_msg": "$[notif_count] new",
            "bgac": "FF0000FF",
            "ledc": "FF00FF00",
            "vis": "0",
            "bgn": "1",
            "from": "703322744261"
        }));

        let notification = parse_notification(&raw, true);

        assert_eq!(notification.notification_id, "id-1");
        assert_eq!(notification.title.as_deref(), Some("head"));
        assert_eq!(notification.small_icon.as_deref(), Some("ic_small"));
        assert_eq!(notification.big_picture.as_deref(), Some("https://img/big.png"));
        assert_eq!(notification.large_icon.as_deref(), Some("ic_large"));
        assert_eq!(notification.sound.as_deref(), Some("ding"));
        assert_eq!(notification.group.as_deref(), Some("chat"));
        assert_eq!(notification.group_message.as_deref(), Some("$[notif_count] new"));
        assert_eq!(notification.background_color.as_deref(), Some("FF0000FF"));
        assert_eq!(notification.led_color.as_deref(), Some("FF00FF00"));
        assert_eq!(notification.visibility, Some(0));
        assert!(notification.background_data);
        assert_eq!(notification.from_project_number.as_deref(), Some("703322744261"));
        assert!(notification.restoring);
        assert_eq!(notification.additional_data.unwrap()["k"], "v");
        assert!(notification.launch_url.is_none());
    }

    #[test]
    fn test_background_data_requires_literal_one() {
        for value in [json!("true"), json!("0"), json!(true), json!("yes")] {
            let raw = payload(json!({ "custom": "{\"i\":\"x\"}", "bgn": value }));
            assert!(!parse_notification(&raw, false).background_data);
        }

        // A numeric 1 renders as the text "1"
        let raw = payload(json!({ "custom": "{\"i\":\"x\"}", "bgn": 1 }));
        assert!(parse_notification(&raw, false).background_data);
    }

    #[test]
    fn test_malformed_visibility_only_drops_visibility() {
        let raw = payload(json!({
            "custom": "{\"i\":\"x\"}",
            "vis": "public",
            "bgn": "1",
            "from": "123"
        }));

        let notification = parse_notification(&raw, false);

        assert_eq!(notification.visibility, None);
        assert!(notification.background_data);
        assert_eq!(notification.from_project_number.as_deref(), Some("123"));
    }

    #[test]
    fn test_padded_visibility_is_rejected() {
        let padded = payload(json!({ "custom": "{\"i\":\"x\"}", "vis": " 1 " }));
        assert_eq!(parse_notification(&padded, false).visibility, None);

        let signed = payload(json!({ "custom": "{\"i\":\"x\"}", "vis": "-1" }));
        assert_eq!(parse_notification(&signed, false).visibility, Some(-1));
    }

    #[test]
    fn test_action_buttons_extracted_and_reserved_keys_stripped() {
        let custom = json!({
            "i": "x",
            "a": {
                "foo": "bar",
                "actionSelected": "id1",
                "actionButtons": [
                    { "id": "id1", "text": "Accept", "icon": "ic_ok" },
                    { "id": "id2", "text": "Decline" }
                ]
            }
        });
        let raw = payload(json!({ "custom": custom.to_string() }));

        let notification = parse_notification(&raw, false);

        let buttons = notification.action_buttons.unwrap();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].id.as_deref(), Some("id1"));
        assert_eq!(buttons[0].icon.as_deref(), Some("ic_ok"));
        assert_eq!(buttons[1].text.as_deref(), Some("Decline"));
        assert_eq!(buttons[1].icon, None);

        let additional_data = notification.additional_data.unwrap();
        assert_eq!(additional_data.len(), 1);
        assert_eq!(additional_data["foo"], "bar");
    }

    #[test]
    fn test_malformed_action_buttons_leave_other_fields() {
        let custom = json!({
            "i": "x",
            "a": { "actionButtons": [ { "id": "ok" }, "not-an-object" ] }
        });
        let raw = payload(json!({
            "custom": custom.to_string(),
            "bg_img": "{\"img\":\"bg.png\",\"tc\":\"FF000000\",\"bc\":\"FFFFFFFF\"}",
            "alert": "still here"
        }));

        let notification = parse_notification(&raw, false);

        assert!(notification.action_buttons.is_none());
        // Nothing was consumed, so the reserved key stays visible
        assert!(notification.additional_data.unwrap().contains_key("actionButtons"));
        assert_eq!(notification.message.as_deref(), Some("still here"));
        let layout = notification.background_image_layout.unwrap();
        assert_eq!(layout.image, "bg.png");
        assert_eq!(layout.title_text_color, "FF000000");
        assert_eq!(layout.body_text_color, "FFFFFFFF");
    }

    #[test]
    fn test_malformed_background_image_leaves_other_fields() {
        let custom = json!({
            "i": "x",
            "a": { "actionButtons": [ { "id": "ok", "text": "OK" } ] }
        });
        let raw = payload(json!({
            "custom": custom.to_string(),
            "bg_img": "{not json",
            "vis": "1"
        }));

        let notification = parse_notification(&raw, false);

        assert!(notification.background_image_layout.is_none());
        assert_eq!(notification.action_buttons.unwrap().len(), 1);
        assert_eq!(notification.visibility, Some(1));
    }

    #[test]
    fn test_background_image_missing_keys_read_empty() {
        let raw = payload(json!({ "custom": "{\"i\":\"x\"}", "bg_img": "{\"img\":\"a.png\"}" }));

        let layout = parse_notification(&raw, false).background_image_layout.unwrap();

        assert_eq!(layout.image, "a.png");
        assert!(layout.title_text_color.is_empty());
        assert!(layout.body_text_color.is_empty());
    }

    #[test]
    fn test_missing_custom_data_yields_empty_model() {
        let raw = payload(json!({ "alert": "Hi", "title": "T" }));

        let notification = parse_notification(&raw, true);

        assert_eq!(notification, Notification::empty(true));
    }

    #[test]
    fn test_invalid_custom_data_yields_empty_model() {
        let raw = payload(json!({ "custom": "{\"i\":", "alert": "Hi" }));

        let notification = parse_notification(&raw, false);

        assert!(notification.notification_id.is_empty());
        assert!(notification.message.is_none());
    }

    #[test]
    fn test_inline_custom_object_accepted() {
        let raw = payload(json!({ "custom": { "i": "inline", "u": "app://home" } }));

        let notification = parse_notification(&raw, false);

        assert_eq!(notification.notification_id, "inline");
        assert_eq!(notification.launch_url.as_deref(), Some("app://home"));
    }

    #[test]
    fn test_non_object_additional_data_ignored() {
        let raw = payload(json!({ "custom": "{\"i\":\"x\",\"a\":\"text\"}" }));

        let notification = parse_notification(&raw, false);

        assert!(notification.additional_data.is_none());
        assert!(notification.action_buttons.is_none());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let raw = payload(json!({
            "custom": "{\"i\":\"x\",\"a\":{\"actionButtons\":[{\"id\":\"b\"}]}}",
            "alert": "Hi"
        }));

        assert_eq!(parse_notification(&raw, false), parse_notification(&raw, false));
    }
}
