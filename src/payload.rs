//! Extracts display text from raw queue message bodies.
//!
//! Bodies arrive either as plain text, as a JSON object, or as a fan-out
//! envelope whose `Message` field is a string that may itself be JSON.
//! The unwrap precedence is deliberate and load-bearing for existing
//! producers: inner parsed `message` field > outer `Message` string >
//! outer `message` field > stringified object > raw body.

use serde_json::Value;

use crate::format::json_value_text;

/// Best-effort extraction of the text to render from a queue body.
/// Never fails; anything that does not parse falls back to the raw body.
pub fn extract_display_text(body: &str) -> String {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return body.to_string(),
    };

    let map = match &parsed {
        Value::Object(map) => map,
        Value::String(s) => return s.clone(),
        other => return other.to_string(),
    };

    if let Some(Value::String(envelope)) = map.get("Message") {
        if let Ok(Value::Object(inner)) = serde_json::from_str::<Value>(envelope) {
            if let Some(message) = inner.get("message") {
                return json_value_text(message);
            }
        }
        return envelope.clone();
    }

    if let Some(message) = map.get("message") {
        return json_value_text(message);
    }

    parsed.to_string()
}
