//! Reading the backend's `{data: ...}` / `{error: {message}}` envelopes.

use serde_json::Value as JsonValue;

use crate::core::{AdapterError, TransportResult};

/// A transport result split into its payload and, for failures, a
/// human-readable message.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: u16,
    pub payload: JsonValue,
    pub error_message: Option<String>,
}

pub fn is_success(result: &TransportResult) -> bool {
    (200..300).contains(&result.status)
}

/// `body.data` when the body is an object carrying `data`, else the body.
pub fn extract_payload(result: &TransportResult) -> &JsonValue {
    match &result.data {
        JsonValue::Object(obj) => obj.get("data").unwrap_or(&result.data),
        other => other,
    }
}

/// Never returns an empty string.
pub fn extract_error_message(result: &TransportResult) -> String {
    if let Some(error) = result.data.get("error") {
        let message = match error.get("message") {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        if !message.trim().is_empty() {
            return message;
        }
        let rendered = match error {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => other.to_string(),
        };
        if !rendered.trim().is_empty() {
            return rendered;
        }
    }
    if let JsonValue::String(body) = &result.data {
        if !body.trim().is_empty() {
            return body.clone();
        }
    }
    format!("HTTP {}", result.status)
}

pub fn parse_envelope(result: &TransportResult) -> Envelope {
    let error_message = if is_success(result) {
        None
    } else {
        Some(extract_error_message(result))
    };
    Envelope {
        status: result.status,
        payload: extract_payload(result).clone(),
        error_message,
    }
}

impl Envelope {
    /// Payload on success, `AdapterError::Http` otherwise.
    pub fn into_result(self) -> Result<JsonValue, AdapterError> {
        match self.error_message {
            None => Ok(self.payload),
            Some(message) => Err(AdapterError::Http {
                status: self.status,
                message,
            }),
        }
    }
}
