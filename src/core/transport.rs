use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value as JsonValue;

use super::error::AdapterError;

/// Outcome of one HTTP exchange. `data` holds the parsed JSON body, or the
/// raw text as a JSON string when the body was not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResult {
    pub status: u16,
    pub data: JsonValue,
    pub raw: String,
}

impl TransportResult {
    pub fn from_body(status: u16, raw: String) -> Self {
        let data = serde_json::from_str(&raw).unwrap_or_else(|_| JsonValue::String(raw.clone()));
        Self { status, data, raw }
    }
}

/// Query pairs; entries whose value is `None` or empty are not sent.
pub type Query<'a> = [(&'a str, Option<&'a str>)];

/// Backend abstraction so handlers can be driven by the real HTTP client or a
/// test double. `path` is a list of raw segments appended to the base URL;
/// each one is sent as a single percent-encoded segment.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        method: Method,
        path: &[&str],
        body: Option<&JsonValue>,
        query: &Query<'_>,
    ) -> Result<TransportResult, AdapterError>;
}
