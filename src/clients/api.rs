use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::Value as JsonValue;

use crate::core::{AdapterError, Query, Transport, TransportResult};
use crate::infra::config::Config;
use crate::infra::http::headers::add_standard_headers;

/// Fixed budget for one backend request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a reqwest client with the request timeout and no idle connection
/// reuse.
pub fn make_http_client(timeout: Duration) -> Result<Client, AdapterError> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|e| AdapterError::Config(format!("failed to build HTTP client: {e}")))
}

/// HTTP transport for the Deskbridge API.
#[derive(Clone)]
pub struct ApiClient {
    base: String,
    api_key: String,
    http: Client,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base: impl Into<String>, api_key: impl Into<String>) -> Result<Self, AdapterError> {
        Self::with_timeout(base, api_key, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AdapterError> {
        Ok(Self {
            base: base.into(),
            api_key: api_key.into(),
            http: make_http_client(timeout)?,
            timeout,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, AdapterError> {
        Self::new(cfg.base_url.clone(), cfg.api_key.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Each entry of `path` becomes exactly one segment: `/` inside an entry is
    /// encoded as `%2F`.
    fn url(&self, path: &[&str], query: &Query<'_>) -> Result<Url, AdapterError> {
        let mut url = Url::parse(&self.base)
            .map_err(|e| AdapterError::Config(format!("invalid base URL '{}': {e}", self.base)))?;
        url.path_segments_mut()
            .map_err(|_| AdapterError::Config(format!("base URL cannot carry a path: {}", self.base)))?
            .pop_if_empty()
            .extend(path);

        let pairs: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (*k, v)))
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> AdapterError {
        if e.is_timeout() {
            AdapterError::Timeout(self.timeout.as_secs())
        } else {
            AdapterError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn call(
        &self,
        method: Method,
        path: &[&str],
        body: Option<&JsonValue>,
        query: &Query<'_>,
    ) -> Result<TransportResult, AdapterError> {
        if self.api_key.trim().is_empty() {
            return Err(AdapterError::Config("DESKBRIDGE_API_KEY is not set".into()));
        }
        let url = self.url(path, query)?;
        tracing::debug!(%method, endpoint = %url, "api request");

        let (mut builder, rid) = add_standard_headers(self.http.request(method.clone(), url), &self.api_key);
        if let Some(body) = body.filter(|b| !b.is_null()) {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let resp = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let status = resp.status().as_u16();
        let raw = resp.text().await.map_err(|e| self.map_send_error(e))?;
        tracing::debug!(
            %method,
            ?path,
            status,
            request_id = %rid,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "api response"
        );
        Ok(TransportResult::from_body(status, raw))
    }
}
