use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value as JsonValue};

use crate::core::{AdapterError, ParamKind, ProtocolResponse, ToolArgs, ToolResult, ToolSpec, Transport};
use crate::infra::logging::record_call;

use super::registry::Registry;

const UNKNOWN_TOOL_LABEL: &str = "unknown";

/// Validates arguments, runs the handler and shapes the protocol response.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, transport: Arc<dyn Transport>) -> Self {
        Self { registry, transport }
    }

    /// Dispatcher over the built-in catalog.
    pub fn builtin(transport: Arc<dyn Transport>) -> Result<Self, AdapterError> {
        Ok(Self::new(Arc::new(Registry::builtin()?), transport))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Never fails: every error becomes an `isError` response.
    pub async fn invoke(&self, name: &str, raw_args: Option<&Map<String, JsonValue>>) -> ProtocolResponse {
        let start = Instant::now();
        let outcome = self.try_invoke(name, raw_args).await;
        let elapsed = start.elapsed();
        let label = self.metric_label(name);
        match outcome {
            Ok(result) => {
                record_call(label, "ok", elapsed);
                ProtocolResponse::success(result)
            }
            Err(err) => {
                record_call(label, err.kind(), elapsed);
                tracing::warn!(tool = name, kind = err.kind(), error = %err, "tool call failed");
                ProtocolResponse::failure(&err)
            }
        }
    }

    /// Registered name, or `unknown` so caller-chosen names never become
    /// metric labels.
    fn metric_label(&self, name: &str) -> &'static str {
        self.registry.get(name).map_or(UNKNOWN_TOOL_LABEL, |spec| spec.name)
    }

    pub async fn try_invoke(
        &self,
        name: &str,
        raw_args: Option<&Map<String, JsonValue>>,
    ) -> Result<ToolResult, AdapterError> {
        let spec = self
            .registry
            .get(name)
            .ok_or_else(|| AdapterError::UnknownTool(name.to_owned()))?;
        let args = validate(spec, raw_args)?;
        tracing::debug!(tool = name, "invoking handler");
        (spec.handler)(args, self.transport.as_ref()).await
    }
}

/// Check `raw` against the tool's declared parameters. Reports the first
/// offending field in declaration order; undeclared fields are dropped.
pub fn validate(spec: &ToolSpec, raw: Option<&Map<String, JsonValue>>) -> Result<ToolArgs, AdapterError> {
    let empty = Map::new();
    let raw = raw.unwrap_or(&empty);
    let mut out = Map::new();

    for (name, param) in spec.params {
        let value = match raw.get(*name) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) if s.is_empty() && !param.required => None,
            Some(v) => Some(v),
        };
        let Some(value) = value else {
            if param.required {
                return Err(AdapterError::validation(*name, "required field is missing"));
            }
            continue;
        };

        match param.kind {
            ParamKind::String => {
                if !value.is_string() {
                    return Err(AdapterError::validation(*name, "expected a string"));
                }
            }
            ParamKind::Enum(values) => {
                let ok = value.as_str().is_some_and(|s| values.contains(&s));
                if !ok {
                    return Err(AdapterError::validation(
                        *name,
                        format!("expected one of: {}", values.join(", ")),
                    ));
                }
            }
            ParamKind::StringArray => {
                let ok = value
                    .as_array()
                    .is_some_and(|items| items.iter().all(JsonValue::is_string));
                if !ok {
                    return Err(AdapterError::validation(*name, "expected an array of strings"));
                }
            }
        }
        out.insert((*name).to_owned(), value.clone());
    }
    Ok(ToolArgs::new(out))
}
