//! Tool catalog, handlers and the dispatcher that drives them.

pub mod approvals;
pub mod dispatcher;
pub mod knowledge;
pub mod registry;
pub mod render;
pub mod requests;

use reqwest::Method;
use serde_json::Value as JsonValue;

use crate::clients::envelope::parse_envelope;
use crate::core::{AdapterError, Query, Transport};

pub use dispatcher::Dispatcher;
pub use registry::{Registry, CATALOG};

/// One backend round trip reduced to its payload; non-2xx becomes
/// `AdapterError::Http` with the extracted message.
pub(crate) async fn fetch(
    api: &dyn Transport,
    method: Method,
    path: &[&str],
    body: Option<&JsonValue>,
    query: &Query<'_>,
) -> Result<JsonValue, AdapterError> {
    let result = api.call(method, path, body, query).await?;
    parse_envelope(&result).into_result()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Handler harness shared by the tool tests.

    use serde_json::{Map, Value as JsonValue};

    use crate::clients::ApiClient;
    use crate::core::{AdapterError, ToolArgs, ToolResult};

    use super::Dispatcher;

    pub fn args(v: JsonValue) -> ToolArgs {
        match v {
            JsonValue::Object(m) => ToolArgs::new(m),
            _ => ToolArgs::new(Map::new()),
        }
    }

    pub fn client(base: String) -> ApiClient {
        ApiClient::new(base, "test-key").expect("client")
    }

    pub async fn run(base: String, tool: &str, raw: JsonValue) -> Result<ToolResult, AdapterError> {
        let dispatcher = Dispatcher::builtin(std::sync::Arc::new(client(base))).expect("registry");
        dispatcher.try_invoke(tool, raw.as_object()).await
    }
}
