//! MCP server integration (stdio + Streamable HTTP).
//!
//! The tool list is data driven: every `ToolSpec` in the registry is
//! advertised with its JSON Schema and every `tools/call` goes through the
//! dispatcher, so handlers never see protocol types.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::streamable_http_server::tower::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{serve_server, ErrorData as McpError, RoleServer, ServerHandler};

pub use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;

use crate::core::{ProtocolResponse, ToolSpec};
use crate::tools::Dispatcher;

const INSTRUCTIONS: &str = "Tools for the Deskbridge knowledge base, approval workflow and request queue. \
Use search before knowledge_add to avoid duplicates; poll approval_check after approval_request.";

/// The MCP server handler.
#[derive(Clone)]
pub struct DeskbridgeMcp {
    dispatcher: Dispatcher,
}

impl DeskbridgeMcp {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Protocol metadata for every registered tool, in catalog order.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher.registry().list().map(advertise).collect()
    }

    pub async fn call(&self, name: &str, arguments: Option<&JsonObject>) -> CallToolResult {
        self.dispatcher.invoke(name, arguments).await.into()
    }
}

fn advertise(spec: &ToolSpec) -> Tool {
    Tool::new(spec.name, spec.description, Arc::new(spec.input_schema()))
}

impl From<ProtocolResponse> for CallToolResult {
    fn from(resp: ProtocolResponse) -> Self {
        let content = resp
            .content
            .iter()
            .map(|block| Content::text(block.text()))
            .collect();
        if resp.is_error() {
            return CallToolResult::error(content);
        }
        let mut result = CallToolResult::success(content);
        result.structured_content = resp.structured_content;
        result
    }
}

impl ServerHandler for DeskbridgeMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "deskbridge-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::from_build_env()
            },
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = %request.name, "tools/call");
        Ok(self.call(&request.name, request.arguments.as_ref()).await)
    }
}

/// Speak MCP over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: DeskbridgeMcp) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let running = serve_server(server, (stdin, stdout))
        .await
        .map_err(|e| anyhow::anyhow!("MCP handshake failed: {e}"))?;
    let reason = running
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP service task failed: {e}"))?;
    tracing::info!(?reason, "stdio session ended");
    Ok(())
}

pub fn make_streamable_http_service(
    server: DeskbridgeMcp,
    session_mgr: Arc<LocalSessionManager>,
) -> StreamableHttpService<DeskbridgeMcp, LocalSessionManager> {
    let cfg = StreamableHttpServerConfig::default();
    tracing::debug!(stateful_mode = %cfg.stateful_mode, "StreamableHttpServerConfig");
    StreamableHttpService::new(move || Ok(server.clone()), session_mgr, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::client;
    use httpmock::prelude::*;
    use serde_json::{json, Value as JsonValue};
    use std::collections::HashSet;

    fn server_for(base: String) -> DeskbridgeMcp {
        DeskbridgeMcp::new(Dispatcher::builtin(Arc::new(client(base))).unwrap())
    }

    #[test]
    fn tools_list_matches_registry() {
        let mcp = server_for("http://127.0.0.1:9".into());
        let tools = mcp.tools();
        let registry = crate::tools::Registry::builtin().unwrap();
        assert_eq!(tools.len(), registry.len());
        let advertised: HashSet<String> = tools.iter().map(|t| t.name.to_string()).collect();
        let registered: HashSet<String> = registry.list().map(|t| t.name.to_string()).collect();
        assert_eq!(advertised, registered);
    }

    #[test]
    fn advertised_schema_marks_only_required_fields() {
        let mcp = server_for("http://127.0.0.1:9".into());
        let tool = mcp
            .tools()
            .into_iter()
            .find(|t| t.name == "request_create")
            .unwrap();
        let schema = JsonValue::Object((*tool.input_schema).clone());
        assert_eq!(schema["required"], json!(["title"]));
        assert_eq!(
            schema["properties"]["priority"]["enum"],
            json!(["low", "medium", "high", "critical"])
        );
    }

    #[test]
    fn server_info_enables_tools() {
        let info = server_for("http://127.0.0.1:9".into()).get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "deskbridge-mcp");
    }

    #[tokio::test]
    async fn call_success_carries_structured_content() {
        let backend = MockServer::start();
        backend.mock(|when, then| {
            when.method(GET).path("/knowledge");
            then.status(200).json_body(json!({"data": []}));
        });

        let result = server_for(backend.base_url()).call("knowledge_list", None).await;
        assert_ne!(result.is_error, Some(true));
        assert_eq!(result.structured_content, Some(json!({"entries": []})));
    }

    #[tokio::test]
    async fn call_failure_is_flagged_error() {
        let result = server_for("http://127.0.0.1:9".into())
            .call("approval_check", Some(&JsonObject::new()))
            .await;
        assert_eq!(result.is_error, Some(true));
        assert!(result.structured_content.is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_is_flagged_error_not_fatal() {
        let server = server_for("http://127.0.0.1:9".into());
        let result = server.call("knowledge_list", None).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result.structured_content.is_none());

        let again = server.call("knowledge_list", None).await;
        assert_eq!(again.is_error, Some(true));
    }

    #[test]
    fn streamable_http_service_builds() {
        let session_mgr = Arc::new(LocalSessionManager::default());
        let _svc = make_streamable_http_service(server_for("http://127.0.0.1:9".into()), session_mgr);
    }
}
