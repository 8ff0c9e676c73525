use axum::{
    routing::{any_service, get},
    Router,
};
use std::sync::Arc;

use crate::infra::mcp::{self, DeskbridgeMcp, LocalSessionManager};

/// `/healthz` + Streamable MCP at `/mcp`.
pub fn build_app(server: DeskbridgeMcp) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = mcp::make_streamable_http_service(server, session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{testing::client, Dispatcher};
    use axum::body::{to_bytes, Body};
    use hyper::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn healthz_returns_ok() {
        let server = DeskbridgeMcp::new(Dispatcher::builtin(Arc::new(client("http://127.0.0.1:9".into()))).unwrap());
        let app = build_app(server);
        let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp.status().is_success());
        let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }
}
