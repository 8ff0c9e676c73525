use std::net::SocketAddr;
use std::sync::Arc;

use crate::clients::ApiClient;
use crate::core::AdapterError;
use crate::infra::config::{Config, Mode};
use crate::infra::mcp::DeskbridgeMcp;
use crate::tools::Dispatcher;

/// Registry + HTTP transport + bridge, built once at startup.
pub fn build_server(cfg: &Config) -> Result<DeskbridgeMcp, AdapterError> {
    let api = ApiClient::from_config(cfg)?;
    let dispatcher = Dispatcher::builtin(Arc::new(api))?;
    tracing::info!(tools = dispatcher.registry().len(), "tool registry ready");
    Ok(DeskbridgeMcp::new(dispatcher))
}

pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        base_url = %cfg.base_url,
        "BOOT deskbridge-mcp"
    );
    let server = build_server(&cfg)?;

    match cfg.mode {
        Mode::Stdio => crate::infra::mcp::serve_stdio(server).await,
        Mode::Http => {
            let app = crate::infra::http_app::build_app(server);
            let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
            tracing::info!(%addr, "listening");
            axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
            Ok(())
        }
    }
}
