use std::time::Duration;

/// Initialize the tracing subscriber once, honoring RUST_LOG (default
/// `info`). Output goes to stderr: stdout carries MCP frames in stdio mode.
pub fn init() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Count and time one tool call. `tool` is a registered name or a fixed
/// placeholder, never caller input. Without an installed recorder the metrics
/// calls are no-ops; the debug line is always emitted.
pub fn record_call(tool: &'static str, outcome: &'static str, elapsed: Duration) {
    let ms = elapsed.as_secs_f64() * 1000.0;
    metrics::counter!(
        "deskbridge_tool_calls_total",
        "tool" => tool,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("deskbridge_tool_call_ms", "tool" => tool).record(ms);
    tracing::debug!(tool, outcome, elapsed_ms = ms, "metric");
}
