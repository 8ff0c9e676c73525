use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value as JsonValue};
use std::process::ExitCode;

use crate::core::AdapterError;
use crate::infra::boot;
use crate::infra::config::Config;
use crate::tools::Registry;

#[derive(Parser)]
#[command(name = "deskbridge-mcp")]
#[command(about = "MCP adapter for the Deskbridge knowledge, approval and request APIs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve MCP (stdio by default, Streamable HTTP with MODE=http)
    Serve,
    /// Print the advertised tool catalog as JSON
    Tools,
    /// Invoke one tool and print the protocol response
    Call {
        /// Tool name, e.g. knowledge_list
        name: String,
        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
    /// Validate configuration without starting the server
    Config,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    run_commands(cli.command.unwrap_or(Commands::Serve)).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => {
            let cfg = match Config::from_env() {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::error!(error = %e, "startup aborted");
                    return ExitCode::FAILURE;
                }
            };
            match boot::run_server(cfg).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "server exited with error");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Tools => match tools_catalog() {
            Ok(catalog) => {
                println!("{catalog:#}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Call { name, args } => match call_tool(&name, &args).await {
            Ok((is_error, rendered)) => {
                println!("{rendered:#}");
                if is_error {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(e) => {
                eprintln!("❌ {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Config => match Config::from_env() {
            Ok(cfg) => {
                println!("✅ Configuration is valid");
                println!("  Mode: {}", cfg.mode);
                println!("  Base URL: {}", cfg.base_url);
                println!("  Port: {}", cfg.port);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

/// `{"tools": [{name, description, inputSchema}]}` as advertised over MCP.
fn tools_catalog() -> Result<JsonValue, AdapterError> {
    let registry = Registry::builtin()?;
    let tools: Vec<JsonValue> = registry
        .list()
        .map(|t| json!({ "name": t.name, "description": t.description, "inputSchema": t.input_schema() }))
        .collect();
    Ok(json!({ "tools": tools }))
}

fn parse_args(raw: &str) -> Result<Map<String, JsonValue>, AdapterError> {
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(_) => Err(AdapterError::validation("args", "expected a JSON object")),
        Err(e) => Err(AdapterError::validation("args", format!("not valid JSON: {e}"))),
    }
}

async fn call_tool(name: &str, raw_args: &str) -> Result<(bool, JsonValue), AdapterError> {
    let args = parse_args(raw_args)?;
    let cfg = Config::from_env()?;
    let server = boot::build_server(&cfg)?;
    let resp = server.dispatcher().invoke(name, Some(&args)).await;
    let rendered = serde_json::to_value(&resp)
        .map_err(|e| AdapterError::Config(format!("cannot render response: {e}")))?;
    Ok((resp.is_error(), rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::{ENV_API_KEY, ENV_BASE_URL, ENV_CONFIG_FILE};
    use serial_test::serial;
    use std::env;

    #[test]
    fn tools_catalog_lists_every_tool() {
        let v = tools_catalog().unwrap();
        let tools = v["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 8);
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[test]
    fn parse_args_requires_object() {
        assert!(parse_args("{\"query\":\"x\"}").is_ok());
        assert!(parse_args("[1]").is_err());
        assert!(parse_args("{nope").is_err());
    }

    #[tokio::test]
    #[serial]
    async fn config_command_fails_without_api_key() {
        env::remove_var(ENV_API_KEY);
        env::remove_var(ENV_CONFIG_FILE);
        let code = run_commands(Commands::Config).await;
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    #[serial]
    async fn serve_fails_fast_without_api_key() {
        env::remove_var(ENV_API_KEY);
        env::remove_var(ENV_CONFIG_FILE);
        let code = run_commands(Commands::Serve).await;
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    #[serial]
    async fn call_command_round_trips_through_dispatcher() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/requests").query_param("status", "open");
            then.status(200).json_body(json!({"data": []}));
        });

        env::remove_var(ENV_CONFIG_FILE);
        env::set_var(ENV_API_KEY, "k");
        env::set_var(ENV_BASE_URL, server.base_url());
        let (is_error, v) = call_tool("requests_list", r#"{"status":"open"}"#).await.unwrap();
        env::remove_var(ENV_API_KEY);
        env::remove_var(ENV_BASE_URL);

        assert!(!is_error);
        assert_eq!(v["structuredContent"]["requests"], json!([]));
        assert_eq!(v["content"][0]["text"], "No requests found with status \"open\".");
    }

    #[tokio::test]
    #[serial]
    async fn call_command_reports_tool_errors() {
        env::remove_var(ENV_CONFIG_FILE);
        env::set_var(ENV_API_KEY, "k");
        let code = run_commands(Commands::Call { name: "nope".into(), args: "{}".into() }).await;
        env::remove_var(ENV_API_KEY);
        assert_eq!(code, ExitCode::FAILURE);
    }
}
