use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::core::AdapterError;

pub const DEFAULT_BASE_URL: &str = "https://api.deskbridge.io";
pub const DEFAULT_PORT: u16 = 8080;

pub const ENV_API_KEY: &str = "DESKBRIDGE_API_KEY";
pub const ENV_BASE_URL: &str = "DESKBRIDGE_BASE_URL";
pub const ENV_CONFIG_FILE: &str = "DESKBRIDGE_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// MCP over stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP at `/mcp`.
    Http,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Stdio => f.write_str("stdio"),
            Mode::Http => f.write_str("http"),
        }
    }
}

impl FromStr for Mode {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Mode::Stdio),
            "http" | "server" => Ok(Mode::Http),
            other => Err(AdapterError::Config(format!(
                "invalid MODE: {other}. Must be 'stdio' or 'http'"
            ))),
        }
    }
}

/// Optional TOML file; every key may be overridden from the environment.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub mode: Option<String>,
    pub port: Option<u16>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, AdapterError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AdapterError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        Self::parse(&text)
            .map_err(|e| AdapterError::Config(format!("invalid config file {}: {e}", path.display())))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub mode: Mode,
    pub port: u16,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("mode", &self.mode)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AdapterError> {
        let file = match non_empty(std::env::var(ENV_CONFIG_FILE).ok()) {
            Some(path) => FileConfig::load(Path::new(&path))?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge file settings with `lookup` (the environment in production).
    pub fn resolve(
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AdapterError> {
        let api_key = non_empty(lookup(ENV_API_KEY))
            .ok_or_else(|| AdapterError::Config(format!("{ENV_API_KEY} is required")))?;

        let base_url = non_empty(lookup(ENV_BASE_URL))
            .or(non_empty(file.base_url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        reqwest::Url::parse(&base_url)
            .map_err(|e| AdapterError::Config(format!("invalid {ENV_BASE_URL} '{base_url}': {e}")))?;

        let mode = match non_empty(lookup("MODE")).or(non_empty(file.mode)) {
            Some(m) => m.parse()?,
            None => Mode::default(),
        };

        let port = lookup("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .or(file.port)
            .unwrap_or(DEFAULT_PORT);
        if mode == Mode::Http && port == 0 {
            return Err(AdapterError::Config("PORT cannot be 0".into()));
        }

        Ok(Self { api_key, base_url, mode, port })
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}
