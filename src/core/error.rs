use thiserror::Error;

/// Adapter-wide error model. Only `Config` is fatal, and only at startup;
/// inside a tool call every variant becomes an `isError` response.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("invalid argument '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    NotFound(String),
}

impl AdapterError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AdapterError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Short label used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::Config(_) => "config",
            AdapterError::Network(_) => "network",
            AdapterError::Timeout(_) => "timeout",
            AdapterError::Http { .. } => "http",
            AdapterError::Validation { .. } => "validation",
            AdapterError::UnknownTool(_) => "unknown_tool",
            AdapterError::NotFound(_) => "not_found",
        }
    }
}
