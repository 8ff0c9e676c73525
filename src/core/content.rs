//! Protocol-facing response shape produced by the dispatcher.

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::error::AdapterError;
use super::tool::ToolResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(&self) -> &str {
        match self {
            ContentBlock::Text { text } => text,
        }
    }
}

/// `{content, structuredContent?, isError?}`; the only shape returned across
/// the protocol boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolResponse {
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ProtocolResponse {
    pub fn success(result: ToolResult) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: result.text }],
            structured_content: result.data,
            is_error: None,
        }
    }

    pub fn failure(err: &AdapterError) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: format!("Error: {err}"),
            }],
            structured_content: None,
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// All text blocks joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(ContentBlock::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
