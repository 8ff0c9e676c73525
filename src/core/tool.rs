use std::future::Future;
use std::pin::Pin;

use serde_json::{json, Map, Value as JsonValue};

use super::error::AdapterError;
use super::transport::Transport;

/// Declared kind of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Enum(&'static [&'static str]),
    StringArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

impl ParameterSpec {
    pub const fn string(description: &'static str) -> Self {
        Self { kind: ParamKind::String, required: true, description }
    }

    pub const fn one_of(values: &'static [&'static str], description: &'static str) -> Self {
        Self { kind: ParamKind::Enum(values), required: true, description }
    }

    pub const fn strings(description: &'static str) -> Self {
        Self { kind: ParamKind::StringArray, required: true, description }
    }

    pub const fn optional(self) -> Self {
        Self { required: false, ..self }
    }

    /// JSON Schema fragment for this parameter.
    pub fn json_schema(&self) -> JsonValue {
        let mut schema = match self.kind {
            ParamKind::String => json!({ "type": "string" }),
            ParamKind::Enum(values) => json!({ "type": "string", "enum": values }),
            ParamKind::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
        };
        if !self.description.is_empty() {
            schema["description"] = JsonValue::String(self.description.to_owned());
        }
        schema
    }
}

/// Text for the agent plus optional structured data.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub text: String,
    pub data: Option<JsonValue>,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), data: None }
    }

    pub fn with_data(text: impl Into<String>, data: JsonValue) -> Self {
        Self { text: text.into(), data: Some(data) }
    }
}

/// Arguments that passed schema validation. Only declared fields survive;
/// optional fields that were null or empty are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs(Map<String, JsonValue>);

impl ToolArgs {
    pub fn new(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(JsonValue::as_str)
    }

    pub fn require_str(&self, name: &str) -> Result<&str, AdapterError> {
        self.str(name)
            .ok_or_else(|| AdapterError::validation(name, "required field is missing"))
    }

    pub fn strings(&self, name: &str) -> Vec<String> {
        self.0
            .get(name)
            .and_then(JsonValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<ToolResult, AdapterError>> + Send + 'a>>;

/// A tool handler: validated arguments in, rendered result out.
pub type Handler = for<'a> fn(ToolArgs, &'a dyn Transport) -> HandlerFuture<'a>;

/// Static description of one tool.
#[derive(Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [(&'static str, ParameterSpec)],
    pub handler: Handler,
}

impl ToolSpec {
    /// JSON Schema object advertised for this tool's input.
    pub fn input_schema(&self) -> Map<String, JsonValue> {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, param) in self.params {
            properties.insert((*name).to_owned(), param.json_schema());
            if param.required {
                required.push(JsonValue::String((*name).to_owned()));
            }
        }
        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), JsonValue::Object(properties));
        schema.insert("required".into(), JsonValue::Array(required));
        schema
    }
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_args: ToolArgs, _api: &dyn Transport) -> HandlerFuture<'_> {
        Box::pin(async { Ok(ToolResult::text("noop")) })
    }

    const LEVELS: &[&str] = &["low", "high"];

    static SPEC: ToolSpec = ToolSpec {
        name: "test.schema",
        description: "schema fixture",
        params: &[
            ("title", ParameterSpec::string("Title")),
            ("level", ParameterSpec::one_of(LEVELS, "Level").optional()),
            ("tags", ParameterSpec::strings("").optional()),
        ],
        handler: noop,
    };

    #[test]
    fn input_schema_translates_each_kind() {
        let schema = JsonValue::Object(SPEC.input_schema());
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["title"], json!({"type": "string", "description": "Title"}));
        assert_eq!(
            schema["properties"]["level"],
            json!({"type": "string", "enum": ["low", "high"], "description": "Level"})
        );
        assert_eq!(
            schema["properties"]["tags"],
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(schema["required"], json!(["title"]));
    }

    #[test]
    fn args_accessors() {
        let mut m = Map::new();
        m.insert("title".into(), json!("x"));
        m.insert("tags".into(), json!(["a", "b"]));
        let args = ToolArgs::new(m);
        assert_eq!(args.str("title"), Some("x"));
        assert_eq!(args.strings("tags"), vec!["a".to_string(), "b".to_string()]);
        assert!(args.strings("missing").is_empty());
        assert!(args.require_str("missing").is_err());
    }
}
