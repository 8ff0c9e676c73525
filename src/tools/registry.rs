use std::collections::HashMap;

use crate::core::{AdapterError, ParamKind, ParameterSpec, ToolSpec};

use super::{approvals, knowledge, requests};

/// Every tool this adapter exposes, in advertised order.
pub static CATALOG: &[ToolSpec] = &[
    ToolSpec {
        name: "search",
        description: "Search the knowledge base. Returns up to 10 matching entries with a short excerpt of each.",
        params: &[("query", ParameterSpec::string("Free-text search query"))],
        handler: knowledge::search,
    },
    ToolSpec {
        name: "knowledge_add",
        description: "Add an entry to the knowledge base. A URL-safe slug is derived from the title.",
        params: &[
            ("title", ParameterSpec::string("Entry title")),
            ("content", ParameterSpec::string("Entry body (markdown allowed)")),
            ("tags", ParameterSpec::strings("Tags used for filtering").optional()),
        ],
        handler: knowledge::add,
    },
    ToolSpec {
        name: "knowledge_list",
        description: "List all knowledge base entries.",
        params: &[],
        handler: knowledge::list,
    },
    ToolSpec {
        name: "approval_request",
        description: "Ask a human to approve an action. Returns the approval id to poll with approval_check.",
        params: &[
            ("title", ParameterSpec::string("What needs approval")),
            ("description", ParameterSpec::string("Context the approver needs to decide")),
        ],
        handler: approvals::request,
    },
    ToolSpec {
        name: "approval_check",
        description: "Check the status of an approval request, including the decision and note once decided.",
        params: &[("id", ParameterSpec::string("Approval id returned by approval_request"))],
        handler: approvals::check,
    },
    ToolSpec {
        name: "approvals_list",
        description: "List approval requests, optionally filtered by status.",
        params: &[(
            "status",
            ParameterSpec::one_of(approvals::STATUSES, "Only return approvals in this status").optional(),
        )],
        handler: approvals::list,
    },
    ToolSpec {
        name: "request_create",
        description: "Open a work request in the team queue.",
        params: &[
            ("title", ParameterSpec::string("Short summary of the request")),
            ("description", ParameterSpec::string("Details").optional()),
            (
                "priority",
                ParameterSpec::one_of(requests::PRIORITIES, "Defaults to medium").optional(),
            ),
        ],
        handler: requests::create,
    },
    ToolSpec {
        name: "requests_list",
        description: "List work requests, optionally filtered by status.",
        params: &[(
            "status",
            ParameterSpec::one_of(requests::STATUSES, "Only return requests in this status").optional(),
        )],
        handler: requests::list,
    },
];

/// Immutable name index over a static tool catalog.
#[derive(Debug)]
pub struct Registry {
    tools: &'static [ToolSpec],
    by_name: HashMap<&'static str, &'static ToolSpec>,
}

impl Registry {
    pub fn new(tools: &'static [ToolSpec]) -> Result<Self, AdapterError> {
        let mut by_name = HashMap::with_capacity(tools.len());
        for spec in tools {
            if by_name.insert(spec.name, spec).is_some() {
                return Err(AdapterError::Config(format!("duplicate tool name: {}", spec.name)));
            }
            if let Some((field, _)) = spec.params.iter().find(|(_, p)| !enum_is_well_formed(p)) {
                return Err(AdapterError::Config(format!(
                    "tool {}: enum parameter '{field}' needs distinct, non-empty values",
                    spec.name
                )));
            }
        }
        Ok(Self { tools, by_name })
    }

    pub fn builtin() -> Result<Self, AdapterError> {
        Self::new(CATALOG)
    }

    pub fn get(&self, name: &str) -> Option<&'static ToolSpec> {
        self.by_name.get(name).copied()
    }

    /// Tools in declaration order.
    pub fn list(&self) -> impl Iterator<Item = &'static ToolSpec> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn enum_is_well_formed(param: &ParameterSpec) -> bool {
    match param.kind {
        ParamKind::Enum(values) => {
            !values.is_empty()
                && values
                    .iter()
                    .enumerate()
                    .all(|(i, v)| !values[..i].contains(v))
        }
        _ => true,
    }
}
