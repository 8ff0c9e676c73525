use reqwest::Method;
use serde_json::json;

use crate::clients::envelope::parse_envelope;
use crate::core::{AdapterError, HandlerFuture, ToolArgs, ToolResult, Transport};

use super::fetch;
use super::render::{approval_icon, field, id_of, items, timestamp, title_of};

pub const STATUSES: &[&str] = &["pending", "approved", "rejected"];
pub const DEFAULT_URGENCY: &str = "normal";

/// `approval_request(title, description)`.
pub fn request(args: ToolArgs, api: &dyn Transport) -> HandlerFuture<'_> {
    Box::pin(async move {
        let title = args.require_str("title")?;
        let description = args.require_str("description")?;
        let body = json!({
            "title": title,
            "description": description,
            "urgency": DEFAULT_URGENCY,
        });
        let created = fetch(api, Method::POST, &["approvals"], Some(&body), &[]).await?;

        let mut details: Vec<String> = Vec::new();
        if let Some(id) = id_of(&created) {
            details.push(format!("id: {id}"));
        }
        if let Some(status) = field(&created, &["status"]) {
            details.push(format!("status: {} {status}", approval_icon(&status)));
        }
        let text = if details.is_empty() {
            format!("Approval requested: \"{title}\"")
        } else {
            format!("Approval requested: \"{title}\" ({})", details.join(", "))
        };
        Ok(ToolResult::with_data(text, created))
    })
}

/// `approval_check(id)`. A 404 is reported as "not found" rather than a
/// generic HTTP failure.
pub fn check(args: ToolArgs, api: &dyn Transport) -> HandlerFuture<'_> {
    Box::pin(async move {
        let id = approval_id(&args)?;
        let result = api.call(Method::GET, &["approvals", id], None, &[]).await?;
        if result.status == 404 {
            return Err(AdapterError::NotFound(format!("Approval not found: {id}")));
        }
        let approval = parse_envelope(&result).into_result()?;

        let status = field(&approval, &["status"]).unwrap_or_else(|| "unknown".to_owned());
        let mut text = format!("Approval {id}: {} {status}", approval_icon(&status));
        if let Some(title) = field(&approval, &["title"]) {
            text.push_str(&format!("\nTitle: {title}"));
        }
        if let Some(at) = field(&approval, &["decided_at", "decidedAt"]) {
            text.push_str(&format!("\nDecided at: {}", timestamp(&at)));
        }
        if let Some(by) = field(&approval, &["decided_by", "decidedBy"]) {
            text.push_str(&format!("\nDecided by: {by}"));
        }
        if let Some(note) = field(&approval, &["decision_note", "decisionNote", "note"]) {
            text.push_str(&format!("\nNote: {note}"));
        }
        Ok(ToolResult::with_data(text, approval))
    })
}

/// The id is sent as one path segment, so it must be non-blank and cannot be
/// a dot segment, which URLs resolve away.
fn approval_id(args: &ToolArgs) -> Result<&str, AdapterError> {
    let id = args.require_str("id")?;
    if id.trim().is_empty() {
        return Err(AdapterError::validation("id", "must not be empty"));
    }
    let decoded = id.to_ascii_lowercase().replace("%2e", ".");
    if decoded == "." || decoded == ".." {
        return Err(AdapterError::validation("id", "must not be a dot segment"));
    }
    Ok(id)
}

/// `approvals_list(status?)`.
pub fn list(args: ToolArgs, api: &dyn Transport) -> HandlerFuture<'_> {
    Box::pin(async move {
        let status = args.str("status");
        let payload = fetch(api, Method::GET, &["approvals"], None, &[("status", status)]).await?;
        let approvals = items(&payload, "approvals");

        if approvals.is_empty() {
            let text = match status {
                Some(s) => format!("No approvals found with status \"{s}\"."),
                None => "No approvals found.".to_owned(),
            };
            return Ok(ToolResult::with_data(text, json!({ "approvals": [] })));
        }

        let mut text = format!("Approvals ({}):\n", approvals.len());
        for (i, item) in approvals.iter().enumerate() {
            let item_status = field(item, &["status"]).unwrap_or_else(|| "unknown".to_owned());
            text.push_str(&format!(
                "\n{}. {} {} [{item_status}]",
                i + 1,
                approval_icon(&item_status),
                title_of(item)
            ));
            if let Some(id) = id_of(item) {
                text.push_str(&format!(" (id: {id})"));
            }
        }
        Ok(ToolResult::with_data(text, json!({ "approvals": approvals })))
    })
}
