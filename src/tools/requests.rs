use reqwest::Method;
use serde_json::json;

use crate::core::{HandlerFuture, ToolArgs, ToolResult, Transport};

use super::fetch;
use super::render::{field, id_of, items, priority_icon, title_of};

pub const PRIORITIES: &[&str] = &["low", "medium", "high", "critical"];
pub const STATUSES: &[&str] = &["open", "in_progress", "resolved"];
pub const DEFAULT_PRIORITY: &str = "medium";

/// `request_create(title, description?, priority?)`.
pub fn create(args: ToolArgs, api: &dyn Transport) -> HandlerFuture<'_> {
    Box::pin(async move {
        let title = args.require_str("title")?;
        let priority = args.str("priority").unwrap_or(DEFAULT_PRIORITY);
        let body = json!({
            "title": title,
            "description": args.str("description").unwrap_or_default(),
            "priority": priority,
        });
        let created = fetch(api, Method::POST, &["requests"], Some(&body), &[]).await?;

        let icon = priority_icon(priority);
        let text = match id_of(&created) {
            Some(id) => format!("Request created: \"{title}\" (id: {id}, priority: {icon} {priority})"),
            None => format!("Request created: \"{title}\" (priority: {icon} {priority})"),
        };
        Ok(ToolResult::with_data(text, created))
    })
}

/// `requests_list(status?)`.
pub fn list(args: ToolArgs, api: &dyn Transport) -> HandlerFuture<'_> {
    Box::pin(async move {
        let status = args.str("status");
        let payload = fetch(api, Method::GET, &["requests"], None, &[("status", status)]).await?;
        let requests = items(&payload, "requests");

        if requests.is_empty() {
            let text = match status {
                Some(s) => format!("No requests found with status \"{s}\"."),
                None => "No requests found.".to_owned(),
            };
            return Ok(ToolResult::with_data(text, json!({ "requests": [] })));
        }

        let mut text = format!("Requests ({}):\n", requests.len());
        for (i, item) in requests.iter().enumerate() {
            let priority = field(item, &["priority"]).unwrap_or_default();
            let item_status = field(item, &["status"]).unwrap_or_else(|| "unknown".to_owned());
            text.push_str(&format!(
                "\n{}. {} {} [{item_status}]",
                i + 1,
                priority_icon(&priority),
                title_of(item)
            ));
            if let Some(id) = id_of(item) {
                text.push_str(&format!(" (id: {id})"));
            }
        }
        Ok(ToolResult::with_data(text, json!({ "requests": requests })))
    })
}
