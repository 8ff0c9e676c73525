use reqwest::Method;
use serde_json::json;

use crate::core::{AdapterError, HandlerFuture, ToolArgs, ToolResult, Transport};

use super::fetch;
use super::render::{id_of, items, slugify, title_of, truncate, SNIPPET_CHARS};

pub const SEARCH_LIMIT: &str = "10";
pub const DEFAULT_CATEGORY: &str = "general";

/// `search(query)`: full-text search over the knowledge store.
pub fn search(args: ToolArgs, api: &dyn Transport) -> HandlerFuture<'_> {
    Box::pin(async move {
        let query = args.require_str("query")?;
        let payload = fetch(
            api,
            Method::GET,
            &["search"],
            None,
            &[("q", Some(query)), ("limit", Some(SEARCH_LIMIT))],
        )
        .await?;
        let results = items(&payload, "results");
        tracing::debug!(query, hits = results.len(), "search complete");

        if results.is_empty() {
            return Ok(ToolResult::with_data(
                format!("No results found for \"{query}\"."),
                json!({ "results": [] }),
            ));
        }

        let mut text = format!("Found {} result(s) for \"{query}\":\n", results.len());
        for (i, item) in results.iter().enumerate() {
            text.push_str(&format!("\n{}. {}", i + 1, title_of(item)));
            if let Some(content) = item.get("content").and_then(|c| c.as_str()) {
                text.push_str(&format!("\n   {}", truncate(content, SNIPPET_CHARS)));
            }
        }
        Ok(ToolResult::with_data(text, json!({ "results": results })))
    })
}

/// `knowledge_add(title, content, tags?)`.
pub fn add(args: ToolArgs, api: &dyn Transport) -> HandlerFuture<'_> {
    Box::pin(async move {
        let title = args.require_str("title")?;
        let content = args.require_str("content")?;
        let slug = slugify(title);
        if slug.is_empty() {
            return Err(AdapterError::validation(
                "title",
                "must contain at least one letter or digit",
            ));
        }

        let body = json!({
            "title": title,
            "slug": slug,
            "content": content,
            "tags": args.strings("tags"),
            "category": DEFAULT_CATEGORY,
        });
        let created = fetch(api, Method::POST, &["knowledge"], Some(&body), &[]).await?;

        let text = match id_of(&created) {
            Some(id) => format!("Knowledge entry created: \"{title}\" (id: {id}, slug: {slug})"),
            None => format!("Knowledge entry created: \"{title}\" (slug: {slug})"),
        };
        Ok(ToolResult::with_data(text, created))
    })
}

/// `knowledge_list()`.
pub fn list(_args: ToolArgs, api: &dyn Transport) -> HandlerFuture<'_> {
    Box::pin(async move {
        let payload = fetch(api, Method::GET, &["knowledge"], None, &[]).await?;
        let entries = items(&payload, "entries");

        if entries.is_empty() {
            return Ok(ToolResult::with_data(
                "No knowledge entries found.",
                json!({ "entries": [] }),
            ));
        }

        let mut text = format!("Knowledge entries ({}):\n", entries.len());
        for (i, entry) in entries.iter().enumerate() {
            text.push_str(&format!("\n{}. 📄 {}", i + 1, title_of(entry)));
            let tags: Vec<&str> = entry
                .get("tags")
                .and_then(|t| t.as_array())
                .map(|t| t.iter().filter_map(|v| v.as_str()).collect())
                .unwrap_or_default();
            if !tags.is_empty() {
                text.push_str(&format!(" [{}]", tags.join(", ")));
            }
        }
        Ok(ToolResult::with_data(text, json!({ "entries": entries })))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{args, client};
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn search_enumerates_results_in_order() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", "deploy")
                .query_param("limit", "10");
            then.status(200).json_body(json!({"data": [
                {"title": "Runbook", "content": "Deploy via pipeline"},
                {"title": "Rollback", "content": "x".repeat(250)},
                {"title": "Freeze windows"}
            ]}));
        });

        let api = client(server.base_url());
        let out = search(args(json!({"query": "deploy"})), &api).await.unwrap();
        m.assert();

        assert!(out.text.starts_with("Found 3 result(s) for \"deploy\":"));
        let runbook = out.text.find("1. Runbook").unwrap();
        let rollback = out.text.find("2. Rollback").unwrap();
        let freeze = out.text.find("3. Freeze windows").unwrap();
        assert!(runbook < rollback && rollback < freeze);
        assert!(!out.text.contains("4. "));
        assert!(out.text.contains(&format!("{}...", "x".repeat(200))));
        assert_eq!(out.data.unwrap()["results"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn search_with_no_hits_says_so() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(json!({"data": []}));
        });

        let api = client(server.base_url());
        let out = search(args(json!({"query": "nothing"})), &api).await.unwrap();
        assert_eq!(out.text, "No results found for \"nothing\".");
        assert_eq!(out.data.unwrap(), json!({"results": []}));
    }

    #[tokio::test]
    async fn add_derives_slug_and_applies_defaults() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/knowledge").json_body(json!({
                "title": "Deploy Hotfix!!",
                "slug": "deploy-hotfix",
                "content": "Steps...",
                "tags": [],
                "category": "general"
            }));
            then.status(201).json_body(json!({"data": {"id": "k-9", "slug": "deploy-hotfix"}}));
        });

        let api = client(server.base_url());
        let out = add(
            args(json!({"title": "Deploy Hotfix!!", "content": "Steps..."})),
            &api,
        )
        .await
        .unwrap();
        m.assert();
        assert!(out.text.contains("id: k-9"));
        assert_eq!(out.data.unwrap()["id"], "k-9");
    }

    #[tokio::test]
    async fn add_rejects_titles_without_slug_characters() {
        let api = client("http://127.0.0.1:9".into());
        let err = add(args(json!({"title": "!!!", "content": "c"})), &api)
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Validation { ref field, .. } if field == "title"));
    }

    #[tokio::test]
    async fn list_empty_reports_none_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/knowledge");
            then.status(200).json_body(json!([]));
        });

        let api = client(server.base_url());
        let out = list(args(json!({})), &api).await.unwrap();
        assert!(out.text.contains("No knowledge entries found."));
        assert_eq!(out.data.unwrap()["entries"], json!([]));
    }

    #[tokio::test]
    async fn list_renders_tags() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/knowledge");
            then.status(200).json_body(json!({"data": {"entries": [
                {"id": "k1", "title": "Oncall", "tags": ["ops", "pager"]}
            ]}}));
        });

        let api = client(server.base_url());
        let out = list(args(json!({})), &api).await.unwrap();
        assert!(out.text.contains("1. 📄 Oncall [ops, pager]"));
    }

    #[tokio::test]
    async fn backend_errors_carry_extracted_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/knowledge");
            then.status(500).json_body(json!({"error": {"message": "index offline"}}));
        });

        let api = client(server.base_url());
        let err = list(args(json!({})), &api).await.unwrap_err();
        assert_eq!(err.to_string(), "index offline");
    }
}
