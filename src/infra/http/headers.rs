use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::RequestBuilder;

/// Fixed client identifier sent with every backend request.
pub fn client_id() -> String {
    format!("deskbridge-mcp/{}", env!("CARGO_PKG_VERSION"))
}

/// Generate a simple request id suitable for logging/correlation.
pub fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("db-{}-{}", now.as_secs(), now.subsec_nanos())
}

/// Add credential, client and content headers to an outgoing request.
/// Returns the updated builder and the request id used.
pub fn add_standard_headers(builder: RequestBuilder, api_key: &str) -> (RequestBuilder, String) {
    let rid = generate_request_id();
    let client = client_id();
    let b = builder
        .header("x-api-key", api_key)
        .bearer_auth(api_key)
        .header("x-client", client.as_str())
        .header(USER_AGENT, client.as_str())
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
        .header("x-request-id", rid.as_str());
    (b, rid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_carry_prefix() {
        assert!(generate_request_id().starts_with("db-"));
    }

    #[test]
    fn standard_headers_include_both_credential_forms() {
        let http = reqwest::Client::new();
        let (b, rid) = add_standard_headers(http.get("http://localhost/x"), "secret");
        let req = b.build().unwrap();
        let h = req.headers();
        assert_eq!(h["x-api-key"], "secret");
        assert_eq!(h["authorization"], "Bearer secret");
        assert_eq!(h["x-client"].to_str().unwrap(), client_id());
        assert_eq!(h["x-request-id"].to_str().unwrap(), rid);
    }
}
