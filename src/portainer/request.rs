//! Outbound request descriptor
//!
//! Every Portainer operation is described as method + path + query + optional
//! JSON body, built fresh for each call.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Method;
use serde_json::Value;

use super::error::{PortainerError, Result};

/// Characters that cannot appear raw inside a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A single Portainer API call
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, always starting with `/api/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Replaces the client-wide timeout for this call
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter; order is preserved on the wire
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Shorthand for the `endpointId` query parameter used by the stack API
    pub fn endpoint(self, endpoint_id: u64) -> Self {
        self.query("endpointId", endpoint_id)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Encode a caller-supplied identifier as exactly one path segment
///
/// `/`, `?`, `#` and `%` are escaped so the identifier cannot leave its
/// segment. Empty, `.` and `..` are rejected since they would be collapsed.
pub fn path_segment(value: &str) -> Result<String> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(PortainerError::InvalidInput(format!(
            "'{value}' is not a valid path segment"
        )));
    }
    Ok(utf8_percent_encode(value, PATH_SEGMENT).to_string())
}

/// Encode a `/`-separated identifier (e.g. `ghcr.io/acme/api:1.0`) segment by segment
pub fn path_segments(value: &str) -> Result<String> {
    let segments = value
        .split('/')
        .map(path_segment)
        .collect::<Result<Vec<_>>>()?;
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let req = ApiRequest::put("/api/stacks/7")
            .endpoint(1)
            .json(json!({ "stackFileContent": "services: {}" }));

        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.path, "/api/stacks/7");
        assert_eq!(
            req.query,
            vec![("endpointId".to_string(), "1".to_string())]
        );
        assert!(req.body.is_some());
    }

    #[test]
    fn test_query_order_preserved() {
        let req = ApiRequest::post("/api/stacks")
            .query("type", 2)
            .query("method", "repository")
            .endpoint(4);

        let keys: Vec<_> = req.query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["type", "method", "endpointId"]);
        assert!(req.body.is_none());
        assert!(req.timeout.is_none());
    }

    #[test]
    fn test_path_segment_escapes_separators() {
        assert_eq!(path_segment("data").unwrap(), "data");
        assert_eq!(path_segment("nginx:latest").unwrap(), "nginx:latest");
        assert_eq!(path_segment("data?force=true").unwrap(), "data%3Fforce=true");
        assert_eq!(path_segment("a#b").unwrap(), "a%23b");
        assert_eq!(path_segment("../users/8").unwrap(), "..%2Fusers%2F8");
        assert_eq!(path_segment("50%").unwrap(), "50%25");
        assert_eq!(path_segment("my vol").unwrap(), "my%20vol");
    }

    #[test]
    fn test_path_segment_rejects_dot_segments() {
        for value in ["", ".", ".."] {
            assert!(matches!(
                path_segment(value),
                Err(PortainerError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_path_segments_keeps_registry_path() {
        assert_eq!(
            path_segments("ghcr.io/acme/api:1.0").unwrap(),
            "ghcr.io/acme/api:1.0"
        );
        assert_eq!(path_segments("acme/api?x").unwrap(), "acme/api%3Fx");
        assert!(path_segments("../../users/8").is_err());
        assert!(path_segments("library/./nginx").is_err());
        assert!(path_segments("library//nginx").is_err());
    }
}
