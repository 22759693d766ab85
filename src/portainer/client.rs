//! Portainer API client
//!
//! Holds the immutable connection settings and executes [`ApiRequest`]s.
//! Per-resource operations live in sibling modules as further `impl` blocks.

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client,
};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::error::{PortainerError, Result};
use super::request::ApiRequest;

const API_KEY_HEADER: &str = "x-api-key";

/// Connection settings, fixed at startup
#[derive(Clone, Debug)]
pub struct ClientSettings {
    /// Portainer base URL, e.g. `https://portainer.example.com:9443`
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Accept self-signed certificates
    pub insecure_skip_verify: bool,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: 30,
            insecure_skip_verify: false,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure_skip_verify = insecure;
        self
    }
}

/// Client for the Portainer REST API
///
/// Stateless apart from the settings it was built with; clones share the
/// underlying connection pool and may be used concurrently.
#[derive(Clone, Debug)]
pub struct PortainerClient {
    http: Client,
    base_url: String,
    timeout_secs: u64,
}

impl PortainerClient {
    /// Build a client that sends the API key and JSON headers on every request
    pub fn new(settings: ClientSettings) -> Result<Self> {
        if settings.base_url.trim().is_empty() {
            return Err(PortainerError::InvalidConfig(
                "Portainer URL must not be empty".to_string(),
            ));
        }
        if settings.timeout_secs == 0 {
            return Err(PortainerError::InvalidConfig(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        let mut api_key = HeaderValue::from_str(&settings.api_key).map_err(|_| {
            PortainerError::InvalidConfig("API key contains invalid header characters".to_string())
        })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if settings.insecure_skip_verify {
            warn!("TLS certificate verification is disabled for {}", settings.base_url);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(settings.insecure_skip_verify)
            .build()
            .map_err(|e| PortainerError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout_secs: settings.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the raw response body
    ///
    /// A 4xx or 5xx status becomes [`PortainerError::Upstream`] carrying the
    /// body. Anything below 400 (including Docker's 304) is success.
    pub async fn execute(&self, request: ApiRequest) -> Result<String> {
        let url = self.build_url(&request.path);
        debug!("Sending {} request to {}", request.method, url);

        let mut req_builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }
        let timeout_secs = match request.timeout {
            Some(timeout) => {
                req_builder = req_builder.timeout(timeout);
                timeout.as_secs()
            }
            None => self.timeout_secs,
        };

        let start = Instant::now();
        let response = req_builder
            .send()
            .await
            .map_err(|e| transport_error(&url, timeout_secs, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&url, timeout_secs, e))?;

        debug!(
            "Response: {} {} in {}ms",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            start.elapsed().as_millis()
        );

        if status.is_client_error() || status.is_server_error() {
            return Err(PortainerError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// Send a request and decode the body; `None` when Portainer sent no body
    pub async fn send(&self, request: ApiRequest) -> Result<Option<Value>> {
        let path = request.path.clone();
        let body = self.execute(request).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| PortainerError::Decode {
                url: self.build_url(&path),
                message: e.to_string(),
            })
    }

    /// Send a request whose success body is required
    pub async fn send_json(&self, request: ApiRequest) -> Result<Value> {
        let path = request.path.clone();
        self.send(request)
            .await?
            .ok_or_else(|| PortainerError::Decode {
                url: self.build_url(&path),
                message: "empty response body".to_string(),
            })
    }

    /// Send a request, falling back to `{"status": <status>}` on an empty body
    pub async fn send_or_status(&self, request: ApiRequest, status: &str) -> Result<Value> {
        Ok(self
            .send(request)
            .await?
            .unwrap_or_else(|| status_object(status)))
    }

    /// Send a request, ignore whatever Portainer sent back and report `status`
    pub async fn send_for_status(&self, request: ApiRequest, status: &str) -> Result<Value> {
        self.execute(request).await?;
        Ok(status_object(status))
    }

}

fn transport_error(url: &str, timeout_secs: u64, err: reqwest::Error) -> PortainerError {
    if err.is_timeout() {
        PortainerError::Timeout {
            url: url.to_string(),
            timeout_secs,
        }
    } else {
        PortainerError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Status object substituted for an empty or ignored upstream body
pub fn status_object(status: &str) -> Value {
    json!({ "status": status })
}
