//! Outbound HTTP execution against the target API.

use crate::auth::CredentialProvider;
use crate::config::path_placeholders;
use crate::error::{ApiToolsError, Result};
use reqwest::{Client, Method};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Fixed per-request deadline. Expiry is a reported error, never fatal.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Decoded response payload from the target API.
///
/// Structured decode is attempted first; bodies that are not valid JSON are
/// carried as raw text instead of failing the call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Text(String),
}

impl ApiResponse {
    /// Collapse to a JSON value, wrapping raw text as `{"data": <text>}`.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            ApiResponse::Json(value) => value,
            ApiResponse::Text(text) => json!({ "data": text }),
        }
    }
}

/// HTTP client for the target API.
///
/// Holds the normalized base URL, the credential provider, and a pooled
/// `reqwest::Client` created once at construction. Stateless per call and
/// safe to share across concurrent tool calls; the connection pool is
/// released when the owning context drops at shutdown.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    auth: CredentialProvider,
    client: Client,
}

impl ApiClient {
    /// Build a client for `base_url`.
    ///
    /// The endpoint may be supplied loosely (host-relative path, missing
    /// scheme); it is normalized so every issued request carries a
    /// fully-qualified scheme.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the normalized endpoint is not a
    /// valid URL or the HTTP client cannot be built.
    pub fn new(base_url: &str, auth: CredentialProvider) -> Result<Self> {
        let base_url = normalize_endpoint(base_url);
        Url::parse(&base_url)
            .map_err(|e| ApiToolsError::Config(format!("Invalid base URL '{base_url}': {e}")))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiToolsError::Config(format!("Failed to build HTTP client: {e}")))?;

        debug!(base_url = %base_url, "initialized API client");
        Ok(Self {
            base_url,
            auth,
            client,
        })
    }

    /// The normalized base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute one request against the target API.
    ///
    /// Path parameters are substituted into `{key}` placeholders of the
    /// template. Credential-derived headers and query parameters form the
    /// base layer; call-specific entries overlay and win on key collision.
    /// The body is JSON-encoded and sent only when present and non-null.
    ///
    /// # Errors
    ///
    /// Returns `Request` for a non-success status (message carries status
    /// code and body text) and `Transport` for connect/DNS/timeout failures.
    pub async fn execute(
        &self,
        method: Method,
        path_template: &str,
        path_params: &Map<String, Value>,
        query_params: &Map<String, Value>,
        headers: &BTreeMap<String, String>,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let url = self.build_url(path_template, path_params)?;

        let mut query: BTreeMap<String, String> = self.auth.query_params();
        for (key, value) in query_params {
            query.insert(key.clone(), value_to_string(value));
        }

        let mut merged_headers = self.auth.headers();
        for (key, value) in headers {
            merged_headers.insert(key.clone(), value.clone());
        }

        info!(method = %method, url = %redact_url(&url), "executing request");

        let mut request = self.client.request(method, url);
        if !query.is_empty() {
            request = request.query(&query);
        }
        for (key, value) in &merged_headers {
            request = request.header(key, value);
        }
        if let Some(payload) = body.filter(|b| !b.is_null()) {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() || status.is_redirection() {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => Ok(ApiResponse::Json(value)),
                Err(_) => Ok(ApiResponse::Text(text)),
            }
        } else {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            warn!(status = status.as_u16(), "target API returned an error status");
            Err(ApiToolsError::Request(format!(
                "{} {reason}: {text}",
                status.as_u16()
            )))
        }
    }

    fn build_url(&self, path_template: &str, path_params: &Map<String, Value>) -> Result<Url> {
        let mut path = path_template.to_string();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        for (key, value) in path_params {
            path = path.replace(&format!("{{{key}}}"), &value_to_string(value));
        }

        // Placeholders with no matching argument stay verbatim in the URL;
        // surface them in the log so misconfigured calls are traceable.
        for leftover in path_placeholders(&path) {
            warn!(placeholder = %leftover, path = %path, "path placeholder left unresolved");
        }

        Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| ApiToolsError::Config(format!("Invalid request URL for '{path}': {e}")))
    }
}

/// Normalize a loosely-supplied endpoint to a fully-qualified base URL.
///
/// Host-relative paths are assumed to target a service on the local
/// machine; bare hosts get `https://` unless they name a loopback address.
fn normalize_endpoint(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');

    if trimmed.starts_with('/') {
        return format!("http://localhost{trimmed}");
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }

    let scheme = if trimmed.contains("localhost") || trimmed.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };
    format!("{scheme}://{trimmed}")
}

/// Render a scalar as its query/path string form; structured values fall
/// back to compact JSON.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

/// Drop credentials, query, and fragment from a URL before logging it.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    let _ = redacted.set_username("");
    let _ = redacted.set_password(None);
    redacted.set_query(None);
    redacted.set_fragment(None);
    redacted.to_string()
}

/// Strip any full URL (which may carry secrets in its query) out of a
/// reqwest error message.
#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    if let Some(url) = e.url() {
        message = message.replace(url.as_str(), &redact_url(url));
    }
    message
}
