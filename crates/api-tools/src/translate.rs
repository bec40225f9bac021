//! Argument classification and tool execution.
//!
//! Callers supply a flat argument mapping with no declared parameter
//! locations. Placement is inferred in layers: path-template placeholders
//! first, then a `header_` naming convention, then an explicit `body`
//! argument, then HTTP method semantics, with the remainder sent as query
//! parameters. Each layer removes what it consumes.

use crate::client::{ApiClient, value_to_string};
use crate::config::path_placeholders;
use crate::error::{ApiToolsError, Result};
use crate::registry::{ToolRegistry, parse_method};
use reqwest::Method;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Prefix marking an argument as an HTTP header.
const HEADER_PREFIX: &str = "header_";

/// An invocation's arguments split into the parts of an HTTP request.
#[derive(Debug, Default, PartialEq)]
pub struct ClassifiedRequest {
    pub path_params: Map<String, Value>,
    pub header_params: BTreeMap<String, String>,
    pub query_params: Map<String, Value>,
    pub body: Option<Value>,
}

/// Executes tool invocations by translating them into API requests.
///
/// Holds the immutable registry and the shared API client; safe to share
/// across concurrent sessions.
pub struct ToolExecutor {
    client: ApiClient,
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    #[must_use]
    pub fn new(client: ApiClient, registry: Arc<ToolRegistry>) -> Self {
        Self { client, registry }
    }

    /// Execute a named tool with the given arguments.
    ///
    /// Upstream API failures are folded into a result-level
    /// `{"error": <message>}` value so tool execution always produces a
    /// result.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` if `name` is not in the registry; this is the
    /// only failure surfaced as an error.
    pub async fn execute(&self, name: &str, arguments: Map<String, Value>) -> Result<Value> {
        let Some(tool) = self.registry.get(name) else {
            return Err(ApiToolsError::UnknownTool(name.to_string()));
        };
        let method = parse_method(&tool.name, &tool.metadata.method)?;

        let request = classify_arguments(&tool.metadata.path, &method, arguments);

        info!(tool = name, method = %method, path = %tool.metadata.path, "executing tool");

        match self
            .client
            .execute(
                method,
                &tool.metadata.path,
                &request.path_params,
                &request.query_params,
                &request.header_params,
                request.body.as_ref(),
            )
            .await
        {
            Ok(response) => Ok(response.into_value()),
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                Ok(json!({ "error": e.to_string() }))
            }
        }
    }
}

/// Split a flat argument mapping into path, header, query, and body parts.
///
/// Precedence (order matters): path placeholders, `header_`-prefixed keys,
/// an explicit `body` argument, then for POST/PUT/PATCH the remaining
/// mapping as a flattened body; whatever is left becomes query parameters.
/// A consumed argument is removed from the mapping, never copied.
#[must_use]
pub fn classify_arguments(
    path_template: &str,
    method: &Method,
    mut arguments: Map<String, Value>,
) -> ClassifiedRequest {
    let mut path_params = Map::new();
    for name in path_placeholders(path_template) {
        if let Some(value) = arguments.remove(&name) {
            path_params.insert(name, value);
        }
    }

    let header_keys: Vec<String> = arguments
        .keys()
        .filter(|key| key.starts_with(HEADER_PREFIX))
        .cloned()
        .collect();
    let mut header_params = BTreeMap::new();
    for key in header_keys {
        if let Some(value) = arguments.remove(&key) {
            let name = key[HEADER_PREFIX.len()..].to_string();
            header_params.insert(name, value_to_string(&value));
        }
    }

    let mut body = arguments.remove("body");
    if body.is_none()
        && matches!(*method, Method::POST | Method::PUT | Method::PATCH)
        && !arguments.is_empty()
    {
        body = Some(Value::Object(std::mem::take(&mut arguments)));
    }

    ClassifiedRequest {
        path_params,
        header_params,
        query_params: arguments,
        body,
    }
}
