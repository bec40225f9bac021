//! Static configuration types shared by the credential provider and the
//! tool registry.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// How outbound calls to the target API are authenticated.
///
/// The shape mirrors the generator's `config.json`: a `type` discriminator
/// plus a bag of credential fields, of which only some apply per type. The
/// discriminator is kept as a free-form string so unknown values stay
/// representable; they downgrade to a warning instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialConfig {
    /// "apiKey" | "http" | "oauth2"; unset means unauthenticated.
    #[serde(rename = "type", default)]
    pub auth_type: Option<String>,

    #[serde(default)]
    pub credentials: CredentialFields,
}

/// Credential fields; only the fields relevant to the selected type are
/// read. Secret-bearing fields must never appear in log output.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialFields {
    /// apiKey: "header" | "query" (default "header").
    #[serde(default)]
    pub location: Option<String>,

    /// apiKey: parameter name.
    #[serde(default)]
    pub name: Option<String>,

    /// apiKey: the key itself.
    #[serde(default)]
    pub value: Option<String>,

    /// http: "bearer" | "basic" (default "bearer").
    #[serde(default)]
    pub scheme: Option<String>,

    /// http+bearer token.
    #[serde(default)]
    pub token: Option<String>,

    /// http+basic username.
    #[serde(default)]
    pub username: Option<String>,

    /// http+basic password.
    #[serde(default)]
    pub password: Option<String>,

    /// oauth2 pre-issued access token (no refresh flow).
    #[serde(default)]
    pub access_token: Option<String>,
}

impl CredentialFields {
    /// True when no credential field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let Self {
            location,
            name,
            value,
            scheme,
            token,
            username,
            password,
            access_token,
        } = self;
        [
            location,
            name,
            value,
            scheme,
            token,
            username,
            password,
            access_token,
        ]
        .iter()
        .all(|field| field.as_deref().is_none_or(str::is_empty))
    }
}

/// One tool as loaded from the registry file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name, unique within the registry.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// JSON Schema for the flat argument mapping.
    #[serde(default = "default_input_schema")]
    pub input_schema: Value,

    /// HTTP binding for the backing endpoint.
    pub metadata: HttpBinding,
}

/// Method + path template binding a tool to one endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpBinding {
    /// HTTP method name, e.g. "GET".
    pub method: String,

    /// Path template with `{param}` placeholders, e.g. `/pets/{petId}`.
    pub path: String,
}

fn default_input_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

/// `{name}` placeholders in a path template, deduplicated, in order of
/// first appearance.
#[must_use]
pub fn path_placeholders(template: &str) -> Vec<String> {
    static PLACEHOLDER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

    let mut names: Vec<String> = Vec::new();
    for captures in PLACEHOLDER.captures_iter(template) {
        let name = &captures[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
