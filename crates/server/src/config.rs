//! Configuration files: the generator's `config.json` / `tools.json` pair.
//!
//! Files may be JSON or YAML (by extension). Any failure here is
//! startup-fatal; the process never serves with a partial configuration.

use anyhow::Context as _;
use apibridge_api_tools::config::{CredentialConfig, ToolDefinition};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Display name advertised to MCP clients and the health endpoint.
    pub server_name: String,

    /// Target API base endpoint (absolute or relative; normalized by the
    /// API client).
    pub base_url: String,

    /// Outbound authentication; absent means unauthenticated.
    #[serde(default)]
    pub auth_config: Option<CredentialConfig>,

    /// Bind host for the serving process.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the serving process.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Registry file shape: `{"tools": [...]}`.
#[derive(Debug, Default, Deserialize)]
struct ToolsFile {
    #[serde(default)]
    tools: Vec<ToolDefinition>,
}

/// Load the server configuration file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
    parse_file(path)
}

/// Load the tool registry definitions.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_tools(path: &Path) -> anyhow::Result<Vec<ToolDefinition>> {
    let file: ToolsFile = parse_file(path)?;
    Ok(file.tools)
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;

    let yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if yaml {
        serde_yaml::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    } else {
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::{load_config, load_tools};
    use tempfile::tempdir;

    #[test]
    fn loads_json_config_with_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "server_name": "petstore",
                "base_url": "https://petstore.example.com/v2",
                "auth_config": {
                    "type": "apiKey",
                    "credentials": { "name": "X-Key", "value": "secret" }
                }
            }"#,
        )
        .expect("write config");

        let cfg = load_config(&path).expect("load config");
        assert_eq!(cfg.server_name, "petstore");
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8000);
        let auth = cfg.auth_config.expect("auth config");
        assert_eq!(auth.auth_type.as_deref(), Some("apiKey"));
    }

    #[test]
    fn loads_yaml_config_by_extension() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "server_name: petstore\nbase_url: /api/v2\nhost: 127.0.0.1\nport: 9000\n",
        )
        .expect("write config");

        let cfg = load_config(&path).expect("load config");
        assert_eq!(cfg.base_url, "/api/v2");
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        // Generated configs may carry fields this server no longer uses
        // (e.g. the legacy per-process session_id).
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "server_name": "s", "base_url": "/x", "session_id": "legacy" }"#,
        )
        .expect("write config");

        assert!(load_config(&path).is_ok());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").expect("write config");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn loads_tool_registry_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("tools.json");
        std::fs::write(
            &path,
            r#"{
                "tools": [
                    {
                        "name": "getPet",
                        "description": "Fetch one pet",
                        "inputSchema": { "type": "object" },
                        "metadata": { "method": "GET", "path": "/pets/{petId}" }
                    }
                ]
            }"#,
        )
        .expect("write tools");

        let tools = load_tools(&path).expect("load tools");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].metadata.path, "/pets/{petId}");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        assert!(load_tools(&dir.path().join("absent.json")).is_err());
    }
}
