//! Error types for `apibridge-api-tools`.

use thiserror::Error;

/// Main error type for tool execution.
#[derive(Error, Debug)]
pub enum ApiToolsError {
    /// Configuration errors (invalid base URL, invalid HTTP method,
    /// duplicate tool names). Startup-fatal for callers.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An invocation named a tool that is not in the registry.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The target API answered with a non-success status.
    #[error("API request failed: {0}")]
    Request(String),

    /// The target API could not be reached (connect, DNS, timeout).
    #[error("Request failed: {0}")]
    Transport(String),
}

/// Result type alias for tool execution.
pub type Result<T> = std::result::Result<T, ApiToolsError>;

impl From<reqwest::Error> for ApiToolsError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(crate::client::sanitize_reqwest_error(&value))
    }
}
