//! The tool registry: named endpoint bindings, loaded once at startup and
//! read-only thereafter.

use crate::config::ToolDefinition;
use crate::error::{ApiToolsError, Result};
use reqwest::Method;
use std::collections::HashSet;

/// Immutable lookup table of the tools exposed to agent clients.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Build a registry from loaded definitions, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for duplicate tool names or invalid
    /// HTTP methods; both are startup-fatal for the caller.
    pub fn new(tools: Vec<ToolDefinition>) -> Result<Self> {
        let mut names: HashSet<&str> = HashSet::new();
        for tool in &tools {
            if !names.insert(tool.name.as_str()) {
                return Err(ApiToolsError::Config(format!(
                    "Duplicate tool name '{}' in registry",
                    tool.name
                )));
            }
            parse_method(&tool.name, &tool.metadata.method)?;
        }
        Ok(Self { tools })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tools in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }
}

/// Parse a tool's HTTP method string, case-insensitively.
pub(crate) fn parse_method(tool_name: &str, method: &str) -> Result<Method> {
    method.trim().to_uppercase().parse().map_err(|_| {
        ApiToolsError::Config(format!(
            "Invalid HTTP method '{method}' in tool '{tool_name}'"
        ))
    })
}
