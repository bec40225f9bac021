//! MCP surface: bridges the transport's list/call primitives to the tool
//! executor and renders outcomes as text content.

use apibridge_api_tools::registry::ToolRegistry;
use apibridge_api_tools::translate::ToolExecutor;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData, Implementation, JsonObject,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    ToolAnnotations,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

/// MCP request handler for one configured API.
///
/// Cheap to clone: one instance is created per transport session, all
/// sharing the same registry and executor.
#[derive(Clone)]
pub struct Dispatcher {
    title: String,
    registry: Arc<ToolRegistry>,
    executor: Arc<ToolExecutor>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(title: String, registry: Arc<ToolRegistry>, executor: Arc<ToolExecutor>) -> Self {
        Self {
            title,
            registry,
            executor,
        }
    }

    /// Reshape the registry into the transport's tool-descriptor form.
    fn tool_descriptors(&self) -> Vec<Tool> {
        self.registry
            .iter()
            .map(|t| {
                let schema = t
                    .input_schema
                    .as_object()
                    .cloned()
                    .unwrap_or_else(JsonObject::new);
                let mut tool = Tool::new(
                    t.name.clone(),
                    t.description.clone().unwrap_or_default(),
                    Arc::new(schema),
                );
                tool.annotations = Some(annotations_for_method(&t.metadata.method));
                tool
            })
            .collect()
    }

    /// Run a tool call and render the outcome as a single text item.
    ///
    /// Failures never cross this boundary as protocol errors: they are
    /// rendered as `Error: <message>` content so a failing call cannot
    /// terminate the session.
    async fn dispatch_call(&self, name: &str, arguments: Map<String, Value>) -> CallToolResult {
        info!(tool = name, "tool call");

        match self.executor.execute(name, arguments).await {
            Ok(result) => CallToolResult::success(vec![Content::text(render_result(&result))]),
            Err(e) => CallToolResult {
                content: vec![Content::text(format!("Error: {e}"))],
                structured_content: None,
                is_error: Some(true),
                meta: None,
            },
        }
    }
}

impl ServerHandler for Dispatcher {
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.tool_descriptors(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.unwrap_or_default();
        Ok(self.dispatch_call(&request.name, arguments).await)
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: self.title.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::default()
            },
            instructions: None,
            ..ServerInfo::default()
        }
    }
}

/// Pretty-print a result value, with a stable fallback for values the
/// pretty printer rejects.
fn render_result(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Tool annotations derived from RFC 9110 method semantics.
///
/// HTTP-backed tools always talk to an external system, so the open-world
/// hint is set unconditionally; unknown methods carry nothing else.
fn annotations_for_method(method: &str) -> ToolAnnotations {
    let (read_only, destructive, idempotent) = match method.to_ascii_uppercase().as_str() {
        "GET" | "HEAD" | "OPTIONS" => (Some(true), Some(false), Some(true)),
        "POST" => (Some(false), Some(false), Some(false)),
        "PUT" | "DELETE" => (Some(false), Some(true), Some(true)),
        // PATCH may or may not be idempotent; do not guess.
        "PATCH" => (Some(false), Some(true), None),
        _ => (None, None, None),
    };

    ToolAnnotations {
        title: None,
        read_only_hint: read_only,
        destructive_hint: destructive,
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}
