//! MCP server exposing the sandboxed file tools over stdio.
//!
//! Every tool call runs through the same [`ToolRegistry`] the in-process
//! agent uses, so the sandbox rules are identical on both sides. Tool
//! failures come back as error results whose text is `<kind>: <message>`.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler};
use serde_json::Value;
use tracing::debug;

use fileagent::tools::ToolRegistry;

#[derive(Debug, Clone)]
pub struct FileToolsServer {
    registry: Arc<ToolRegistry>,
}

impl FileToolsServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// The registry's tool specs as MCP tool descriptors.
    pub fn tools(&self) -> Vec<Tool> {
        self.registry
            .specs()
            .into_iter()
            .map(|spec| {
                let schema = match spec.input_schema {
                    Value::Object(schema) => schema,
                    _ => JsonObject::new(),
                };
                Tool::new(spec.name, spec.description, Arc::new(schema))
            })
            .collect()
    }

    /// Run one tool synchronously and wrap the outcome as a call result.
    pub fn call(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let args = arguments.unwrap_or_default();
        match self.registry.dispatch(name, &args) {
            Ok(output) => {
                debug!(tool = name, "tool call succeeded");
                CallToolResult::success(vec![Content::text(output.render())])
            }
            Err(err) => {
                debug!(tool = name, kind = err.kind(), "tool call failed");
                CallToolResult::error(vec![Content::text(format!("{}: {err}", err.kind()))])
            }
        }
    }
}

impl ServerHandler for FileToolsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Read-only access to text files under one root directory. Use 'search_files' \
                to find relevant lines, 'read_file' to read a file, and 'list_files' to see \
                what is available."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let server = self.clone();
        let name = request.name.to_string();
        tokio::task::spawn_blocking(move || server.call(&name, request.arguments))
            .await
            .map_err(|err| McpError::internal_error(format!("tool task failed: {err}"), None))
    }
}
