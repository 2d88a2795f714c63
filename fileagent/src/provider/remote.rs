//! Remote tool provider reached over an MCP stdio session.
//!
//! The provider process is spawned once, the capability handshake and tool
//! listing happen at connect time, and every call afterwards is a blocking
//! request/response round trip. The session owns a small private runtime so
//! the agent loop stays synchronous.

use anyhow::{Context, Result, anyhow};
use rmcp::model::{CallToolRequestParam, Content, Tool};
use rmcp::service::{RoleClient, RunningService, ServiceExt};
use rmcp::transport::TokioChildProcess;
use serde_json::{Map, Value};
use tokio::process::Command;
use tokio::runtime::Runtime;
use tracing::{debug, info, instrument};

use crate::core::types::ToolSpec;
use crate::error::ToolError;
use crate::provider::ToolProvider;

/// Field order matters: the session is dropped before its runtime.
pub struct McpProvider {
    service: RunningService<RoleClient, ()>,
    tools: Vec<ToolSpec>,
    runtime: Runtime,
}

impl std::fmt::Debug for McpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpProvider")
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

impl McpProvider {
    /// Spawn `command` (program followed by its arguments), initialize the
    /// session and list the remote tools.
    #[instrument(skip_all, fields(program = command.first().map(String::as_str).unwrap_or_default()))]
    pub fn connect(command: &[String]) -> Result<Self> {
        let (program, rest) = command
            .split_first()
            .ok_or_else(|| anyhow!("remote command is empty"))?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .context("build tool provider runtime")?;

        let (service, tools) = runtime.block_on(async {
            let mut cmd = Command::new(program);
            cmd.args(rest);
            let transport = TokioChildProcess::new(cmd)
                .with_context(|| format!("spawn tool provider {program}"))?;
            let service = ().serve(transport)
                .await
                .context("initialize tool provider session")?;
            let listed = service
                .list_tools(Default::default())
                .await
                .context("list remote tools")?;
            Ok::<_, anyhow::Error>((service, listed.tools))
        })?;

        let tools: Vec<ToolSpec> = tools.into_iter().map(tool_spec).collect();
        info!(tools = tools.len(), "tool provider session ready");
        Ok(Self {
            service,
            tools,
            runtime,
        })
    }

    /// Close the session and wait for the provider to shut down.
    pub fn shutdown(self) -> Result<()> {
        let Self {
            service, runtime, ..
        } = self;
        runtime
            .block_on(service.cancel())
            .context("shut down tool provider session")?;
        Ok(())
    }
}

impl ToolProvider for McpProvider {
    fn list_capabilities(&self) -> Vec<ToolSpec> {
        self.tools.clone()
    }

    #[instrument(skip_all, fields(tool = name))]
    fn call(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError> {
        if !self.tools.iter().any(|tool| tool.name == name) {
            return Err(ToolError::ToolNotAllowed(name.to_string()));
        }

        let request = CallToolRequestParam {
            name: name.to_string().into(),
            arguments: Some(args.clone()),
        };
        let result = self
            .runtime
            .block_on(self.service.call_tool(request))
            .map_err(|err| ToolError::Remote(format!("call {name} failed: {err}")))?;

        let text = join_content(&result.content);
        if result.is_error == Some(true) {
            return Err(ToolError::from_remote(text));
        }
        debug!(chars = text.len(), "remote tool returned");
        Ok(text)
    }
}

fn tool_spec(tool: Tool) -> ToolSpec {
    ToolSpec {
        name: tool.name.to_string(),
        description: tool
            .description
            .map(|description| description.to_string())
            .unwrap_or_default(),
        input_schema: Value::Object((*tool.input_schema).clone()),
    }
}

/// Text blocks joined by newlines; other block kinds as their JSON.
fn join_content(content: &[Content]) -> String {
    content
        .iter()
        .map(|block| match block.as_text() {
            Some(text) => text.text.clone(),
            None => serde_json::to_string(block).unwrap_or_default(),
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn joins_text_blocks_and_trims() {
        let content = vec![Content::text("first\n"), Content::text("second  ")];
        assert_eq!(join_content(&content), "first\n\nsecond");
        assert_eq!(join_content(&[]), "");
    }

    #[test]
    fn converts_tool_descriptions() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "path": { "type": "string" } }
        });
        let Value::Object(schema) = schema else {
            unreachable!()
        };
        let tool = Tool::new("read_file", "Read one file.", Arc::new(schema));
        let spec = tool_spec(tool);
        assert_eq!(spec.name, "read_file");
        assert_eq!(spec.description, "Read one file.");
        assert_eq!(spec.argument_keys(), vec!["path"]);
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = McpProvider::connect(&[]).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
