//! System prompt rendering.

use std::path::Path;

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::core::types::ToolSpec;

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");

#[derive(Debug, Serialize)]
struct ToolContext<'a> {
    name: &'a str,
    description: &'a str,
    args: Vec<String>,
}

/// Render the system prompt for one question.
///
/// `root_dir` is `None` when the tools live in a remote provider whose root
/// is not known locally. The tool list comes from the provider's advertised
/// capabilities, so local and remote prompts have the same shape.
pub fn render_system_prompt(root_dir: Option<&Path>, tools: &[ToolSpec]) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("system", SYSTEM_TEMPLATE)
        .context("load system prompt template")?;
    let template = env.get_template("system")?;

    let tool_names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
    let tools: Vec<ToolContext<'_>> = tools
        .iter()
        .map(|tool| ToolContext {
            name: &tool.name,
            description: tool.description.trim(),
            args: tool.argument_keys(),
        })
        .collect();

    let rendered = template
        .render(context! {
            root_dir => root_dir.map(|p| p.display().to_string()),
            tool_names => tool_names,
            tools => tools,
        })
        .context("render system prompt")?;
    Ok(rendered.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn specs() -> Vec<ToolSpec> {
        vec![
            ToolSpec {
                name: "search_files".to_string(),
                description: "Search text in allowed files.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "query": {}, "max_hits": {} }
                }),
            },
            ToolSpec {
                name: "read_file".to_string(),
                description: "Read one file.".to_string(),
                input_schema: json!({ "type": "object", "properties": { "path": {} } }),
            },
        ]
    }

    #[test]
    fn lists_root_tools_and_rules() {
        let prompt = render_system_prompt(Some(Path::new("/srv/data")), &specs()).expect("render");
        assert!(prompt.contains("root_dir = /srv/data"));
        assert!(prompt.contains("\"tool\": \"search_files|read_file\""));
        assert!(prompt.contains("- search_files: Search text in allowed files."));
        assert!(prompt.contains("args: max_hits, query"));
        assert!(prompt.contains("file:<path>#L<start>-L<end>"));
        assert!(prompt.contains("file:<path>#(read)"));
        assert!(prompt.contains("ONLY valid JSON"));
    }

    #[test]
    fn remote_prompt_has_no_local_root() {
        let prompt = render_system_prompt(None, &specs()).expect("render");
        assert!(prompt.contains("managed by the tool provider"));
        assert!(!prompt.contains("/srv/data"));
    }
}
