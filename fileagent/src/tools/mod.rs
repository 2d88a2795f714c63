//! Tool registry: the closed set of file tools and their dispatch.
//!
//! The registry is the only way the agent touches the filesystem. It owns
//! the sandbox and the default limits, coerces loosely typed arguments,
//! and renders results as observation text.

mod args;

use std::path::PathBuf;

use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use crate::core::types::{SearchHit, ToolSpec};
use crate::error::ToolError;
use crate::io::catalog::list_files;
use crate::io::config::{AgentConfig, ToolLimits};
use crate::io::reader::read_file;
use crate::io::sandbox::{ExtensionSet, Sandbox};
use crate::io::search::{SearchLimits, SearchRequest, search_files};

pub const LIST_FILES: &str = "list_files";
pub const SEARCH_FILES: &str = "search_files";
pub const READ_FILE: &str = "read_file";

/// Result of one tool call, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Files(Vec<PathBuf>),
    Hits(Vec<SearchHit>),
    Text(String),
}

impl ToolOutput {
    /// Render as observation text for the model.
    ///
    /// File lists (and an empty hit list) are pretty JSON arrays. Hits are
    /// `[HIT n] path=...` blocks separated by blank lines. Text is verbatim.
    pub fn render(&self) -> String {
        match self {
            ToolOutput::Files(paths) => {
                let paths: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                pretty_json(&paths)
            }
            ToolOutput::Hits(hits) if hits.is_empty() => pretty_json(&Vec::<String>::new()),
            ToolOutput::Hits(hits) => {
                let mut blocks = Vec::with_capacity(hits.len() * 3);
                for (idx, hit) in hits.iter().enumerate() {
                    blocks.push(format!("[HIT {}] path={}", idx + 1, hit.path));
                    blocks.push(hit.snippet.join("\n"));
                    blocks.push(String::new());
                }
                blocks.join("\n").trim().to_string()
            }
            ToolOutput::Text(text) => text.clone(),
        }
    }
}

fn pretty_json(items: &[String]) -> String {
    serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
}

/// In-process tool surface confined to one sandbox.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    sandbox: Sandbox,
    limits: ToolLimits,
}

impl ToolRegistry {
    pub fn new(sandbox: Sandbox, limits: ToolLimits) -> Self {
        Self { sandbox, limits }
    }

    /// Build the sandbox from `root_dir` and `allowed_extensions`.
    pub fn from_config(config: &AgentConfig) -> Result<Self, ToolError> {
        let extensions = ExtensionSet::new(&config.allowed_extensions);
        let sandbox = Sandbox::new(&config.root_dir, extensions)?;
        Ok(Self::new(sandbox, config.tools.clone()))
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Published name, description and argument schema of every tool.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let limits = &self.limits;
        let extensions: Vec<&str> = self.sandbox.extensions().iter().collect();
        vec![
            ToolSpec {
                name: LIST_FILES.to_string(),
                description: format!(
                    "List allowed files ({}) under root_dir as absolute paths.",
                    extensions.join(", ")
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "max_files": {
                            "type": "integer",
                            "minimum": 0,
                            "default": limits.max_files,
                            "description": "Maximum number of paths to return."
                        }
                    }
                }),
            },
            ToolSpec {
                name: SEARCH_FILES.to_string(),
                description: "Search allowed files line by line. The query is literal text, or a regular expression when wrapped in slashes like /pattern/.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "minLength": 1,
                            "description": "Text to find, or /regex/."
                        },
                        "max_hits": { "type": "integer", "minimum": 0, "default": limits.max_hits },
                        "context_lines": { "type": "integer", "minimum": 0, "default": limits.context_lines },
                        "case_sensitive": { "type": "boolean", "default": false }
                    },
                    "required": ["query"]
                }),
            },
            ToolSpec {
                name: READ_FILE.to_string(),
                description: "Read one allowed file under root_dir. Long files are truncated.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "minLength": 1,
                            "description": "Path relative to root_dir, or an absolute path inside it."
                        },
                        "max_chars": { "type": "integer", "minimum": 0, "default": limits.max_chars }
                    },
                    "required": ["path"]
                }),
            },
        ]
    }

    /// Run `name` with `args`. `final` and unknown names are
    /// `ToolNotAllowed`; the registry never sees terminal actions.
    #[instrument(skip_all, fields(tool = name))]
    pub fn dispatch(&self, name: &str, args: &Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let output = match name {
            LIST_FILES => {
                let max_files = args::usize_arg(name, args, "max_files", self.limits.max_files)?;
                ToolOutput::Files(list_files(&self.sandbox, max_files)?)
            }
            SEARCH_FILES => {
                let query = args::required_str(name, args, "query")?;
                let request = SearchRequest {
                    query: &query,
                    max_hits: args::usize_arg(name, args, "max_hits", self.limits.max_hits)?,
                    context_lines: args::usize_arg(
                        name,
                        args,
                        "context_lines",
                        self.limits.context_lines,
                    )?,
                    case_sensitive: args::bool_arg(name, args, "case_sensitive", false)?,
                };
                let limits = SearchLimits {
                    file_ceiling: self.limits.search_file_ceiling,
                    regex_size_limit: self.limits.regex_size_limit,
                };
                ToolOutput::Hits(search_files(&self.sandbox, &request, limits)?)
            }
            READ_FILE => {
                let path = args::required_str(name, args, "path")?;
                let max_chars = args::usize_arg(name, args, "max_chars", self.limits.max_chars)?;
                ToolOutput::Text(read_file(&self.sandbox, &path, max_chars)?)
            }
            other => return Err(ToolError::ToolNotAllowed(other.to_string())),
        };
        debug!("tool dispatched");
        Ok(output)
    }
}
