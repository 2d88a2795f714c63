//! Agent configuration loaded from a TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Agent configuration (TOML).
///
/// Every table is optional; missing fields fall back to the defaults below.
/// The configuration is read once at startup and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Directory every tool is confined to. Relative paths resolve against
    /// the working directory.
    pub root_dir: PathBuf,

    /// File suffixes visible to the tools, with or without a leading dot.
    pub allowed_extensions: Vec<String>,

    /// Maximum number of model calls per question.
    pub max_steps: u32,

    pub endpoint: EndpointConfig,

    pub tools: ToolLimits,

    /// When set, tools are served by this remote provider instead of the
    /// in-process registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

/// Wire format spoken by the completion endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    /// Ollama `/api/chat`.
    Ollama,
    /// OpenAI-compatible `/chat/completions`.
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    pub kind: EndpointKind,
    pub url: String,
    pub model: String,
    pub temperature: f64,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Name of an environment variable holding a bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            kind: EndpointKind::Ollama,
            url: "http://localhost:11434/api/chat".to_string(),
            model: "qwen3:8b".to_string(),
            temperature: 0.2,
            timeout_secs: 180,
            api_key_env: None,
        }
    }
}

/// Default argument values and hard limits for the file tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolLimits {
    pub max_files: usize,
    pub max_hits: usize,
    pub context_lines: usize,
    pub max_chars: usize,
    /// Files visited per search, independent of `max_hits`.
    pub search_file_ceiling: usize,
    /// Compiled regex size limit in bytes.
    pub regex_size_limit: usize,
}

impl Default for ToolLimits {
    fn default() -> Self {
        Self {
            max_files: 200,
            max_hits: 25,
            context_lines: 1,
            max_chars: 12_000,
            search_file_ceiling: 1_000,
            regex_size_limit: 1 << 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Command line of the tool-provider process, e.g.
    /// `["fileagent-mcp", "--root", "data"]`.
    pub command: Vec<String>,
}

pub fn default_allowed_extensions() -> Vec<String> {
    ["txt", "md", "py", "json", "yaml", "yml", "log"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("data"),
            allowed_extensions: default_allowed_extensions(),
            max_steps: 6,
            endpoint: EndpointConfig::default(),
            tools: ToolLimits::default(),
            remote: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(anyhow!("root_dir must be non-empty"));
        }
        if self.max_steps == 0 {
            return Err(anyhow!("max_steps must be > 0"));
        }
        if self.endpoint.url.trim().is_empty() {
            return Err(anyhow!("endpoint.url must be non-empty"));
        }
        if self.endpoint.model.trim().is_empty() {
            return Err(anyhow!("endpoint.model must be non-empty"));
        }
        if self.endpoint.timeout_secs == 0 {
            return Err(anyhow!("endpoint.timeout_secs must be > 0"));
        }
        if self.tools.max_chars == 0 {
            return Err(anyhow!("tools.max_chars must be > 0"));
        }
        if self.tools.search_file_ceiling == 0 {
            return Err(anyhow!("tools.search_file_ceiling must be > 0"));
        }
        if self.tools.regex_size_limit == 0 {
            return Err(anyhow!("tools.regex_size_limit must be > 0"));
        }
        if let Some(remote) = &self.remote
            && (remote.command.is_empty() || remote.command[0].trim().is_empty())
        {
            return Err(anyhow!("remote.command must be a non-empty array"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AgentConfig::default()`.
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    if !path.exists() {
        let cfg = AgentConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AgentConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
