//! Test-only helpers: sandbox fixtures and scripted collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::core::types::{Message, ToolSpec};
use crate::error::ToolError;
use crate::io::completion::{CompletionEndpoint, EndpointFailure};
use crate::io::config::{AgentConfig, ToolLimits};
use crate::io::sandbox::{ExtensionSet, Sandbox};
use crate::provider::{LocalProvider, ToolProvider};
use crate::tools::ToolRegistry;

/// Temporary sandbox root, removed on drop.
pub struct SandboxFixture {
    temp: tempfile::TempDir,
    root: PathBuf,
}

impl SandboxFixture {
    /// Create an empty root named `data` inside a fresh temp dir.
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let root = temp.path().join("data");
        fs::create_dir_all(&root).context("create data dir")?;
        let root = root.canonicalize().context("canonicalize data dir")?;
        Ok(Self { temp, root })
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory containing the root, for files that must sit outside it.
    pub fn outside(&self) -> &Path {
        self.temp.path()
    }

    pub fn sandbox(&self) -> Result<Sandbox> {
        Ok(Sandbox::new(
            &self.root,
            ExtensionSet::new(AgentConfig::default().allowed_extensions),
        )?)
    }

    pub fn registry(&self) -> Result<ToolRegistry> {
        Ok(ToolRegistry::new(self.sandbox()?, ToolLimits::default()))
    }

    pub fn provider(&self) -> Result<LocalProvider> {
        Ok(LocalProvider::new(self.registry()?))
    }

    /// Default configuration pointed at this root.
    pub fn config(&self) -> AgentConfig {
        AgentConfig {
            root_dir: self.root.clone(),
            ..AgentConfig::default()
        }
    }
}

/// One scripted completion result.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    /// Fail the call as if the endpoint answered with this HTTP status.
    Status(u16),
}

/// Completion endpoint that replays a fixed script and records every call.
///
/// Running past the end of the script is an `InvalidResponse` failure.
#[derive(Debug, Default)]
pub struct ScriptedEndpoint {
    replies: RefCell<VecDeque<ScriptedReply>>,
    calls: RefCell<Vec<Vec<Message>>>,
}

impl ScriptedEndpoint {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Script made only of text replies.
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            replies
                .into_iter()
                .map(|reply| ScriptedReply::Text(reply.into()))
                .collect(),
        )
    }

    /// Conversations received, one per call.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CompletionEndpoint for ScriptedEndpoint {
    fn complete(&self, messages: &[Message]) -> Result<String, EndpointFailure> {
        self.calls.borrow_mut().push(messages.to_vec());
        match self.replies.borrow_mut().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Status(status)) => Err(EndpointFailure::Status {
                status,
                body: "scripted failure".to_string(),
            }),
            None => Err(EndpointFailure::InvalidResponse(
                "script exhausted".to_string(),
            )),
        }
    }
}

/// Tool provider that returns scripted results and records every call.
///
/// Once the script runs out every call returns an empty observation.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    specs: Vec<ToolSpec>,
    results: RefCell<VecDeque<Result<String, ToolError>>>,
    calls: RefCell<Vec<(String, Map<String, Value>)>>,
}

impl ScriptedProvider {
    pub fn new(specs: Vec<ToolSpec>, results: Vec<Result<String, ToolError>>) -> Self {
        Self {
            specs,
            results: RefCell::new(results.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Tool names and arguments received, in call order.
    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.borrow().clone()
    }
}

impl ToolProvider for ScriptedProvider {
    fn list_capabilities(&self) -> Vec<ToolSpec> {
        self.specs.clone()
    }

    fn call(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError> {
        self.calls
            .borrow_mut()
            .push((name.to_string(), args.clone()));
        self.results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}
