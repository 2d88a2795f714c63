//! Tool providers: where tool calls are executed.
//!
//! The agent loop only sees [`ToolProvider`]. The local provider runs the
//! in-process registry; the remote provider forwards calls to a tool server
//! over MCP. Both advertise the same capability shape, so prompts and
//! observations look identical either way.

pub mod remote;

use std::path::Path;

use serde_json::{Map, Value};

use crate::core::types::ToolSpec;
use crate::error::ToolError;
use crate::tools::ToolRegistry;

/// A unified "call tool by name with args" capability.
pub trait ToolProvider {
    /// Tools this provider accepts, fixed for its lifetime.
    fn list_capabilities(&self) -> Vec<ToolSpec>;

    /// Run one tool and return the rendered observation text.
    fn call(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError>;

    /// Sandbox root, when it is known on this side of the provider.
    fn root_dir(&self) -> Option<&Path> {
        None
    }
}

impl<T: ToolProvider + ?Sized> ToolProvider for &T {
    fn list_capabilities(&self) -> Vec<ToolSpec> {
        (**self).list_capabilities()
    }

    fn call(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError> {
        (**self).call(name, args)
    }

    fn root_dir(&self) -> Option<&Path> {
        (**self).root_dir()
    }
}

impl<T: ToolProvider + ?Sized> ToolProvider for Box<T> {
    fn list_capabilities(&self) -> Vec<ToolSpec> {
        (**self).list_capabilities()
    }

    fn call(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError> {
        (**self).call(name, args)
    }

    fn root_dir(&self) -> Option<&Path> {
        (**self).root_dir()
    }
}

/// Provider backed by the in-process [`ToolRegistry`].
#[derive(Debug, Clone)]
pub struct LocalProvider {
    registry: ToolRegistry,
}

impl LocalProvider {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }
}

impl ToolProvider for LocalProvider {
    fn list_capabilities(&self) -> Vec<ToolSpec> {
        self.registry.specs()
    }

    fn call(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError> {
        self.registry
            .dispatch(name, args)
            .map(|output| output.render())
    }

    fn root_dir(&self) -> Option<&Path> {
        Some(self.registry.sandbox().root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::ToolLimits;
    use crate::io::sandbox::{ExtensionSet, Sandbox};
    use serde_json::json;

    #[test]
    fn local_provider_renders_and_exposes_root() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("a.md"), "# title\n").expect("write");
        let sandbox = Sandbox::new(temp.path(), ExtensionSet::new(["md"])).expect("sandbox");
        let provider: Box<dyn ToolProvider> = Box::new(LocalProvider::new(ToolRegistry::new(
            sandbox.clone(),
            ToolLimits::default(),
        )));

        assert_eq!(provider.root_dir(), Some(sandbox.root()));
        assert_eq!(provider.list_capabilities().len(), 3);

        let Value::Object(args) = json!({ "path": "a.md" }) else {
            unreachable!()
        };
        assert_eq!(provider.call("read_file", &args).expect("read"), "# title\n");
    }
}
