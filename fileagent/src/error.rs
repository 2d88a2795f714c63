//! Tool-level error taxonomy.
//!
//! Every variant is recoverable: the agent loop catches it at the dispatch
//! boundary and feeds it back to the model as a `TOOL_ERROR` observation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// The candidate path resolves outside the sandbox root.
    #[error("path is outside root_dir: {}", .path.display())]
    AccessDenied { path: PathBuf },

    #[error("root_dir not found or not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("file extension not allowed: {0:?}")]
    ExtensionNotAllowed(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Empty query, empty regex body, or a pattern that fails to compile.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("tool not allowed: {0}")]
    ToolNotAllowed(String),

    #[error("{tool} requires {message}")]
    InvalidArgument { tool: String, message: String },

    /// A remote provider failure that named one of the kinds above.
    #[error("{message}")]
    Reported { kind: String, message: String },

    /// Failure reported by (or while talking to) a remote tool provider.
    #[error("{0}")]
    Remote(String),
}

/// Kinds a tool provider may report as the `<kind>: ` prefix of an error.
const REPORTABLE_KINDS: &[&str] = &[
    "AccessDenied",
    "RootNotFound",
    "ExtensionNotAllowed",
    "FileNotFound",
    "InvalidQuery",
    "ToolNotAllowed",
    "InvalidArgument",
];

impl ToolError {
    /// Stable error kind used in observations.
    pub fn kind(&self) -> &str {
        match self {
            ToolError::AccessDenied { .. } => "AccessDenied",
            ToolError::RootNotFound(_) => "RootNotFound",
            ToolError::ExtensionNotAllowed(_) => "ExtensionNotAllowed",
            ToolError::FileNotFound(_) => "FileNotFound",
            ToolError::InvalidQuery(_) => "InvalidQuery",
            ToolError::ToolNotAllowed(_) => "ToolNotAllowed",
            ToolError::InvalidArgument { .. } => "InvalidArgument",
            ToolError::Reported { kind, .. } => kind.as_str(),
            ToolError::Remote(_) => "RemoteToolError",
        }
    }

    /// Rebuild an error from a remote `<kind>: <message>` text.
    ///
    /// Text without a known kind prefix stays a plain `Remote` error.
    pub fn from_remote(text: String) -> Self {
        match text.split_once(": ") {
            Some((kind, message)) if REPORTABLE_KINDS.contains(&kind) => ToolError::Reported {
                kind: kind.to_string(),
                message: message.to_string(),
            },
            _ => ToolError::Remote(text),
        }
    }

    pub(crate) fn invalid_argument(tool: &str, message: impl Into<String>) -> Self {
        ToolError::InvalidArgument {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    /// Render as the observation string handed back to the model.
    pub fn to_observation(&self) -> String {
        format!("TOOL_ERROR: {}: {}", self.kind(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_carries_kind_and_message() {
        let err = ToolError::AccessDenied {
            path: PathBuf::from("/etc/passwd"),
        };
        assert_eq!(
            err.to_observation(),
            "TOOL_ERROR: AccessDenied: path is outside root_dir: /etc/passwd"
        );
    }

    #[test]
    fn invalid_argument_names_the_tool() {
        let err = ToolError::invalid_argument("read_file", "'path'");
        assert_eq!(err.kind(), "InvalidArgument");
        assert_eq!(err.to_string(), "read_file requires 'path'");
    }

    #[test]
    fn remote_text_with_known_kind_keeps_that_kind() {
        let err = ToolError::from_remote(
            "AccessDenied: path is outside root_dir: /etc/passwd".to_string(),
        );
        assert_eq!(err.kind(), "AccessDenied");
        assert_eq!(
            err.to_observation(),
            "TOOL_ERROR: AccessDenied: path is outside root_dir: /etc/passwd"
        );
    }

    #[test]
    fn remote_text_without_known_kind_stays_remote() {
        for text in ["connection reset", "Boom: unexpected", ""] {
            let err = ToolError::from_remote(text.to_string());
            assert_eq!(err.kind(), "RemoteToolError", "text {text:?}");
            assert_eq!(err.to_string(), text);
        }
    }
}
