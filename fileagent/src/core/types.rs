//! Shared deterministic types for the agent core.
//!
//! These types define stable contracts between the codec, the tools and the
//! control loop. They do not depend on external state or I/O.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Speaker of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged conversation entry, shaped like a chat API message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A single search match with its surrounding context.
///
/// Hits are immutable once produced. `snippet` holds the rendered context
/// lines, the matched line marked with `>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: String,
    pub line_no: usize,
    pub snippet: Vec<String>,
}

/// A callable tool as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool arguments.
    pub input_schema: Value,
}

impl ToolSpec {
    /// Argument names declared by `input_schema`, sorted.
    pub fn argument_keys(&self) -> Vec<String> {
        self.input_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Terminal answer produced by a `final` action or by budget exhaustion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnswer {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roles_serialize_lowercase() {
        let msg = Message::assistant("hi");
        let value = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(value, json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn argument_keys_reads_schema_properties() {
        let spec = ToolSpec {
            name: "read_file".to_string(),
            description: "Read".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"max_chars": {"type": "integer"}, "path": {"type": "string"}}
            }),
        };
        assert_eq!(spec.argument_keys(), vec!["max_chars", "path"]);
    }
}
