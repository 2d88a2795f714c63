//! Action protocol codec: free-text model output to a structured action.
//!
//! Decoding is a strict JSON parse with exactly one repair step: when the
//! trimmed text does not start with `{`, it is re-sliced from the first `{`
//! to the last `}` before parsing.

use anyhow::{Context, Result};
use jsonschema::{Draft, Validator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::types::FinalAnswer;

const ACTION_SCHEMA: &str = include_str!("../../schemas/action.schema.json");

/// Name of the terminal pseudo-tool intercepted by the control loop.
pub const FINAL_TOOL: &str = "final";

/// Model output that could not be turned into an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct MalformedAction {
    pub reason: String,
}

impl MalformedAction {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A single tool request (or the terminal `final`) emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub tool: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl Action {
    pub fn new(tool: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            tool: tool.into(),
            args,
        }
    }

    pub fn is_final(&self) -> bool {
        self.tool == FINAL_TOOL
    }

    /// Stable single-line serialization, `tool` first, used to echo the
    /// action back into the conversation.
    pub fn encode(&self) -> String {
        format!(
            "{{\"tool\":{},\"args\":{}}}",
            Value::String(self.tool.clone()),
            Value::Object(self.args.clone())
        )
    }

    /// Extract `{answer, citations}` from a `final` action's arguments.
    ///
    /// Values are taken verbatim; non-string entries are rendered as JSON.
    pub fn final_answer(&self) -> FinalAnswer {
        let answer = match self.args.get("answer") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let citations = match self.args.get("citations") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        };
        FinalAnswer { answer, citations }
    }
}

/// Decoder holding the compiled action schema.
pub struct ActionCodec {
    validator: Validator,
}

impl std::fmt::Debug for ActionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionCodec").finish_non_exhaustive()
    }
}

impl ActionCodec {
    pub fn new() -> Result<Self> {
        let schema: Value = serde_json::from_str(ACTION_SCHEMA).context("parse action schema")?;
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .context("compile action schema")?;
        Ok(Self { validator })
    }

    pub fn decode(&self, raw: &str) -> std::result::Result<Action, MalformedAction> {
        let candidate = extract_object(raw);
        let value: Value = serde_json::from_str(candidate)
            .map_err(|err| MalformedAction::new(format!("invalid JSON: {err}")))?;

        let violations: Vec<String> = self
            .validator
            .iter_errors(&value)
            .map(|err| err.to_string())
            .collect();
        if !violations.is_empty() {
            return Err(MalformedAction::new(format!(
                "action does not match schema: {}",
                violations.join("; ")
            )));
        }

        let Value::Object(mut object) = value else {
            return Err(MalformedAction::new("action must be a JSON object"));
        };
        let tool = match object.remove("tool") {
            Some(Value::String(tool)) if !tool.trim().is_empty() => tool.trim().to_string(),
            _ => return Err(MalformedAction::new("action is missing a 'tool' name")),
        };
        let args = match object.remove("args") {
            Some(Value::Object(args)) => args,
            Some(Value::Null) | None => Map::new(),
            Some(_) => return Err(MalformedAction::new("'args' must be a JSON object")),
        };
        Ok(Action { tool, args })
    }
}

/// Slice out the outermost `{...}` when the text carries leading noise.
fn extract_object(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(first), Some(last)) if last > first => &trimmed[first..=last],
        _ => trimmed,
    }
}
