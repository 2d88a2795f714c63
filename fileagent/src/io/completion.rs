//! Completion endpoint abstraction.
//!
//! The [`CompletionEndpoint`] trait decouples the agent loop from the actual
//! model backend. Tests use scripted endpoints that return predetermined
//! replies without touching the network.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::core::types::Message;
use crate::io::config::{EndpointConfig, EndpointKind};

/// Longest response body kept in a [`EndpointFailure::Status`] error.
const ERROR_BODY_LIMIT: usize = 500;

/// The completion call failed; no text was produced.
#[derive(Debug, Error)]
pub enum EndpointFailure {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid completion response: {0}")]
    InvalidResponse(String),
}

/// One blocking model call: the full conversation in, one text blob out.
pub trait CompletionEndpoint {
    fn complete(&self, messages: &[Message]) -> Result<String, EndpointFailure>;
}

impl<T: CompletionEndpoint + ?Sized> CompletionEndpoint for &T {
    fn complete(&self, messages: &[Message]) -> Result<String, EndpointFailure> {
        (**self).complete(messages)
    }
}

/// HTTP chat client for Ollama or OpenAI-compatible servers.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::blocking::Client,
    config: EndpointConfig,
    api_key: Option<String>,
}

impl ChatClient {
    /// Build a client with the configured per-call timeout.
    ///
    /// When `api_key_env` is set, the named variable must exist.
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build http client")?;
        let api_key = config
            .api_key_env
            .as_deref()
            .map(|var| std::env::var(var).with_context(|| format!("read api key from ${var}")))
            .transpose()?;
        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    fn payload(&self, messages: &[Message]) -> Value {
        match self.config.kind {
            EndpointKind::Ollama => json!({
                "model": self.config.model,
                "messages": messages,
                "stream": false,
                "options": { "temperature": self.config.temperature },
            }),
            EndpointKind::OpenAi => json!({
                "model": self.config.model,
                "messages": messages,
                "stream": false,
                "temperature": self.config.temperature,
            }),
        }
    }
}

impl CompletionEndpoint for ChatClient {
    #[instrument(skip_all, fields(model = %self.config.model, messages = messages.len()))]
    fn complete(&self, messages: &[Message]) -> Result<String, EndpointFailure> {
        let mut request = self.client.post(&self.config.url).json(&self.payload(messages));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EndpointFailure::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let body: Value = response
            .json()
            .map_err(|err| EndpointFailure::InvalidResponse(err.to_string()))?;
        let text = extract_content(self.config.kind, &body)?;
        debug!(chars = text.len(), "completion received");
        Ok(text)
    }
}

fn extract_content(kind: EndpointKind, body: &Value) -> Result<String, EndpointFailure> {
    let pointer = match kind {
        EndpointKind::Ollama => "/message/content",
        EndpointKind::OpenAi => "/choices/0/message/content",
    };
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| EndpointFailure::InvalidResponse(format!("missing {pointer}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_payload_nests_temperature_in_options() {
        let client = ChatClient::new(&EndpointConfig::default()).expect("client");
        let payload = client.payload(&[Message::user("hi")]);
        assert_eq!(payload["model"], "qwen3:8b");
        assert_eq!(payload["stream"], false);
        assert_eq!(payload["options"]["temperature"], 0.2);
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["messages"][0]["content"], "hi");
    }

    #[test]
    fn openai_payload_has_top_level_temperature() {
        let config = EndpointConfig {
            kind: EndpointKind::OpenAi,
            ..EndpointConfig::default()
        };
        let client = ChatClient::new(&config).expect("client");
        let payload = client.payload(&[Message::system("rules")]);
        assert_eq!(payload["temperature"], 0.2);
        assert!(payload.get("options").is_none());
    }

    #[test]
    fn extracts_content_per_wire_format() {
        let ollama = json!({ "message": { "role": "assistant", "content": "a" } });
        assert_eq!(extract_content(EndpointKind::Ollama, &ollama).expect("ollama"), "a");

        let openai = json!({ "choices": [{ "message": { "content": "b" } }] });
        assert_eq!(extract_content(EndpointKind::OpenAi, &openai).expect("openai"), "b");

        let err = extract_content(EndpointKind::Ollama, &openai).unwrap_err();
        assert!(matches!(err, EndpointFailure::InvalidResponse(_)));
    }

    #[test]
    fn missing_api_key_variable_fails_construction() {
        let config = EndpointConfig {
            api_key_env: Some("FILEAGENT_TEST_KEY_THAT_IS_NEVER_SET".to_string()),
            ..EndpointConfig::default()
        };
        assert!(ChatClient::new(&config).is_err());
    }
}
