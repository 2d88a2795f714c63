//! Append-only conversation state for a single question.

use crate::core::types::Message;

/// Prefix placed before every tool observation turn.
pub const OBSERVATION_PREFIX: &str = "Observation (tool result):\n";

/// Ordered, role-tagged messages for one question.
///
/// Seeded with one system and one user message; afterwards it only grows,
/// two entries at a time (assistant turn + user turn).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn seed(system_prompt: &str, question: &str) -> Self {
        Self {
            messages: vec![
                Message::system(system_prompt.trim()),
                Message::user(question),
            ],
        }
    }

    /// Record an echoed action and the observation it produced.
    pub fn push_observation(&mut self, encoded_action: String, observation: &str) {
        self.push_exchange(
            Message::assistant(encoded_action),
            Message::user(format!("{OBSERVATION_PREFIX}{observation}")),
        );
    }

    /// Record a placeholder assistant turn and a corrective reminder after
    /// output that could not be decoded.
    pub fn push_correction(&mut self, placeholder: &str, error: &str) {
        self.push_exchange(
            Message::assistant(placeholder),
            Message::user(format!(
                "Your last output was not valid JSON. Error={error}. Output ONLY JSON per the schema."
            )),
        );
    }

    fn push_exchange(&mut self, assistant: Message, user: Message) {
        self.messages.push(assistant);
        self.messages.push(user);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
