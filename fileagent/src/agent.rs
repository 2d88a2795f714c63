//! Agent control loop: one question in, one final answer out.
//!
//! Each iteration spends one step on a model call, decodes the reply, and
//! either returns the `final` answer or dispatches a tool and appends the
//! echoed action plus its observation to the conversation. Tool failures
//! and malformed replies are fed back to the model; only endpoint failures
//! abort the question.

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::action::{Action, ActionCodec};
use crate::core::budget::StepBudget;
use crate::core::conversation::Conversation;
use crate::core::types::{FinalAnswer, Message};
use crate::io::completion::CompletionEndpoint;
use crate::io::prompt::render_system_prompt;
use crate::provider::ToolProvider;

/// Answer returned when the step budget runs out before a `final` action.
pub const BUDGET_EXHAUSTED_ANSWER: &str = "Reached the maximum number of steps before finding an answer. Try a more specific question or narrower search keywords.";

/// Assistant turn recorded in place of output that could not be decoded.
pub const MALFORMED_PLACEHOLDER: &str = "(previous output was not a valid action)";

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStop {
    /// The model emitted `final`.
    Answered,
    /// Every step was spent without a `final` action.
    BudgetExhausted,
}

/// Result of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutcome {
    pub stop: LoopStop,
    pub answer: FinalAnswer,
    /// Completion calls made, never more than `max_steps`.
    pub model_calls: u32,
    /// Conversation at the point the loop stopped.
    pub messages: Vec<Message>,
}

/// Per-step progress reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    ToolCalled {
        step: u32,
        tool: String,
        error: Option<String>,
    },
    Malformed {
        step: u32,
        reason: String,
    },
    Answered {
        step: u32,
    },
}

/// The agent, generic over its model endpoint and tool provider.
#[derive(Debug)]
pub struct Agent<C, P> {
    endpoint: C,
    provider: P,
    codec: ActionCodec,
    system_prompt: String,
    max_steps: u32,
}

impl<C: CompletionEndpoint, P: ToolProvider> Agent<C, P> {
    /// Render the system prompt from the provider's capabilities.
    pub fn new(endpoint: C, provider: P, max_steps: u32) -> Result<Self> {
        StepBudget::new(max_steps)?;
        let system_prompt =
            render_system_prompt(provider.root_dir(), &provider.list_capabilities())?;
        Ok(Self {
            endpoint,
            provider,
            codec: ActionCodec::new()?,
            system_prompt,
            max_steps,
        })
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn ask(&self, question: &str) -> Result<AgentOutcome> {
        self.ask_with(question, |_| {})
    }

    /// Answer `question`, reporting each step to `on_step`.
    ///
    /// Endpoint failures are returned as errors that downcast to
    /// [`crate::io::completion::EndpointFailure`]; nothing else aborts.
    #[instrument(skip_all, fields(max_steps = self.max_steps))]
    pub fn ask_with<F: FnMut(&StepEvent)>(
        &self,
        question: &str,
        mut on_step: F,
    ) -> Result<AgentOutcome> {
        info!("question started");
        let mut budget = StepBudget::new(self.max_steps)?;
        let mut conversation = Conversation::seed(&self.system_prompt, question);

        while let Some(step) = budget.next_step() {
            let raw = self
                .endpoint
                .complete(conversation.messages())
                .with_context(|| format!("completion call for step {step}"))?;

            let action = match self.codec.decode(&raw) {
                Ok(action) => action,
                Err(err) => {
                    warn!(step, reason = %err, "malformed action");
                    conversation.push_correction(MALFORMED_PLACEHOLDER, &err.to_string());
                    on_step(&StepEvent::Malformed {
                        step,
                        reason: err.reason,
                    });
                    continue;
                }
            };

            if action.is_final() {
                info!(step, "question answered");
                on_step(&StepEvent::Answered { step });
                return Ok(AgentOutcome {
                    stop: LoopStop::Answered,
                    answer: action.final_answer(),
                    model_calls: budget.used(),
                    messages: conversation.into_messages(),
                });
            }

            let (observation, error) = self.run_tool(&action);
            debug!(step, tool = %action.tool, ok = error.is_none(), "step finished");
            on_step(&StepEvent::ToolCalled {
                step,
                tool: action.tool.clone(),
                error,
            });
            conversation.push_observation(action.encode(), &observation);
        }

        warn!(steps = budget.used(), "step budget exhausted");
        Ok(AgentOutcome {
            stop: LoopStop::BudgetExhausted,
            answer: FinalAnswer {
                answer: BUDGET_EXHAUSTED_ANSWER.to_string(),
                citations: Vec::new(),
            },
            model_calls: budget.used(),
            messages: conversation.into_messages(),
        })
    }

    /// Dispatch one action; a tool error becomes its observation text.
    fn run_tool(&self, action: &Action) -> (String, Option<String>) {
        match self.provider.call(&action.tool, &action.args) {
            Ok(observation) => (observation, None),
            Err(err) => {
                warn!(tool = %action.tool, kind = err.kind(), "tool error");
                let observation = err.to_observation();
                (observation.clone(), Some(observation))
            }
        }
    }
}
