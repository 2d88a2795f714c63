//! Orchestration for the CLI: config to provider to agent to printed answer.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::agent::{Agent, AgentOutcome, LoopStop};
use crate::exit_codes;
use crate::io::completion::{ChatClient, CompletionEndpoint, EndpointFailure};
use crate::io::config::{AgentConfig, RemoteConfig};
use crate::provider::remote::McpProvider;
use crate::provider::{LocalProvider, ToolProvider};
use crate::tools::ToolRegistry;

/// Command-line overrides applied on top of the loaded config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub root_dir: Option<PathBuf>,
    pub max_steps: Option<u32>,
    pub model: Option<String>,
    /// Tool-provider command line; selects the remote provider.
    pub remote: Option<Vec<String>>,
}

impl Overrides {
    pub fn apply(self, mut config: AgentConfig) -> Result<AgentConfig> {
        if let Some(root_dir) = self.root_dir {
            config.root_dir = root_dir;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(model) = self.model {
            config.endpoint.model = model;
        }
        if let Some(command) = self.remote {
            config.remote = Some(RemoteConfig { command });
        }
        config.validate().context("validate overrides")?;
        Ok(config)
    }
}

/// Local registry, or a remote session when `[remote]` is configured.
pub fn build_provider(config: &AgentConfig) -> Result<Box<dyn ToolProvider>> {
    match &config.remote {
        Some(remote) => {
            info!(command = ?remote.command, "using remote tool provider");
            Ok(Box::new(McpProvider::connect(&remote.command)?))
        }
        None => {
            let registry = ToolRegistry::from_config(config)
                .with_context(|| format!("open root_dir {}", config.root_dir.display()))?;
            Ok(Box::new(LocalProvider::new(registry)))
        }
    }
}

pub fn build_agent(config: &AgentConfig) -> Result<Agent<ChatClient, Box<dyn ToolProvider>>> {
    let endpoint = ChatClient::new(&config.endpoint)?;
    let provider = build_provider(config)?;
    Agent::new(endpoint, provider, config.max_steps)
}

/// Console rendering of a final answer.
pub fn render_outcome(outcome: &AgentOutcome) -> String {
    let mut out = format!("--- ANSWER ---\n{}\n", outcome.answer.answer);
    if !outcome.answer.citations.is_empty() {
        out.push_str("\n--- CITATIONS ---\n");
        for citation in &outcome.answer.citations {
            out.push_str(&format!("- {citation}\n"));
        }
    }
    out.push_str("--------------\n");
    out
}

pub fn exit_code(outcome: &AgentOutcome) -> i32 {
    match outcome.stop {
        LoopStop::Answered => exit_codes::OK,
        LoopStop::BudgetExhausted => exit_codes::BUDGET_EXHAUSTED,
    }
}

pub fn exit_code_for_error(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<EndpointFailure>().is_some() {
        exit_codes::ENDPOINT_FAILURE
    } else {
        exit_codes::INVALID
    }
}

/// Read questions line by line until end of input, answering each in turn.
///
/// A failed question is reported and the prompt continues.
pub fn run_repl<C, P, R, W>(agent: &Agent<C, P>, input: R, mut output: W) -> Result<()>
where
    C: CompletionEndpoint,
    P: ToolProvider,
    R: BufRead,
    W: Write,
{
    match agent.provider().root_dir() {
        Some(root) => writeln!(output, "ROOT_DIR = {}", root.display())?,
        None => writeln!(output, "Connected to remote tool provider.")?,
    }
    writeln!(output, "Type a question. Ctrl+D to exit.\n")?;

    let mut lines = input.lines();
    loop {
        write!(output, "Q> ")?;
        output.flush()?;
        let Some(line) = lines.next() else {
            writeln!(output)?;
            return Ok(());
        };
        let question = line.context("read question")?;
        let question = question.trim();
        if question.is_empty() {
            continue;
        }

        match agent.ask(question) {
            Ok(outcome) => write!(output, "\n{}\n", render_outcome(&outcome))?,
            Err(err) => {
                warn!(error = %err, "question failed");
                writeln!(output, "\nerror: {err:#}\n")?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FinalAnswer;
    use crate::test_support::{SandboxFixture, ScriptedEndpoint, ScriptedReply};

    fn outcome(citations: Vec<&str>, stop: LoopStop) -> AgentOutcome {
        AgentOutcome {
            stop,
            answer: FinalAnswer {
                answer: "The build failed on a timeout.".to_string(),
                citations: citations.into_iter().map(str::to_string).collect(),
            },
            model_calls: 2,
            messages: Vec::new(),
        }
    }

    #[test]
    fn renders_answer_with_citations() {
        let rendered = render_outcome(&outcome(
            vec!["file:notes.txt#L2-L2"],
            LoopStop::Answered,
        ));
        assert_eq!(
            rendered,
            "--- ANSWER ---\nThe build failed on a timeout.\n\n--- CITATIONS ---\n- file:notes.txt#L2-L2\n--------------\n"
        );
    }

    #[test]
    fn omits_empty_citation_block() {
        let rendered = render_outcome(&outcome(Vec::new(), LoopStop::Answered));
        assert!(!rendered.contains("CITATIONS"));
    }

    #[test]
    fn exit_codes_follow_stop_reason() {
        assert_eq!(exit_code(&outcome(Vec::new(), LoopStop::Answered)), exit_codes::OK);
        assert_eq!(
            exit_code(&outcome(Vec::new(), LoopStop::BudgetExhausted)),
            exit_codes::BUDGET_EXHAUSTED
        );
    }

    #[test]
    fn endpoint_failures_map_to_their_own_code() {
        let err = anyhow::Error::new(EndpointFailure::InvalidResponse("x".to_string()))
            .context("completion call for step 1");
        assert_eq!(exit_code_for_error(&err), exit_codes::ENDPOINT_FAILURE);
        assert_eq!(exit_code_for_error(&anyhow::anyhow!("bad config")), exit_codes::INVALID);
    }

    #[test]
    fn overrides_replace_config_values() {
        let config = Overrides {
            root_dir: Some(PathBuf::from("docs")),
            max_steps: Some(2),
            model: Some("llama3".to_string()),
            remote: Some(vec!["fileagent-mcp".to_string()]),
        }
        .apply(AgentConfig::default())
        .expect("apply");
        assert_eq!(config.root_dir, PathBuf::from("docs"));
        assert_eq!(config.max_steps, 2);
        assert_eq!(config.endpoint.model, "llama3");
        assert_eq!(config.remote.expect("remote").command, vec!["fileagent-mcp"]);

        let err = Overrides {
            max_steps: Some(0),
            ..Overrides::default()
        }
        .apply(AgentConfig::default());
        assert!(err.is_err());
    }

    #[test]
    fn repl_reports_endpoint_failure_and_keeps_going() {
        let fixture = SandboxFixture::new().expect("fixture");
        let endpoint = ScriptedEndpoint::new(vec![
            ScriptedReply::Status(500),
            ScriptedReply::Text(
                r#"{"tool":"final","args":{"answer":"Second answer.","citations":[]}}"#
                    .to_string(),
            ),
        ]);
        let agent =
            Agent::new(&endpoint, fixture.provider().expect("provider"), 4).expect("agent");
        let mut output = Vec::new();

        run_repl(&agent, "first question\nsecond question\n".as_bytes(), &mut output)
            .expect("repl");

        let output = String::from_utf8(output).expect("utf8");
        let error_at = output.find("\nerror: ").expect("error line");
        let answer_at = output.find("--- ANSWER ---\nSecond answer.").expect("answer");
        assert!(error_at < answer_at);
        assert!(output.contains("HTTP 500"));
        assert_eq!(endpoint.call_count(), 2);
        assert!(output.ends_with("Q> \n"));
    }
}
