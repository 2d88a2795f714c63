//! `fileagent`: ask questions about local files through a tool-using model.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fileagent::agent::StepEvent;
use fileagent::ask::{self, Overrides};
use fileagent::exit_codes;
use fileagent::io::config::load_config;
use fileagent::logging;
use fileagent::provider::ToolProvider;

#[derive(Parser)]
#[command(
    name = "fileagent",
    version,
    about = "Answer questions about local files with a sandboxed tool-using model"
)]
struct Cli {
    /// Path to the TOML config (defaults apply when missing).
    #[arg(long, global = true, default_value = "fileagent.toml")]
    config: PathBuf,

    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct OverrideArgs {
    /// Directory the tools are confined to.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Maximum number of model calls per question.
    #[arg(long, global = true)]
    max_steps: Option<u32>,

    /// Model name sent to the completion endpoint.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Serve tools from this MCP command line instead of in-process,
    /// e.g. `--remote "fileagent-mcp --root 'my data'"`. Shell quoting applies.
    #[arg(long, global = true)]
    remote: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Answer one question and exit.
    Ask {
        question: String,
        /// Print each step to stderr.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Read questions from stdin, one per line.
    Repl,
    /// Print the available tools and their arguments.
    Tools,
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ask::exit_code_for_error(&err)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let overrides = Overrides {
        root_dir: cli.overrides.root,
        max_steps: cli.overrides.max_steps,
        model: cli.overrides.model,
        remote: cli.overrides.remote.as_deref().map(split_remote).transpose()?,
    };
    let config = overrides.apply(
        load_config(&cli.config).with_context(|| format!("load {}", cli.config.display()))?,
    )?;

    match cli.command {
        Command::Ask { question, verbose } => {
            let agent = ask::build_agent(&config)?;
            let outcome = agent.ask_with(&question, |event| {
                if verbose {
                    eprintln!("{}", describe_step(event));
                }
            })?;
            print!("{}", ask::render_outcome(&outcome));
            Ok(ask::exit_code(&outcome))
        }
        Command::Repl => {
            let agent = ask::build_agent(&config)?;
            let stdin = std::io::stdin();
            ask::run_repl(&agent, stdin.lock(), std::io::stdout())?;
            Ok(exit_codes::OK)
        }
        Command::Tools => {
            let provider = ask::build_provider(&config)?;
            let mut stdout = std::io::stdout().lock();
            for spec in provider.list_capabilities() {
                writeln!(stdout, "{}: {}", spec.name, spec.description)?;
                writeln!(stdout, "  args: {}", spec.argument_keys().join(", "))?;
            }
            Ok(exit_codes::OK)
        }
    }
}

fn split_remote(command: &str) -> Result<Vec<String>> {
    shell_words::split(command).with_context(|| format!("parse --remote {command:?}"))
}

fn describe_step(event: &StepEvent) -> String {
    match event {
        StepEvent::ToolCalled {
            step,
            tool,
            error: None,
        } => format!("[step {step}] {tool}"),
        StepEvent::ToolCalled {
            step,
            tool,
            error: Some(error),
        } => format!("[step {step}] {tool} -> {error}"),
        StepEvent::Malformed { step, reason } => format!("[step {step}] malformed: {reason}"),
        StepEvent::Answered { step } => format!("[step {step}] final"),
    }
}
