//! Diagnostic tracing for the agent and its tools.
//!
//! Output goes to stderr so stdout stays reserved for answers and, in the
//! MCP server, for the stdio protocol.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=fileagent=debug fileagent ask "where is the deploy log?"
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
