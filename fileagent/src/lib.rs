//! Sandboxed file question-answering agent.
//!
//! A language model answers questions about local text files by asking for
//! small tool operations (list, search, read) instead of getting raw file
//! access. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (action codec, conversation,
//!   query matching, snippets). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (sandboxed filesystem access,
//!   configuration, the completion endpoint).
//!
//! [`tools`] and [`provider`] expose the file tools, [`agent`] runs the
//! bounded action loop, and [`ask`] wires everything together for the CLI.

pub mod agent;
pub mod ask;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod provider;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tools;
