//! Side-effecting operations: filesystem tools, configuration, and the
//! completion endpoint client.

pub mod catalog;
pub mod completion;
pub mod config;
pub mod prompt;
pub mod reader;
pub mod sandbox;
pub mod search;
