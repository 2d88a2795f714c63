//! Deterministic, pure logic shared by the agent.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod action;
pub mod budget;
pub mod conversation;
pub mod query;
pub mod snippet;
pub mod types;
