//! Stable exit codes for `fileagent` commands.

/// The question was answered (or the command succeeded).
pub const OK: i32 = 0;
/// Invalid configuration, missing root, or any other error.
pub const INVALID: i32 = 1;
/// The completion endpoint failed (network, HTTP status, bad payload).
pub const ENDPOINT_FAILURE: i32 = 2;
/// The step budget ran out before the model produced a final answer.
pub const BUDGET_EXHAUSTED: i32 = 3;
