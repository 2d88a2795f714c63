//! Step budget for the agent loop.

use anyhow::{Result, anyhow};

/// Fixed number of model calls allowed for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepBudget {
    max_steps: u32,
    used: u32,
}

impl StepBudget {
    pub fn new(max_steps: u32) -> Result<Self> {
        if max_steps == 0 {
            return Err(anyhow!("max_steps must be > 0"));
        }
        Ok(Self { max_steps, used: 0 })
    }

    /// Consume one step. Returns the 1-indexed step number, or `None` once
    /// the budget is spent.
    pub fn next_step(&mut self) -> Option<u32> {
        if self.used >= self.max_steps {
            return None;
        }
        self.used += 1;
        Some(self.used)
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }
}
