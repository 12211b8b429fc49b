// CLASSIFICATION: COMMUNITY
// Filename: retry.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Per-stage retry accounting.

use crate::error::ConfigError;

/// Bounded count of permitted attempts, owned by exactly one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    attempts_made: u32,
    max_attempts: u32,
}

impl RetryBudget {
    /// Create a fresh budget. `max_attempts` must be non-zero.
    pub fn new(max_attempts: u32) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::Invalid("retry budget must allow at least one attempt".into()));
        }
        Ok(Self {
            attempts_made: 0,
            max_attempts,
        })
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }

    /// Record one attempt. Returns `false` without counting when the
    /// budget is already spent.
    pub fn try_consume(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.attempts_made += 1;
        true
    }

    /// Forget every recorded attempt.
    pub fn reset(&mut self) {
        self.attempts_made = 0;
    }
}
