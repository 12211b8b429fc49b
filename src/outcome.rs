// CLASSIFICATION: COMMUNITY
// Filename: outcome.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Tagged result crossing stage boundaries.
//!
//! A stage never exposes its retry state to the sequencer; the only thing
//! that leaves a stage is one of these values.

use crate::error::BringupError;

/// Outcome of a single bring-up stage.
#[derive(Debug)]
#[must_use]
pub enum BringupOutcome<T> {
    /// Stage committed; `T` is whatever it acquired.
    Ready(T),
    /// Stage gave up after resolving what it could internally.
    Failed(BringupError),
}

impl<T> BringupOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, BringupOutcome::Ready(_))
    }

    /// Reason for failure, if any.
    pub fn failure(&self) -> Option<&BringupError> {
        match self {
            BringupOutcome::Ready(_) => None,
            BringupOutcome::Failed(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<T, BringupError> {
        match self {
            BringupOutcome::Ready(v) => Ok(v),
            BringupOutcome::Failed(e) => Err(e),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> BringupOutcome<U> {
        match self {
            BringupOutcome::Ready(v) => BringupOutcome::Ready(f(v)),
            BringupOutcome::Failed(e) => BringupOutcome::Failed(e),
        }
    }
}

impl<T, E: Into<BringupError>> From<Result<T, E>> for BringupOutcome<T> {
    fn from(res: Result<T, E>) -> Self {
        match res {
            Ok(v) => BringupOutcome::Ready(v),
            Err(e) => BringupOutcome::Failed(e.into()),
        }
    }
}
