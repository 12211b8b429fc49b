// CLASSIFICATION: COMMUNITY
// Filename: signal.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Single-fire completion signal between the service task and the sequencer.
//!
//! The notifier is consumed when it fires, so a service run can set the
//! signal at most once. The signal side is consumed by `wait`, so it is
//! observed exactly once.

use std::sync::mpsc::{self, Receiver, SyncSender};

use crate::error::BringupError;

/// How the service task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceExit {
    Finished,
    Aborted(String),
}

/// Sending half, owned by the service task.
#[derive(Debug)]
pub struct CompletionNotifier {
    tx: SyncSender<ServiceExit>,
}

/// Receiving half, owned by the supervisor.
#[derive(Debug)]
pub struct ServiceCompletionSignal {
    rx: Receiver<ServiceExit>,
}

/// Create a connected notifier/signal pair.
pub fn completion_pair() -> (CompletionNotifier, ServiceCompletionSignal) {
    let (tx, rx) = mpsc::sync_channel(1);
    (CompletionNotifier { tx }, ServiceCompletionSignal { rx })
}

impl CompletionNotifier {
    /// Set the signal. The supervisor may already be gone during process
    /// shutdown; that is not an error for the service.
    pub fn fire(self, exit: ServiceExit) {
        let _ = self.tx.send(exit);
    }
}

impl ServiceCompletionSignal {
    /// Block until the service fires. No timeout.
    ///
    /// A notifier dropped without firing (for example a panicking task)
    /// is reported as `UnexpectedSignalState`.
    pub fn wait(self) -> Result<ServiceExit, BringupError> {
        self.rx.recv().map_err(|_| {
            BringupError::UnexpectedSignalState("service task ended without signalling".into())
        })
    }
}
