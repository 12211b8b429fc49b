// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v2.0
// Date Modified: 2026-10-19
// Author: Lukas Bower

//! Bring-up sequencer for a file-transfer appliance.
//!
//! Brings the station link up, advertises the hostname, synchronises the
//! clock, mounts the one persistent volume, runs the file-transfer service
//! and unmounts again when it exits.

/// Deploy-time configuration (TOML).
pub mod config;

/// Error taxonomy.
pub mod error;

/// Stage outcome type.
pub mod outcome;

/// Per-stage retry budgets.
pub mod retry;

/// Single-fire completion signal.
pub mod signal;

/// Station association and hostname advertisement.
pub mod net;

/// Network time synchronisation.
pub mod clock;

/// Flash and card volumes.
pub mod storage;

/// Persistent key-value store initialisation.
pub mod nvs;

/// File-transfer service supervisor.
pub mod service;

/// The bring-up state machine.
pub mod sequencer;

/// Idle halt.
pub mod halt;

/// Drivers for running on a workstation.
pub mod platform;

pub use error::{BringupError, MountError, MountErrorClass};
pub use outcome::BringupOutcome;
pub use retry::RetryBudget;
pub use sequencer::{Collaborators, SequenceReport, Sequencer, SequencerConfig, SequencerState};
