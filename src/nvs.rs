// CLASSIFICATION: COMMUNITY
// Filename: nvs.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Persistent key-value store initialisation.
//!
//! The radio stack keeps calibration data here, so it has to be usable
//! before network bring-up starts.

use log::{info, warn};
use thiserror::Error;

use crate::error::{BringupError, DriverError};

/// Reasons a store refuses to initialise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreInitError {
    #[error("no free pages")]
    NoFreePages,
    #[error("new layout version found")]
    NewVersionFound,
    #[error("{0}")]
    Other(String),
}

impl StoreInitError {
    /// Whether erasing the partition is the expected cure.
    pub fn needs_erase(&self) -> bool {
        matches!(self, StoreInitError::NoFreePages | StoreInitError::NewVersionFound)
    }
}

pub trait KeyValueStore: Send {
    fn init(&mut self) -> Result<(), StoreInitError>;
    fn erase(&mut self) -> Result<(), DriverError>;
}

/// Initialise `store`, erasing and retrying once when the layout is full
/// or from a different version.
pub fn init_store(store: &mut dyn KeyValueStore) -> Result<(), BringupError> {
    match store.init() {
        Ok(()) => {}
        Err(e) if e.needs_erase() => {
            warn!("key-value store {e}; erasing");
            store.erase()?;
            store
                .init()
                .map_err(|e| BringupError::Storage(e.to_string()))?;
        }
        Err(e) => return Err(BringupError::Storage(e.to_string())),
    }
    info!("key-value store ready");
    Ok(())
}
