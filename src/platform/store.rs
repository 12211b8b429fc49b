// CLASSIFICATION: COMMUNITY
// Filename: store.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Key-value store directory with a layout version stamp.

use std::fs;
use std::path::PathBuf;

use crate::error::DriverError;
use crate::nvs::{KeyValueStore, StoreInitError};

/// Layout version written by this build.
pub const STORE_VERSION: &str = "1";
const VERSION_FILE: &str = "VERSION";

pub struct HostStore {
    dir: PathBuf,
}

impl HostStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl KeyValueStore for HostStore {
    fn init(&mut self) -> Result<(), StoreInitError> {
        let stamp = self.dir.join(VERSION_FILE);
        match fs::read_to_string(&stamp) {
            Ok(v) if v.trim() == STORE_VERSION => Ok(()),
            Ok(_) => Err(StoreInitError::NewVersionFound),
            Err(_) => {
                fs::create_dir_all(&self.dir)
                    .and_then(|_| fs::write(&stamp, STORE_VERSION))
                    .map_err(|e| StoreInitError::Other(format!("{}: {e}", self.dir.display())))
            }
        }
    }

    fn erase(&mut self) -> Result<(), DriverError> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)
                .map_err(|e| DriverError::new(format!("erase {}: {e}", self.dir.display())))?;
        }
        Ok(())
    }
}
