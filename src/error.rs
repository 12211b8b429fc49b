// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Error taxonomy shared by every bring-up stage.

use std::fmt;

use thiserror::Error;

/// Which layer of the storage stack refused the mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountErrorClass {
    /// Filesystem absent or corrupt. Reformatting can recover it.
    MountLayer,
    /// Device missing or bus fault. Reformatting cannot help.
    DeviceLayer,
}

impl fmt::Display for MountErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountErrorClass::MountLayer => f.write_str("mount layer"),
            MountErrorClass::DeviceLayer => f.write_str("device layer"),
        }
    }
}

/// Failure reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{class} failure: {detail}")]
pub struct MountError {
    pub class: MountErrorClass,
    pub detail: String,
}

impl MountError {
    pub fn mount_layer(detail: impl Into<String>) -> Self {
        Self {
            class: MountErrorClass::MountLayer,
            detail: detail.into(),
        }
    }

    pub fn device_layer(detail: impl Into<String>) -> Self {
        Self {
            class: MountErrorClass::DeviceLayer,
            detail: detail.into(),
        }
    }

    pub fn is_device_layer(&self) -> bool {
        self.class == MountErrorClass::DeviceLayer
    }
}

/// Failure reported by a low-level driver (radio, responder, bus, store).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

impl DriverError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors produced while loading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Reason carried by a failed bring-up stage.
#[derive(Debug, Error)]
pub enum BringupError {
    #[error("association failed after {attempts} attempts")]
    AssociationExhausted { attempts: u32 },
    #[error("name advertisement failed: {0}")]
    AdvertisementError(String),
    #[error("clock not set after {attempts} polls")]
    ClockSyncTimeout { attempts: u32 },
    #[error("mount failed: {0}")]
    Mount(#[from] MountError),
    #[error("unexpected signal state: {0}")]
    UnexpectedSignalState(String),
    #[error("key-value store: {0}")]
    Storage(String),
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BringupError {
    /// Short stable label used in reports and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            BringupError::AssociationExhausted { .. } => "AssociationExhausted",
            BringupError::AdvertisementError(_) => "AdvertisementError",
            BringupError::ClockSyncTimeout { .. } => "ClockSyncTimeout",
            BringupError::Mount(e) if e.is_device_layer() => "MountError(DeviceLayer)",
            BringupError::Mount(_) => "MountError(MountLayer)",
            BringupError::UnexpectedSignalState(_) => "UnexpectedSignalState",
            BringupError::Storage(_) => "StorageInit",
            BringupError::Driver(_) => "DriverError",
            BringupError::Config(_) => "Config",
        }
    }
}
