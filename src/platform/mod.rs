// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Host platform: drivers that run the sequencer on a workstation.
//!
//! Volumes live under a state directory, the link is whatever route the
//! host already has, and time comes from a real SNTP exchange.

pub mod net;
pub mod sntp;
pub mod store;
pub mod volume;

use std::path::{Component, Path, PathBuf};

use crate::config::BringupConfig;
use crate::error::{BringupError, ConfigError};
use crate::sequencer::Collaborators;
use crate::service::CommandService;
use crate::storage::{CardMounter, FlashMounter, StorageBackend, VolumeMounter};

pub use net::{HostAdvertiser, HostStation};
pub use sntp::HostSntp;
pub use store::HostStore;
pub use volume::{DirVolume, HostCard, HostFlash};

/// Where a device mount path lives on the host: `/root` maps to
/// `<state_dir>/mnt/root`.
pub fn host_mount_path(state_dir: &Path, device_path: &Path) -> PathBuf {
    let mut path = state_dir.join("mnt");
    for part in device_path.components() {
        if let Component::Normal(name) = part {
            path.push(name);
        }
    }
    path
}

/// Build the storage mounter for `cfg` with media under `state_dir`.
pub fn host_mounter(cfg: &BringupConfig, state_dir: &Path) -> Box<dyn VolumeMounter> {
    let mount_path = host_mount_path(state_dir, cfg.backend.mount_path());
    match &cfg.backend {
        StorageBackend::FlashVolume {
            partition_label, ..
        } => Box::new(FlashMounter::new(
            partition_label.clone(),
            mount_path,
            HostFlash::new(state_dir.join("flash")),
        )),
        StorageBackend::CardVolume { bus_mode, .. } => Box::new(
            CardMounter::new(mount_path, *bus_mode, HostCard::new(state_dir.join("sdcard")))
                .with_power_settle(cfg.power_settle),
        ),
    }
}

/// Wire every collaborator for a host run.
pub fn host_collaborators(cfg: &BringupConfig, state_dir: &Path) -> Result<Collaborators, BringupError> {
    let service = cfg
        .service
        .as_ref()
        .ok_or_else(|| ConfigError::Invalid("service.command is required on the host".into()))?;
    Ok(Collaborators {
        wifi: Box::new(HostStation::new()),
        advertiser: Box::new(HostAdvertiser::broadcast()),
        clock: Box::new(HostSntp::new()),
        storage: host_mounter(cfg, state_dir),
        service: Box::new(CommandService::new(&service.command, service.args.clone())),
    })
}
