// CLASSIFICATION: COMMUNITY
// Filename: volume.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Directory-backed volumes.
//!
//! A medium is a directory under the state directory. It carries a FAT
//! marker file once formatted, and mounting links the mount point to it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::DriverError;
use crate::storage::{CardBusMode, CardHost, CardInfo, FatVolume, FlashPartition, FsError, MountConfig};

/// Marker written by [`DirVolume::format`].
pub const FS_MARKER: &str = ".fatfs";

#[derive(Debug, Clone)]
pub struct DirVolume {
    medium: PathBuf,
}

impl DirVolume {
    pub fn new(medium: impl Into<PathBuf>) -> Self {
        Self {
            medium: medium.into(),
        }
    }

    pub fn medium(&self) -> &Path {
        &self.medium
    }

    fn link(&self, mount_path: &Path) -> Result<(), FsError> {
        if mount_path == self.medium {
            return Ok(());
        }
        match fs::symlink_metadata(mount_path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                fs::remove_file(mount_path).map_err(device)?;
            }
            Ok(_) => {
                return Err(FsError::Device(format!(
                    "mount point {} is occupied",
                    mount_path.display()
                )))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(device(e)),
        }
        if let Some(parent) = mount_path.parent() {
            fs::create_dir_all(parent).map_err(device)?;
        }
        symlink(&self.medium, mount_path).map_err(device)
    }
}

fn device(e: io::Error) -> FsError {
    FsError::Device(e.to_string())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "mount point must equal the medium directory on this host",
    ))
}

impl FatVolume for DirVolume {
    fn mount_fs(&mut self, mount_path: &Path, _cfg: &MountConfig) -> Result<(), FsError> {
        if !self.medium.is_dir() {
            return Err(FsError::Device(format!("{} missing", self.medium.display())));
        }
        if !self.medium.join(FS_MARKER).is_file() {
            return Err(FsError::Unrecognized(format!(
                "no filesystem on {}",
                self.medium.display()
            )));
        }
        self.link(mount_path)
    }

    fn format(&mut self, cfg: &MountConfig) -> Result<(), FsError> {
        info!("formatting {}", self.medium.display());
        if self.medium.exists() {
            fs::remove_dir_all(&self.medium).map_err(device)?;
        }
        fs::create_dir_all(&self.medium).map_err(device)?;
        fs::write(
            self.medium.join(FS_MARKER),
            format!("FAT alloc={} max_files={}\n", cfg.allocation_unit_size, cfg.max_files),
        )
        .map_err(device)
    }

    fn unmount_fs(&mut self, mount_path: &Path) -> Result<(), FsError> {
        if mount_path == self.medium {
            return Ok(());
        }
        match fs::symlink_metadata(mount_path) {
            Ok(meta) if meta.file_type().is_symlink() => fs::remove_file(mount_path).map_err(device),
            Ok(_) => Err(FsError::Device(format!(
                "{} is not a mount link",
                mount_path.display()
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(device(e)),
        }
    }
}

/// Partition table of emulated internal flash. Every label exists; a new
/// one starts blank.
pub struct HostFlash {
    partitions: PathBuf,
    volume: Option<DirVolume>,
}

impl HostFlash {
    pub fn new(partitions: impl Into<PathBuf>) -> Self {
        Self {
            partitions: partitions.into(),
            volume: None,
        }
    }

    fn volume(&mut self) -> Result<&mut DirVolume, FsError> {
        self.volume
            .as_mut()
            .ok_or_else(|| FsError::Device("partition not open".into()))
    }
}

impl FatVolume for HostFlash {
    fn mount_fs(&mut self, mount_path: &Path, cfg: &MountConfig) -> Result<(), FsError> {
        self.volume()?.mount_fs(mount_path, cfg)
    }

    fn format(&mut self, cfg: &MountConfig) -> Result<(), FsError> {
        self.volume()?.format(cfg)
    }

    fn unmount_fs(&mut self, mount_path: &Path) -> Result<(), FsError> {
        self.volume()?.unmount_fs(mount_path)
    }
}

impl FlashPartition for HostFlash {
    fn open_partition(&mut self, label: &str) -> Result<(), DriverError> {
        let medium = self.partitions.join(label);
        fs::create_dir_all(&medium)
            .map_err(|e| DriverError::new(format!("{}: {e}", medium.display())))?;
        debug!("partition {label} at {}", medium.display());
        self.volume = Some(DirVolume::new(medium));
        Ok(())
    }

    fn close_partition(&mut self) {
        self.volume = None;
    }
}

/// Card slot; the card is present when the slot directory exists.
pub struct HostCard {
    volume: DirVolume,
}

impl HostCard {
    pub fn new(slot: impl Into<PathBuf>) -> Self {
        Self {
            volume: DirVolume::new(slot),
        }
    }
}

impl FatVolume for HostCard {
    fn mount_fs(&mut self, mount_path: &Path, cfg: &MountConfig) -> Result<(), FsError> {
        self.volume.mount_fs(mount_path, cfg)
    }

    fn format(&mut self, cfg: &MountConfig) -> Result<(), FsError> {
        self.volume.format(cfg)
    }

    fn unmount_fs(&mut self, mount_path: &Path) -> Result<(), FsError> {
        self.volume.unmount_fs(mount_path)
    }
}

impl CardHost for HostCard {
    fn set_power(&mut self, pin: u8, on: bool) -> Result<(), DriverError> {
        debug!("GPIO{pin} {}", if on { "high" } else { "low" });
        Ok(())
    }

    fn init_bus(&mut self, mode: &CardBusMode) -> Result<(), DriverError> {
        debug!("bus {mode:?}");
        Ok(())
    }

    fn probe_card(&mut self) -> Result<CardInfo, DriverError> {
        let slot = self.volume.medium();
        if !slot.is_dir() {
            return Err(DriverError::new(format!("no card in {}", slot.display())));
        }
        let name = slot
            .file_name()
            .map(|n| n.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| "SDCARD".into());
        Ok(CardInfo {
            name,
            capacity_bytes: 0,
        })
    }

    fn free_bus(&mut self) {}
}
