// CLASSIFICATION: COMMUNITY
// Filename: flash.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Wear-levelled FAT volume on an internal flash partition.

use std::path::PathBuf;

use log::info;

use crate::error::{DriverError, MountError};
use crate::storage::{mount_with_format_policy, FatVolume, MountHandle, StorageBackend, VolumeMounter};

/// Flash partition with a wear-levelling layer.
pub trait FlashPartition: FatVolume {
    /// Locate `label` in the partition table and attach wear levelling.
    fn open_partition(&mut self, label: &str) -> Result<(), DriverError>;

    /// Detach wear levelling.
    fn close_partition(&mut self);
}

pub struct FlashMounter<D: FlashPartition> {
    backend: StorageBackend,
    label: String,
    device: D,
    mounted: Option<u64>,
    next_token: u64,
}

impl<D: FlashPartition> FlashMounter<D> {
    pub fn new(partition_label: impl Into<String>, mount_path: impl Into<PathBuf>, device: D) -> Self {
        let label = partition_label.into();
        Self {
            backend: StorageBackend::FlashVolume {
                partition_label: label.clone(),
                mount_path: mount_path.into(),
            },
            label,
            device,
            mounted: None,
            next_token: 1,
        }
    }
}

impl<D: FlashPartition> VolumeMounter for FlashMounter<D> {
    fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    fn mount(&mut self) -> Result<MountHandle, MountError> {
        if self.mounted.is_some() {
            return Err(MountError::mount_layer("flash volume already mounted"));
        }
        let label = self.label.clone();
        let mount_path = self.backend.mount_path().to_path_buf();
        let cfg = self.backend.mount_config();

        self.device
            .open_partition(&label)
            .map_err(|e| MountError::device_layer(format!("partition {label:?}: {e}")))?;
        let formatted = match mount_with_format_policy(&mut self.device, &mount_path, &cfg) {
            Ok(f) => f,
            Err(e) => {
                self.device.close_partition();
                return Err(e);
            }
        };

        let token = self.next_token;
        self.next_token += 1;
        self.mounted = Some(token);
        info!("flash partition {label:?} mounted (wl handle {token})");
        Ok(MountHandle::new(mount_path, token, formatted))
    }

    fn unmount(&mut self, handle: MountHandle) -> Result<(), MountError> {
        if self.mounted != Some(handle.token()) {
            return Err(MountError::mount_layer("handle does not belong to this volume"));
        }
        let res = self.device.unmount_fs(handle.mount_path());
        self.device.close_partition();
        self.mounted = None;
        res?;
        info!("FLASH unmounted");
        Ok(())
    }
}
