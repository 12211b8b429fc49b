// CLASSIFICATION: COMMUNITY
// Filename: media.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! In-memory storage medium usable as a flash partition or a card slot.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use ftp_bringup::error::DriverError;
use ftp_bringup::storage::{
    CardBusMode, CardHost, CardInfo, FatVolume, FlashPartition, FsError, MountConfig,
};

/// Condition of the simulated medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    /// Nothing answers on the bus or partition table.
    Absent,
    /// Healthy device without a filesystem.
    Blank,
    Formatted,
    /// Device answers but every filesystem operation fails.
    Faulty,
    /// No filesystem, and writing a new one fails in the device.
    Unformattable,
    /// Formats fine but the result is still not recognised.
    Unrecognizable,
}

#[derive(Debug, Default)]
pub struct MediaCounters {
    pub formats: AtomicU32,
    pub mounts: AtomicU32,
    pub unmounts: AtomicU32,
    pub bus_inits: AtomicU32,
    pub bus_frees: AtomicU32,
    pub power_on: AtomicU32,
    pub bus_mode: Mutex<Option<CardBusMode>>,
}

impl MediaCounters {
    pub fn formats(&self) -> u32 {
        self.formats.load(Ordering::SeqCst)
    }

    pub fn mounts(&self) -> u32 {
        self.mounts.load(Ordering::SeqCst)
    }

    pub fn unmounts(&self) -> u32 {
        self.unmounts.load(Ordering::SeqCst)
    }

    pub fn bus_inits(&self) -> u32 {
        self.bus_inits.load(Ordering::SeqCst)
    }

    pub fn bus_frees(&self) -> u32 {
        self.bus_frees.load(Ordering::SeqCst)
    }

    pub fn power_on(&self) -> u32 {
        self.power_on.load(Ordering::SeqCst)
    }

    /// Mode handed to the last `init_bus`.
    pub fn bus_mode(&self) -> Option<CardBusMode> {
        self.bus_mode.lock().ok().and_then(|m| *m)
    }
}

pub struct SimMedia {
    state: MediaState,
    fail_unmount: bool,
    counters: Arc<MediaCounters>,
}

impl SimMedia {
    pub fn new(state: MediaState) -> (Self, Arc<MediaCounters>) {
        let counters = Arc::new(MediaCounters::default());
        (
            Self {
                state,
                fail_unmount: false,
                counters: Arc::clone(&counters),
            },
            counters,
        )
    }

    /// Make every unmount report a device error.
    pub fn failing_unmount(mut self) -> Self {
        self.fail_unmount = true;
        self
    }
}

impl FatVolume for SimMedia {
    fn mount_fs(&mut self, _mount_path: &Path, _cfg: &MountConfig) -> Result<(), FsError> {
        match self.state {
            MediaState::Absent | MediaState::Faulty => {
                Err(FsError::Device("medium not responding".into()))
            }
            MediaState::Blank | MediaState::Unformattable | MediaState::Unrecognizable => {
                Err(FsError::Unrecognized("no FAT signature".into()))
            }
            MediaState::Formatted => {
                self.counters.mounts.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    fn format(&mut self, _cfg: &MountConfig) -> Result<(), FsError> {
        self.counters.formats.fetch_add(1, Ordering::SeqCst);
        match self.state {
            MediaState::Absent | MediaState::Faulty | MediaState::Unformattable => {
                Err(FsError::Device("format write failed".into()))
            }
            MediaState::Unrecognizable => Ok(()),
            MediaState::Blank | MediaState::Formatted => {
                self.state = MediaState::Formatted;
                Ok(())
            }
        }
    }

    fn unmount_fs(&mut self, _mount_path: &Path) -> Result<(), FsError> {
        self.counters.unmounts.fetch_add(1, Ordering::SeqCst);
        if self.fail_unmount {
            return Err(FsError::Device("unmount write-back failed".into()));
        }
        Ok(())
    }
}

impl FlashPartition for SimMedia {
    fn open_partition(&mut self, label: &str) -> Result<(), DriverError> {
        if self.state == MediaState::Absent {
            return Err(DriverError::new(format!("partition {label} not found")));
        }
        Ok(())
    }

    fn close_partition(&mut self) {
        self.counters.bus_frees.fetch_add(1, Ordering::SeqCst);
    }
}

impl CardHost for SimMedia {
    fn set_power(&mut self, _pin: u8, on: bool) -> Result<(), DriverError> {
        if on {
            self.counters.power_on.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn init_bus(&mut self, mode: &CardBusMode) -> Result<(), DriverError> {
        self.counters.bus_inits.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.counters.bus_mode.lock() {
            *last = Some(*mode);
        }
        Ok(())
    }

    fn probe_card(&mut self) -> Result<CardInfo, DriverError> {
        match self.state {
            MediaState::Absent => Err(DriverError::new("no card (timeout)")),
            _ => Ok(CardInfo {
                name: "SIM32".into(),
                capacity_bytes: 32 * 1024 * 1024 * 1024,
            }),
        }
    }

    fn free_bus(&mut self) {
        self.counters.bus_frees.fetch_add(1, Ordering::SeqCst);
    }
}
