// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Persistent volume mounting.
//!
//! Exactly one [`StorageBackend`] is selected when the configuration is
//! loaded. Each variant has its own mounter behind [`VolumeMounter`]; both
//! share the format-on-failure policy in [`mount_with_format_policy`].

use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::error::MountError;
use crate::outcome::BringupOutcome;

pub mod card;
pub mod flash;

pub use card::{CardHost, CardInfo, CardMounter};
pub use flash::{FlashMounter, FlashPartition};

/// Mount point used by the file-transfer service.
pub const DEFAULT_MOUNT_PATH: &str = "/root";
/// Open file limit handed to the FAT layer for either backend.
pub const MAX_OPEN_FILES: u32 = 16;
/// Wear-levelling sector size; also the flash allocation unit.
pub const FLASH_SECTOR_SIZE: u32 = 4096;
/// Allocation unit used when formatting a card.
pub const CARD_ALLOCATION_UNIT: u32 = 16 * 1024;

/// Fixed FAT layer parameters of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountConfig {
    pub max_files: u32,
    pub format_if_mount_failed: bool,
    pub allocation_unit_size: u32,
}

/// SDMMC data lines in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdmmcWidth {
    One,
    Four,
}

impl SdmmcWidth {
    pub fn lines(self) -> u8 {
        match self {
            SdmmcWidth::One => 1,
            SdmmcWidth::Four => 4,
        }
    }
}

/// SDMMC bus clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdmmcSpeed {
    Probing,
    Default,
    HighSpeed,
    Mhz26,
    Mhz52,
}

impl SdmmcSpeed {
    pub fn freq_khz(self) -> u32 {
        match self {
            SdmmcSpeed::Probing => 400,
            SdmmcSpeed::Default => 20_000,
            SdmmcSpeed::HighSpeed => 40_000,
            SdmmcSpeed::Mhz26 => 26_000,
            SdmmcSpeed::Mhz52 => 52_000,
        }
    }
}

/// GPIO assignment for a card on the SPI bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiPins {
    pub miso: u8,
    pub mosi: u8,
    pub sclk: u8,
    pub cs: u8,
    /// Peripheral power switch, driven high before bus init.
    pub power: Option<u8>,
}

/// How the card is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBusMode {
    /// Native SD bus in one- or four-line mode.
    Sdmmc {
        width: SdmmcWidth,
        speed: SdmmcSpeed,
        /// Enable the controller's weak pull-ups on CMD and DAT lines.
        internal_pullups: bool,
    },
    /// SPI-mode card.
    Spi(SpiPins),
}

/// The one persistent volume of this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Wear-levelled FAT on an internal flash partition.
    FlashVolume {
        partition_label: String,
        mount_path: PathBuf,
    },
    /// Removable card.
    CardVolume {
        mount_path: PathBuf,
        bus_mode: CardBusMode,
    },
}

impl StorageBackend {
    pub fn mount_path(&self) -> &Path {
        match self {
            StorageBackend::FlashVolume { mount_path, .. } => mount_path,
            StorageBackend::CardVolume { mount_path, .. } => mount_path,
        }
    }

    /// Capacity parameters, fixed per backend.
    pub fn mount_config(&self) -> MountConfig {
        let allocation_unit_size = match self {
            StorageBackend::FlashVolume { .. } => FLASH_SECTOR_SIZE,
            StorageBackend::CardVolume { .. } => CARD_ALLOCATION_UNIT,
        };
        MountConfig {
            max_files: MAX_OPEN_FILES,
            format_if_mount_failed: true,
            allocation_unit_size,
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::FlashVolume { partition_label, .. } => {
                write!(f, "FLASH partition {partition_label:?}")
            }
            StorageBackend::CardVolume {
                bus_mode: CardBusMode::Sdmmc { width, .. },
                ..
            } => write!(f, "SDCARD over SDMMC ({}-line)", width.lines()),
            StorageBackend::CardVolume {
                bus_mode: CardBusMode::Spi(_),
                ..
            } => f.write_str("SDCARD over SPI"),
        }
    }
}

/// Error from the FAT layer, split by what can fix it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// No recognisable filesystem on a healthy device.
    Unrecognized(String),
    /// The device itself failed.
    Device(String),
}

impl From<FsError> for MountError {
    fn from(e: FsError) -> Self {
        match e {
            FsError::Unrecognized(d) => MountError::mount_layer(d),
            FsError::Device(d) => MountError::device_layer(d),
        }
    }
}

/// FAT filesystem on top of an initialised block device.
pub trait FatVolume: Send {
    fn mount_fs(&mut self, mount_path: &Path, cfg: &MountConfig) -> Result<(), FsError>;
    fn format(&mut self, cfg: &MountConfig) -> Result<(), FsError>;
    fn unmount_fs(&mut self, mount_path: &Path) -> Result<(), FsError>;
}

/// Owned proof that a volume is mounted. Consumed by the matching unmount.
#[derive(Debug)]
#[must_use = "dropping a MountHandle leaves the volume mounted"]
pub struct MountHandle {
    mount_path: PathBuf,
    token: u64,
    formatted: bool,
}

impl MountHandle {
    pub(crate) fn new(mount_path: PathBuf, token: u64, formatted: bool) -> Self {
        Self {
            mount_path,
            token,
            formatted,
        }
    }

    pub fn mount_path(&self) -> &Path {
        &self.mount_path
    }

    /// True when the volume had to be formatted to mount.
    pub fn was_formatted(&self) -> bool {
        self.formatted
    }

    pub(crate) fn token(&self) -> u64 {
        self.token
    }
}

/// Common capability of every backend.
pub trait VolumeMounter: Send {
    fn backend(&self) -> &StorageBackend;
    fn mount(&mut self) -> Result<MountHandle, MountError>;

    /// Release the volume. The device is detached even when the FAT layer
    /// reports an error, so a later `mount` starts clean.
    fn unmount(&mut self, handle: MountHandle) -> Result<(), MountError>;
}

/// Mount through the FAT layer, reformatting at most once.
///
/// Device-layer failures are returned immediately. Returns whether a
/// format took place.
pub fn mount_with_format_policy(
    volume: &mut dyn FatVolume,
    mount_path: &Path,
    cfg: &MountConfig,
) -> Result<bool, MountError> {
    match volume.mount_fs(mount_path, cfg) {
        Ok(()) => Ok(false),
        Err(FsError::Device(detail)) => Err(MountError::device_layer(detail)),
        Err(FsError::Unrecognized(detail)) if cfg.format_if_mount_failed => {
            warn!("no usable filesystem ({detail}); formatting");
            volume.format(cfg)?;
            volume.mount_fs(mount_path, cfg)?;
            Ok(true)
        }
        Err(FsError::Unrecognized(detail)) => Err(MountError::mount_layer(detail)),
    }
}

/// Mount the configured volume.
pub fn mount(mounter: &mut dyn VolumeMounter) -> BringupOutcome<MountHandle> {
    let backend = mounter.backend().to_string();
    info!("Initializing {backend} file system");
    match mounter.mount() {
        Ok(handle) => {
            info!("Mount FAT filesystem on {}", handle.mount_path().display());
            BringupOutcome::Ready(handle)
        }
        Err(e) => {
            error!("Failed to mount {backend} ({e})");
            BringupOutcome::Failed(e.into())
        }
    }
}
