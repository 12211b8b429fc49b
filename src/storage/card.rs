// CLASSIFICATION: COMMUNITY
// Filename: card.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! FAT volume on a removable card, over SDMMC or SPI.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use log::{error, info};

use crate::error::{DriverError, MountError};
use crate::storage::{
    mount_with_format_policy, CardBusMode, FatVolume, MountHandle, StorageBackend, VolumeMounter,
};

/// Delay after switching card power on before touching the bus.
pub const POWER_SETTLE: Duration = Duration::from_millis(3000);

/// Identification read from the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInfo {
    pub name: String,
    pub capacity_bytes: u64,
}

/// Card slot and the bus in front of it.
pub trait CardHost: FatVolume {
    /// Drive the peripheral power switch.
    fn set_power(&mut self, pin: u8, on: bool) -> Result<(), DriverError>;

    /// Configure the host controller and pins for `mode`.
    fn init_bus(&mut self, mode: &CardBusMode) -> Result<(), DriverError>;

    /// Run card identification. Fails when no card answers.
    fn probe_card(&mut self) -> Result<CardInfo, DriverError>;

    fn free_bus(&mut self);
}

pub struct CardMounter<H: CardHost> {
    backend: StorageBackend,
    bus_mode: CardBusMode,
    host: H,
    power_settle: Duration,
    mounted: Option<u64>,
    next_token: u64,
    card: Option<CardInfo>,
}

impl<H: CardHost> CardMounter<H> {
    pub fn new(mount_path: impl Into<PathBuf>, bus_mode: CardBusMode, host: H) -> Self {
        Self {
            backend: StorageBackend::CardVolume {
                mount_path: mount_path.into(),
                bus_mode,
            },
            bus_mode,
            host,
            power_settle: POWER_SETTLE,
            mounted: None,
            next_token: 1,
            card: None,
        }
    }

    pub fn with_power_settle(mut self, settle: Duration) -> Self {
        self.power_settle = settle;
        self
    }

    /// Identification of the mounted card.
    pub fn card(&self) -> Option<&CardInfo> {
        self.card.as_ref()
    }

    fn attach(&mut self) -> Result<(MountHandle, CardInfo), MountError> {
        let mode = self.bus_mode;
        let mount_path = self.backend.mount_path().to_path_buf();
        let cfg = self.backend.mount_config();

        if let CardBusMode::Spi(pins) = mode {
            if let Some(pin) = pins.power {
                info!("Turning on the peripherals power using GPIO{pin}");
                self.host
                    .set_power(pin, true)
                    .map_err(|e| MountError::device_layer(format!("power GPIO{pin}: {e}")))?;
                thread::sleep(self.power_settle);
            }
        }

        match mode {
            CardBusMode::Sdmmc {
                width,
                speed,
                internal_pullups,
            } => info!(
                "Using SDMMC peripheral ({}-line, {} kHz, pull-ups {})",
                width.lines(),
                speed.freq_khz(),
                if internal_pullups { "on" } else { "off" }
            ),
            CardBusMode::Spi(_) => info!("Using SPI peripheral"),
        }
        self.host
            .init_bus(&mode)
            .map_err(|e| MountError::device_layer(format!("Failed to initialize bus: {e}")))?;

        let info = match self.host.probe_card() {
            Ok(info) => info,
            Err(e) => {
                self.host.free_bus();
                return Err(MountError::device_layer(format!(
                    "Failed to initialize the card ({e}). Make sure SD card lines have pull-up resistors in place."
                )));
            }
        };

        let formatted = match mount_with_format_policy(&mut self.host, &mount_path, &cfg) {
            Ok(f) => f,
            Err(e) => {
                self.host.free_bus();
                return Err(e);
            }
        };

        let token = self.next_token;
        self.next_token += 1;
        Ok((MountHandle::new(mount_path, token, formatted), info))
    }
}

impl<H: CardHost> VolumeMounter for CardMounter<H> {
    fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    fn mount(&mut self) -> Result<MountHandle, MountError> {
        if self.mounted.is_some() {
            return Err(MountError::mount_layer("card already mounted"));
        }
        match self.attach() {
            Ok((handle, info)) => {
                info!(
                    "Name: {} Size: {}MB",
                    info.name,
                    info.capacity_bytes / (1024 * 1024)
                );
                info!("Mounted SD card on {}", handle.mount_path().display());
                self.mounted = Some(handle.token());
                self.card = Some(info);
                Ok(handle)
            }
            Err(e) => {
                if matches!(self.bus_mode, CardBusMode::Sdmmc { .. }) {
                    error!("Try setting the 1-line SD/MMC mode and lower the SD/MMC card speed.");
                }
                Err(e)
            }
        }
    }

    fn unmount(&mut self, handle: MountHandle) -> Result<(), MountError> {
        if self.mounted != Some(handle.token()) {
            return Err(MountError::mount_layer("handle does not belong to this card"));
        }
        let res = self.host.unmount_fs(handle.mount_path());
        self.host.free_bus();
        self.mounted = None;
        self.card = None;
        res?;
        info!("SDCARD unmounted");
        Ok(())
    }
}
