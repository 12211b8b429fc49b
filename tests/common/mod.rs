// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Scripted collaborators shared by the integration tests.
//!
//! Every driver records what was asked of it in shared counters so a test
//! can inspect them after the sequencer has consumed the driver.

#![allow(dead_code)]

pub mod media;
pub mod radio;

pub use media::{MediaCounters, MediaState, SimMedia};
pub use radio::{LinkScript, RadioCounters, ScriptedClock, ScriptedRadio, SimAdvertiser};

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ftp_bringup::net::WifiCredentials;
use ftp_bringup::service::FileTransferService;
use ftp_bringup::storage::{
    CardBusMode, CardMounter, FlashMounter, SdmmcSpeed, SdmmcWidth, VolumeMounter,
};
use ftp_bringup::{Collaborators, SequencerConfig};

/// Service backed by a closure.
pub struct FnService<F>
where
    F: FnOnce(&Path) -> Result<(), String> + Send + 'static,
{
    body: F,
}

impl<F> FnService<F>
where
    F: FnOnce(&Path) -> Result<(), String> + Send + 'static,
{
    pub fn new(body: F) -> Self {
        Self { body }
    }
}

impl<F> FileTransferService for FnService<F>
where
    F: FnOnce(&Path) -> Result<(), String> + Send + 'static,
{
    fn name(&self) -> &'static str {
        "SimFTP"
    }

    fn serve(self: Box<Self>, root: &Path) -> Result<(), String> {
        (self.body)(root)
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn seq_cfg(max_retry: u32) -> SequencerConfig {
    SequencerConfig {
        credentials: WifiCredentials::new("lab", "secret"),
        static_ip: None,
        max_retry,
        hostname: "ftp-server".into(),
        ntp_server: "pool.ntp.org".into(),
        max_polls: 10,
        poll_interval: Duration::from_millis(1),
        utc_offset_hours: 9,
    }
}

pub enum Medium {
    Flash,
    Sdmmc,
}

pub struct Rig {
    pub link: LinkScript,
    pub advertiser_fails: bool,
    pub unset_polls: Option<u32>,
    pub medium: Medium,
    pub media: MediaState,
    pub mount_path: PathBuf,
}

impl Default for Rig {
    fn default() -> Self {
        Self {
            link: LinkScript::AssociateAfter { failures: 0 },
            advertiser_fails: false,
            unset_polls: Some(0),
            medium: Medium::Sdmmc,
            media: MediaState::Formatted,
            mount_path: PathBuf::from("/root"),
        }
    }
}

pub struct Probes {
    pub radio: Arc<RadioCounters>,
    pub names: Arc<Mutex<Vec<String>>>,
    pub polls: Arc<AtomicU32>,
    pub media: Arc<MediaCounters>,
}

impl Rig {
    pub fn build<F>(self, service: F) -> (Collaborators, Probes)
    where
        F: FnOnce(&Path) -> Result<(), String> + Send + 'static,
    {
        let (wifi, radio) = ScriptedRadio::new(self.link);
        let (advertiser, names) = SimAdvertiser::new(self.advertiser_fails);
        let (clock, polls) = ScriptedClock::new(self.unset_polls);
        let (device, media) = SimMedia::new(self.media);
        let storage: Box<dyn VolumeMounter> = match self.medium {
            Medium::Flash => Box::new(FlashMounter::new("storage", self.mount_path, device)),
            Medium::Sdmmc => Box::new(CardMounter::new(
                self.mount_path,
                CardBusMode::Sdmmc {
                    width: SdmmcWidth::Four,
                    speed: SdmmcSpeed::Default,
                    internal_pullups: true,
                },
                device,
            )),
        };
        (
            Collaborators {
                wifi: Box::new(wifi),
                advertiser: Box::new(advertiser),
                clock: Box::new(clock),
                storage,
                service: Box::new(FnService::new(service)),
            },
            Probes {
                radio,
                names,
                polls,
                media,
            },
        )
    }
}
