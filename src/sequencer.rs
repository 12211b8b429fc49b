// CLASSIFICATION: COMMUNITY
// Filename: sequencer.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Bring-up / bring-down sequencer.
//!
//! ```text
//! Init → NetworkUp → NameAdvertised → ClockSynced → StorageMounted
//!      → ServiceRunning → ServiceDone → Teardown → Terminal
//! ```
//!
//! Each forward transition requires the previous stage to be `Ready`. The
//! first `Failed` outcome jumps straight to `Teardown` with whatever was
//! acquired so far. Teardown only reverses stages that committed a
//! resource, which today means the mount. The link stays up.

use std::fmt;
use std::time::Duration;

use log::{error, info, warn};
use serde::Serialize;
use serde_json::json;

use crate::clock::{local_time_string, sync_clock, TimeSyncClient};
use crate::config::BringupConfig;
use crate::error::{BringupError, MountError};
use crate::net::{
    advertise, bring_up_network, ConnectivityHandle, IpInfo, NameAdvertiser, StaticIpConfig,
    WifiCredentials, WifiDriver,
};
use crate::retry::RetryBudget;
use crate::service::{start_service, FileTransferService};
use crate::signal::ServiceExit;
use crate::storage::{self, MountHandle, VolumeMounter};

/// States of the sequencer, in their only legal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SequencerState {
    Init,
    NetworkUp,
    NameAdvertised,
    ClockSynced,
    StorageMounted,
    ServiceRunning,
    ServiceDone,
    Teardown,
    Terminal,
}

impl SequencerState {
    /// Forward successor on success.
    pub fn next(self) -> Option<SequencerState> {
        use SequencerState::*;
        match self {
            Init => Some(NetworkUp),
            NetworkUp => Some(NameAdvertised),
            NameAdvertised => Some(ClockSynced),
            ClockSynced => Some(StorageMounted),
            StorageMounted => Some(ServiceRunning),
            ServiceRunning => Some(ServiceDone),
            ServiceDone => Some(Teardown),
            Teardown => Some(Terminal),
            Terminal => None,
        }
    }

    /// Whether `to` is reachable from `self` in one step.
    pub fn can_enter(self, to: SequencerState) -> bool {
        match to {
            SequencerState::Teardown => self != SequencerState::Terminal,
            _ => self.next() == Some(to),
        }
    }
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Inputs of the stages that the sequencer drives directly.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub credentials: WifiCredentials,
    pub static_ip: Option<StaticIpConfig>,
    pub max_retry: u32,
    pub hostname: String,
    pub ntp_server: String,
    pub max_polls: u32,
    pub poll_interval: Duration,
    pub utc_offset_hours: i32,
}

impl From<&BringupConfig> for SequencerConfig {
    fn from(cfg: &BringupConfig) -> Self {
        Self {
            credentials: cfg.credentials.clone(),
            static_ip: cfg.static_ip.clone(),
            max_retry: cfg.max_retry,
            hostname: cfg.hostname.clone(),
            ntp_server: cfg.ntp_server.clone(),
            max_polls: cfg.max_polls,
            poll_interval: cfg.poll_interval,
            utc_offset_hours: cfg.utc_offset_hours,
        }
    }
}

/// The external collaborators, one per stage.
pub struct Collaborators {
    pub wifi: Box<dyn WifiDriver>,
    pub advertiser: Box<dyn NameAdvertiser>,
    pub clock: Box<dyn TimeSyncClient>,
    pub storage: Box<dyn VolumeMounter>,
    pub service: Box<dyn FileTransferService>,
}

/// What happened during one sequencer lifetime.
#[derive(Debug)]
pub struct SequenceReport {
    pub history: Vec<SequencerState>,
    pub failure: Option<BringupError>,
    pub service_exit: Option<ServiceExit>,
    pub teardown_error: Option<MountError>,
    /// Link acquired during bring-up. Still associated.
    pub link: Option<ConnectivityHandle>,
}

impl SequenceReport {
    /// Bring-up completed, the service ran and the volume was released.
    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && self.teardown_error.is_none()
    }

    pub fn reached(&self, state: SequencerState) -> bool {
        self.history.contains(&state)
    }

    pub fn final_state(&self) -> SequencerState {
        self.history.last().copied().unwrap_or(SequencerState::Init)
    }

    pub fn ip_info(&self) -> Option<IpInfo> {
        self.link.as_ref().map(ConnectivityHandle::ip_info)
    }

    /// Machine-readable summary for the boot log.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "succeeded": self.succeeded(),
            "history": self.history,
            "failure": self.failure.as_ref().map(|e| json!({
                "kind": e.kind(),
                "detail": e.to_string(),
            })),
            "service_exit": self.service_exit.as_ref().map(|e| match e {
                ServiceExit::Finished => "finished".to_string(),
                ServiceExit::Aborted(why) => format!("aborted: {why}"),
            }),
            "teardown_error": self.teardown_error.as_ref().map(ToString::to_string),
            "ip": self.ip_info(),
        })
    }
}

/// Single-use bring-up state machine.
pub struct Sequencer {
    cfg: SequencerConfig,
    wifi: Box<dyn WifiDriver>,
    advertiser: Box<dyn NameAdvertiser>,
    clock: Box<dyn TimeSyncClient>,
    storage: Box<dyn VolumeMounter>,
    service: Option<Box<dyn FileTransferService>>,
    state: SequencerState,
    history: Vec<SequencerState>,
    link: Option<ConnectivityHandle>,
    mount: Option<MountHandle>,
    service_exit: Option<ServiceExit>,
}

impl Sequencer {
    pub fn new(cfg: SequencerConfig, parts: Collaborators) -> Self {
        Self {
            cfg,
            wifi: parts.wifi,
            advertiser: parts.advertiser,
            clock: parts.clock,
            storage: parts.storage,
            service: Some(parts.service),
            state: SequencerState::Init,
            history: vec![SequencerState::Init],
            link: None,
            mount: None,
            service_exit: None,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Drive the whole sequence to `Terminal`. Consumes the sequencer; a
    /// new run needs a fresh boot.
    pub fn run(mut self) -> SequenceReport {
        let failure = if self.state == SequencerState::Init {
            self.bring_up().err()
        } else {
            Some(BringupError::UnexpectedSignalState(format!(
                "sequencer started from {}",
                self.state
            )))
        };
        if let Some(e) = &failure {
            error!("bring-up failed in {}: {e}", self.state);
        }
        let teardown_error = self.teardown().err();
        self.enter(SequencerState::Terminal);
        info!("sequencer terminal ({})", if failure.is_none() { "ok" } else { "failed" });

        SequenceReport {
            history: self.history,
            failure,
            service_exit: self.service_exit,
            teardown_error,
            link: self.link,
        }
    }

    fn enter(&mut self, to: SequencerState) {
        if !self.state.can_enter(to) {
            warn!("illegal transition {} -> {to} ignored", self.state);
            return;
        }
        info!("state {} -> {to}", self.state);
        self.state = to;
        self.history.push(to);
    }

    fn bring_up(&mut self) -> Result<(), BringupError> {
        let budget = RetryBudget::new(self.cfg.max_retry)?;
        info!("ESP_WIFI_MODE_STA ssid {}", self.cfg.credentials.ssid);
        let link = bring_up_network(
            self.wifi.as_mut(),
            &self.cfg.credentials,
            self.cfg.static_ip.as_ref(),
            budget,
        )
        .into_result()?;
        let ip = link.ip_info();
        self.link = Some(link);
        self.enter(SequencerState::NetworkUp);

        if let Some(link) = self.link.as_ref() {
            advertise(self.advertiser.as_mut(), &self.cfg.hostname, link).into_result()?;
        }
        self.enter(SequencerState::NameAdvertised);
        info!("IP Address : {}", ip.ip);
        info!("Subnet mask: {}", ip.netmask);
        info!("Gateway    : {}", ip.gateway);

        info!("Getting time over NTP.");
        let budget = RetryBudget::new(self.cfg.max_polls)?;
        let synced = sync_clock(
            self.clock.as_mut(),
            &self.cfg.ntp_server,
            budget,
            self.cfg.poll_interval,
        )
        .into_result()?;
        self.enter(SequencerState::ClockSynced);
        info!(
            "The local date/time is: {}",
            local_time_string(synced.utc, self.cfg.utc_offset_hours)
        );
        warn!("This server manages file timestamps in GMT.");

        let handle = storage::mount(self.storage.as_mut()).into_result()?;
        self.mount = Some(handle);
        self.enter(SequencerState::StorageMounted);

        let service = self
            .service
            .take()
            .ok_or_else(|| BringupError::UnexpectedSignalState("service already started".into()))?;
        let mount = self
            .mount
            .as_ref()
            .ok_or_else(|| BringupError::UnexpectedSignalState("mount handle missing".into()))?;
        let running = start_service(service, mount)?;
        self.enter(SequencerState::ServiceRunning);

        let exit = running.wait()?;
        self.service_exit = Some(exit);
        self.enter(SequencerState::ServiceDone);
        Ok(())
    }

    /// Release what was acquired. Safe to call from any state and more than
    /// once; unmount happens only while a mount handle is held.
    pub fn teardown(&mut self) -> Result<(), MountError> {
        if self.state != SequencerState::Teardown {
            self.enter(SequencerState::Teardown);
        }
        match self.mount.take() {
            Some(handle) => {
                let res = self.storage.unmount(handle);
                if let Err(e) = &res {
                    error!("unmount failed: {e}");
                }
                res
            }
            None => Ok(()),
        }
    }
}
