// CLASSIFICATION: COMMUNITY
// Filename: radio.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Scripted radio, responder and time client.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use ftp_bringup::clock::{SyncStatus, TimeSyncClient};
use ftp_bringup::error::DriverError;
use ftp_bringup::net::{IpInfo, NameAdvertiser, StaticIpConfig, WifiCredentials, WifiDriver, WifiEvent};

/// Reason code reported for a rejected handshake.
pub const REASON_AUTH_FAIL: u16 = 202;
/// Reason code reported when the AP is not in range.
pub const REASON_NO_AP_FOUND: u16 = 201;

/// How the scripted access point responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScript {
    /// Drop the first `failures` attempts, then hand out an address.
    AssociateAfter { failures: u32 },
    /// Reject every attempt (wrong credentials).
    RejectAll,
    /// Start, then close the event stream without a terminal event.
    Vanish,
}

#[derive(Debug, Default)]
pub struct RadioCounters {
    pub connects: AtomicU32,
    pub static_configured: AtomicBool,
}

impl RadioCounters {
    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }
}

pub struct ScriptedRadio {
    script: LinkScript,
    failures_left: u32,
    static_ip: Option<StaticIpConfig>,
    events: Option<Sender<WifiEvent>>,
    counters: Arc<RadioCounters>,
}

impl ScriptedRadio {
    pub fn new(script: LinkScript) -> (Self, Arc<RadioCounters>) {
        let counters = Arc::new(RadioCounters::default());
        let failures_left = match script {
            LinkScript::AssociateAfter { failures } => failures,
            _ => 0,
        };
        (
            Self {
                script,
                failures_left,
                static_ip: None,
                events: None,
                counters: Arc::clone(&counters),
            },
            counters,
        )
    }

    fn lease(&self) -> IpInfo {
        match &self.static_ip {
            Some(s) => IpInfo {
                ip: s.address,
                netmask: s.netmask,
                gateway: s.gateway,
            },
            None => IpInfo {
                ip: Ipv4Addr::new(192, 168, 4, 2),
                netmask: Ipv4Addr::new(255, 255, 255, 0),
                gateway: Ipv4Addr::new(192, 168, 4, 1),
            },
        }
    }

    fn emit(&self, event: WifiEvent) -> Result<(), DriverError> {
        match &self.events {
            Some(tx) => tx
                .send(event)
                .map_err(|_| DriverError::new("event stream closed")),
            None => Err(DriverError::new("radio not started")),
        }
    }
}

impl WifiDriver for ScriptedRadio {
    fn configure_static(&mut self, cfg: &StaticIpConfig) -> Result<(), DriverError> {
        self.static_ip = Some(cfg.clone());
        self.counters.static_configured.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn start(&mut self, _credentials: &WifiCredentials) -> Result<Receiver<WifiEvent>, DriverError> {
        let (tx, rx) = mpsc::channel();
        tx.send(WifiEvent::StationStarted)
            .map_err(|_| DriverError::new("event stream closed"))?;
        if self.script != LinkScript::Vanish {
            self.events = Some(tx);
        }
        Ok(rx)
    }

    fn connect(&mut self) -> Result<(), DriverError> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        match self.script {
            LinkScript::Vanish => Ok(()),
            LinkScript::RejectAll => self.emit(WifiEvent::Disconnected {
                reason: REASON_AUTH_FAIL,
            }),
            LinkScript::AssociateAfter { .. } if self.failures_left > 0 => {
                self.failures_left -= 1;
                self.emit(WifiEvent::Disconnected {
                    reason: REASON_NO_AP_FOUND,
                })
            }
            _ => self.emit(WifiEvent::GotIp(self.lease())),
        }
    }
}

/// Responder that records published names.
pub struct SimAdvertiser {
    fail: bool,
    names: Arc<Mutex<Vec<String>>>,
}

impl SimAdvertiser {
    pub fn new(fail: bool) -> (Self, Arc<Mutex<Vec<String>>>) {
        let names = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                fail,
                names: Arc::clone(&names),
            },
            names,
        )
    }
}

impl NameAdvertiser for SimAdvertiser {
    fn init(&mut self) -> Result<(), DriverError> {
        if self.fail {
            return Err(DriverError::new("responder init failed"));
        }
        Ok(())
    }

    fn set_hostname(&mut self, hostname: &str) -> Result<(), DriverError> {
        let mut names = self
            .names
            .lock()
            .map_err(|_| DriverError::new("name list poisoned"))?;
        if !names.iter().any(|n| n == hostname) {
            names.push(hostname.to_string());
        }
        Ok(())
    }
}

/// Time client that stays unset for a fixed number of polls.
pub struct ScriptedClock {
    unset_polls: Option<u32>,
    polls: Arc<AtomicU32>,
    started: bool,
}

impl ScriptedClock {
    /// `unset_polls = None` never syncs.
    pub fn new(unset_polls: Option<u32>) -> (Self, Arc<AtomicU32>) {
        let polls = Arc::new(AtomicU32::new(0));
        (
            Self {
                unset_polls,
                polls: Arc::clone(&polls),
                started: false,
            },
            polls,
        )
    }
}

impl TimeSyncClient for ScriptedClock {
    fn start(&mut self, _server: &str) -> Result<(), DriverError> {
        self.started = true;
        Ok(())
    }

    fn sync_status(&self) -> SyncStatus {
        let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.unset_polls {
            Some(unset) if self.started && n > unset => SyncStatus::Completed,
            _ => SyncStatus::Reset,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}
