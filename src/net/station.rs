// CLASSIFICATION: COMMUNITY
// Filename: station.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Network bring-up: associate with the access point under a retry budget.

use log::{error, info, warn};

use crate::error::BringupError;
use crate::net::wifi::{IpInfo, StaticIpConfig, WifiCredentials, WifiDriver, WifiEvent};
use crate::outcome::BringupOutcome;
use crate::retry::RetryBudget;

/// Proof that the station is associated and has an address.
///
/// Released only at process shutdown; teardown after the service run
/// leaves the link up.
#[derive(Debug)]
pub struct ConnectivityHandle {
    ssid: String,
    ip_info: IpInfo,
}

impl ConnectivityHandle {
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn ip_info(&self) -> IpInfo {
        self.ip_info
    }
}

/// What the event loop should do after one link event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationStep {
    /// Issue an association attempt.
    Connect,
    /// Address acquired.
    Ready(IpInfo),
    /// Budget spent; give up.
    Exhausted,
}

/// Reconnect policy driven purely by link notifications.
///
/// The counter is reset on every address acquisition so a later
/// disconnect cycle starts with a full budget.
#[derive(Debug)]
pub struct AssociationTracker {
    budget: RetryBudget,
}

impl AssociationTracker {
    pub fn new(mut budget: RetryBudget) -> Self {
        budget.reset();
        Self { budget }
    }

    pub fn retries(&self) -> u32 {
        self.budget.attempts_made()
    }

    pub fn on_event(&mut self, event: &WifiEvent) -> AssociationStep {
        match event {
            WifiEvent::StationStarted => AssociationStep::Connect,
            WifiEvent::Disconnected { reason } => {
                info!("connect to the AP fail (reason {reason})");
                if self.budget.try_consume() {
                    info!(
                        "retry to connect to the AP ({}/{})",
                        self.budget.attempts_made(),
                        self.budget.max_attempts()
                    );
                    AssociationStep::Connect
                } else {
                    AssociationStep::Exhausted
                }
            }
            WifiEvent::GotIp(info) => {
                info!("got ip:{}", info.ip);
                self.budget.reset();
                AssociationStep::Ready(*info)
            }
        }
    }
}

/// Associate with the configured access point.
///
/// Blocks on the driver's event stream until an address is acquired or the
/// budget runs out. Each retry is triggered by a disconnect notification.
pub fn bring_up_network(
    driver: &mut dyn WifiDriver,
    credentials: &WifiCredentials,
    static_ip: Option<&StaticIpConfig>,
    budget: RetryBudget,
) -> BringupOutcome<ConnectivityHandle> {
    associate(driver, credentials, static_ip, budget).into()
}

fn associate(
    driver: &mut dyn WifiDriver,
    credentials: &WifiCredentials,
    static_ip: Option<&StaticIpConfig>,
    budget: RetryBudget,
) -> Result<ConnectivityHandle, BringupError> {
    if let Some(cfg) = static_ip {
        info!(
            "static address {} mask {} gw {} dns {}, {}",
            cfg.address, cfg.netmask, cfg.gateway, cfg.dns[0], cfg.dns[1]
        );
        driver.configure_static(cfg)?;
    }

    let events = driver.start(credentials)?;
    let mut tracker = AssociationTracker::new(budget);
    let max = budget.max_attempts();

    loop {
        let event = events.recv().map_err(|_| {
            error!("wifi event stream closed before a terminal event");
            BringupError::UnexpectedSignalState("wifi event stream closed".into())
        })?;
        match tracker.on_event(&event) {
            AssociationStep::Connect => driver.connect()?,
            AssociationStep::Ready(ip_info) => {
                info!("connected to ap SSID:{}", credentials.ssid);
                return Ok(ConnectivityHandle {
                    ssid: credentials.ssid.clone(),
                    ip_info,
                });
            }
            AssociationStep::Exhausted => {
                warn!("Failed to connect to SSID:{}", credentials.ssid);
                return Err(BringupError::AssociationExhausted { attempts: max });
            }
        }
    }
}
