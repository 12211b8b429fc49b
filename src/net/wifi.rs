// CLASSIFICATION: COMMUNITY
// Filename: wifi.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Station-mode radio abstraction.
//!
//! Drivers report link changes as [`WifiEvent`]s on a channel handed out by
//! [`WifiDriver::start`]. Everything above this trait is driver agnostic.

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::mpsc::Receiver;

use serde::Serialize;

use crate::error::DriverError;

/// Access point credentials.
#[derive(Clone)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl WifiCredentials {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fixed interface addressing used instead of a DHCP lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIpConfig {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    /// Primary and secondary resolvers. No lease means nobody hands these out.
    pub dns: [Ipv4Addr; 2],
}

/// Public resolvers installed when the configuration names none.
pub const DEFAULT_DNS: [Ipv4Addr; 2] = [Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(8, 8, 4, 4)];

/// Address information of the station interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IpInfo {
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
}

/// Link notifications emitted by a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiEvent {
    /// Radio is up in station mode and ready to associate.
    StationStarted,
    /// Association failed or was lost.
    Disconnected { reason: u16 },
    /// Interface has an address (lease or static).
    GotIp(IpInfo),
}

/// Station-mode radio driver.
pub trait WifiDriver: Send {
    /// Stop the lease client and pin the interface to `cfg`. Called before
    /// `start` when static addressing is configured.
    fn configure_static(&mut self, cfg: &StaticIpConfig) -> Result<(), DriverError>;

    /// Bring the radio up with `credentials` and return its event stream.
    fn start(&mut self, credentials: &WifiCredentials) -> Result<Receiver<WifiEvent>, DriverError>;

    /// Issue one association attempt. The result arrives as an event.
    fn connect(&mut self) -> Result<(), DriverError>;
}
