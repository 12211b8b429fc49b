// CLASSIFICATION: COMMUNITY
// Filename: net.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Station and name announcer backed by the host network stack.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, info, warn};

use crate::error::DriverError;
use crate::net::{IpInfo, NameAdvertiser, StaticIpConfig, WifiCredentials, WifiDriver, WifiEvent};

/// UDP port used for discovery announcements.
pub const DISCOVERY_PORT: u16 = 9864;
/// Reason code reported when no route is available.
pub const REASON_NO_ROUTE: u16 = 201;

/// Address used to pick the outbound interface. Nothing is sent to it.
const ROUTE_PROBE: (Ipv4Addr, u16) = (Ipv4Addr::new(8, 8, 8, 8), 53);

/// The host is already associated; "connecting" means finding a routable
/// IPv4 address on it.
#[derive(Default)]
pub struct HostStation {
    static_ip: Option<StaticIpConfig>,
    events: Option<Sender<WifiEvent>>,
}

impl HostStation {
    pub fn new() -> Self {
        Self::default()
    }

    fn probe(&self) -> std::io::Result<IpInfo> {
        if let Some(s) = &self.static_ip {
            return Ok(IpInfo {
                ip: s.address,
                netmask: s.netmask,
                gateway: s.gateway,
            });
        }
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(ROUTE_PROBE)?;
        match socket.local_addr()?.ip() {
            IpAddr::V4(ip) if !ip.is_unspecified() => Ok(IpInfo {
                ip,
                netmask: Ipv4Addr::UNSPECIFIED,
                gateway: Ipv4Addr::UNSPECIFIED,
            }),
            other => Err(std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                format!("no IPv4 route ({other})"),
            )),
        }
    }
}

impl WifiDriver for HostStation {
    fn configure_static(&mut self, cfg: &StaticIpConfig) -> Result<(), DriverError> {
        info!(
            "static address {} mask {} gw {} dns {} {}",
            cfg.address, cfg.netmask, cfg.gateway, cfg.dns[0], cfg.dns[1]
        );
        self.static_ip = Some(cfg.clone());
        Ok(())
    }

    fn start(&mut self, credentials: &WifiCredentials) -> Result<Receiver<WifiEvent>, DriverError> {
        debug!("host station start for {:?}", credentials);
        let (tx, rx) = mpsc::channel();
        tx.send(WifiEvent::StationStarted)
            .map_err(|_| DriverError::new("event stream closed"))?;
        self.events = Some(tx);
        Ok(rx)
    }

    fn connect(&mut self) -> Result<(), DriverError> {
        let tx = self
            .events
            .as_ref()
            .ok_or_else(|| DriverError::new("station not started"))?;
        let event = match self.probe() {
            Ok(lease) => WifiEvent::GotIp(lease),
            Err(e) => {
                warn!("no usable address: {e}");
                WifiEvent::Disconnected {
                    reason: REASON_NO_ROUTE,
                }
            }
        };
        tx.send(event)
            .map_err(|_| DriverError::new("event stream closed"))
    }
}

/// Announces the hostname with a UDP datagram on the discovery port.
pub struct HostAdvertiser {
    target: SocketAddr,
    socket: Option<UdpSocket>,
}

impl HostAdvertiser {
    /// Broadcast on the local segment.
    pub fn broadcast() -> Self {
        Self::to(SocketAddr::from((Ipv4Addr::BROADCAST, DISCOVERY_PORT)))
    }

    pub fn to(target: SocketAddr) -> Self {
        Self {
            target,
            socket: None,
        }
    }
}

impl NameAdvertiser for HostAdvertiser {
    fn init(&mut self) -> Result<(), DriverError> {
        if self.socket.is_some() {
            return Ok(());
        }
        let socket = UdpSocket::bind(("0.0.0.0", 0))
            .map_err(|e| DriverError::new(format!("bind announcer: {e}")))?;
        socket
            .set_broadcast(true)
            .map_err(|e| DriverError::new(format!("enable broadcast: {e}")))?;
        self.socket = Some(socket);
        Ok(())
    }

    fn set_hostname(&mut self, hostname: &str) -> Result<(), DriverError> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| DriverError::new("announcer not initialised"))?;
        let msg = format!("ftp-bringup hostname={hostname}");
        socket
            .send_to(msg.as_bytes(), self.target)
            .map_err(|e| DriverError::new(format!("announce to {}: {e}", self.target)))?;
        debug!("announced {hostname} to {}", self.target);
        Ok(())
    }
}
