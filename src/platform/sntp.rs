// CLASSIFICATION: COMMUNITY
// Filename: sntp.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Minimal SNTP client in continuous polling mode.
//!
//! The host clock is never stepped. The client keeps the offset between
//! the server and the local clock and applies it in [`TimeSyncClient::now`].

use std::net::{ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::clock::{SyncStatus, TimeSyncClient};
use crate::error::DriverError;

/// Seconds between 1900-01-01 and 1970-01-01.
const NTP_UNIX_DELTA: u64 = 2_208_988_800;
const NTP_PORT: u16 = 123;
const PACKET_LEN: usize = 48;
/// LI = 0, VN = 3, Mode = 3 (client).
const CLIENT_HEADER: u8 = 0x1B;
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);
/// Delay between polls after a successful exchange.
pub const RESYNC_PERIOD: Duration = Duration::from_secs(3600);
/// Delay between polls while unsynchronised.
pub const RETRY_PERIOD: Duration = Duration::from_secs(1);

pub struct HostSntp {
    offset: Arc<Mutex<Option<chrono::Duration>>>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl HostSntp {
    pub fn new() -> Self {
        Self {
            offset: Arc::new(Mutex::new(None)),
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    fn offset(&self) -> Option<chrono::Duration> {
        self.offset.lock().ok().and_then(|o| *o)
    }
}

impl Default for HostSntp {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSyncClient for HostSntp {
    fn start(&mut self, server: &str) -> Result<(), DriverError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let server = server.to_string();
        let offset = Arc::clone(&self.offset);
        let stop = Arc::clone(&self.stop);
        let worker = thread::Builder::new()
            .name("sntp".into())
            .spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let wait = match query(&server) {
                        Ok(server_time) => {
                            let delta = server_time - Utc::now();
                            debug!("sntp offset {} ms", delta.num_milliseconds());
                            if let Ok(mut slot) = offset.lock() {
                                *slot = Some(delta);
                            }
                            RESYNC_PERIOD
                        }
                        Err(e) => {
                            warn!("sntp query to {server} failed: {e}");
                            RETRY_PERIOD
                        }
                    };
                    thread::park_timeout(wait);
                }
            })
            .map_err(|e| DriverError::new(format!("spawn sntp: {e}")))?;
        self.worker = Some(worker);
        Ok(())
    }

    fn sync_status(&self) -> SyncStatus {
        match self.offset() {
            Some(_) => SyncStatus::Completed,
            None => SyncStatus::Reset,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.offset() {
            Some(delta) => now + delta,
            None => now,
        }
    }
}

impl Drop for HostSntp {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
        }
    }
}

fn query(server: &str) -> std::io::Result<DateTime<Utc>> {
    let addr = (server, NTP_PORT)
        .to_socket_addrs()?
        .find(|a| a.is_ipv4())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no IPv4 address"))?;
    let socket = UdpSocket::bind(("0.0.0.0", 0))?;
    socket.set_read_timeout(Some(REPLY_TIMEOUT))?;
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = CLIENT_HEADER;
    socket.send_to(&packet, addr)?;
    let (n, _) = socket.recv_from(&mut packet)?;
    parse_reply(&packet[..n])
        .map_err(|msg| std::io::Error::new(std::io::ErrorKind::InvalidData, msg))
}

/// Extract the transmit timestamp of a server reply.
pub fn parse_reply(buf: &[u8]) -> Result<DateTime<Utc>, String> {
    if buf.len() < PACKET_LEN {
        return Err(format!("short reply ({} bytes)", buf.len()));
    }
    let mode = buf[0] & 0x07;
    if mode != 4 {
        return Err(format!("unexpected mode {mode}"));
    }
    if buf[1] == 0 {
        return Err("kiss-of-death (stratum 0)".into());
    }
    let secs = u64::from(u32::from_be_bytes([buf[40], buf[41], buf[42], buf[43]]));
    let frac = u64::from(u32::from_be_bytes([buf[44], buf[45], buf[46], buf[47]]));
    let unix = secs
        .checked_sub(NTP_UNIX_DELTA)
        .ok_or_else(|| format!("transmit time {secs} before 1970"))?;
    let nanos = ((frac * 1_000_000_000) >> 32) as u32;
    DateTime::from_timestamp(unix as i64, nanos).ok_or_else(|| "timestamp out of range".into())
}
