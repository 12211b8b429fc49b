// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Deploy-time configuration.
//!
//! Loaded once from TOML and validated before anything touches hardware.
//! Nothing here is mutable at runtime.

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::clock::{DEFAULT_POLL_INTERVAL, DEFAULT_SYNC_POLLS};
use crate::error::ConfigError;
use crate::net::wifi::{StaticIpConfig, WifiCredentials, DEFAULT_DNS};
use crate::storage::card::POWER_SETTLE;
use crate::storage::{CardBusMode, SdmmcSpeed, SdmmcWidth, SpiPins, StorageBackend, DEFAULT_MOUNT_PATH};

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV: &str = "FTP_BRINGUP_CONFIG";
/// Configuration path used when neither flag nor environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/ftp-bringup.toml";

const DEFAULT_MAX_RETRY: u32 = 5;
const DEFAULT_NTP_SERVER: &str = "pool.ntp.org";
const DEFAULT_PARTITION: &str = "storage";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    wifi: RawWifi,
    mdns: RawMdns,
    #[serde(default)]
    ntp: RawNtp,
    #[serde(default)]
    storage: RawStorage,
    service: Option<RawService>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWifi {
    ssid: String,
    #[serde(default)]
    password: String,
    #[serde(default = "default_max_retry")]
    max_retry: u32,
    static_ip: Option<RawStaticIp>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStaticIp {
    address: String,
    netmask: String,
    gateway: String,
    dns: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMdns {
    hostname: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNtp {
    #[serde(default = "default_ntp_server")]
    server: String,
    #[serde(default)]
    timezone_offset_hours: i32,
    poll_interval_ms: Option<u64>,
    max_polls: Option<u32>,
}

impl Default for RawNtp {
    fn default() -> Self {
        Self {
            server: default_ntp_server(),
            timezone_offset_hours: 0,
            poll_interval_ms: None,
            max_polls: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStorage {
    #[serde(default = "default_mount_path")]
    mount_path: String,
    #[serde(default)]
    backend: RawBackend,
    power_settle_ms: Option<u64>,
}

impl Default for RawStorage {
    fn default() -> Self {
        Self {
            mount_path: default_mount_path(),
            backend: RawBackend::default(),
            power_settle_ms: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RawBackend {
    Flash {
        #[serde(default = "default_partition")]
        partition_label: String,
    },
    Sdmmc {
        #[serde(default = "default_width")]
        width: u8,
        #[serde(default = "default_speed")]
        speed: String,
        #[serde(default = "default_pullups")]
        internal_pullups: bool,
    },
    Sdspi {
        miso: u8,
        mosi: u8,
        sclk: u8,
        cs: u8,
        power: Option<u8>,
    },
}

impl Default for RawBackend {
    fn default() -> Self {
        RawBackend::Flash {
            partition_label: default_partition(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawService {
    command: String,
    #[serde(default)]
    args: Vec<String>,
}

fn default_max_retry() -> u32 {
    DEFAULT_MAX_RETRY
}

fn default_ntp_server() -> String {
    DEFAULT_NTP_SERVER.into()
}

fn default_mount_path() -> String {
    DEFAULT_MOUNT_PATH.into()
}

fn default_partition() -> String {
    DEFAULT_PARTITION.into()
}

fn default_width() -> u8 {
    4
}

fn default_speed() -> String {
    "default".into()
}

fn default_pullups() -> bool {
    true
}

/// External daemon launched by the service supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCommand {
    pub command: String,
    pub args: Vec<String>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct BringupConfig {
    pub credentials: WifiCredentials,
    pub max_retry: u32,
    pub static_ip: Option<StaticIpConfig>,
    pub hostname: String,
    pub ntp_server: String,
    pub utc_offset_hours: i32,
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub backend: StorageBackend,
    pub power_settle: Duration,
    pub service: Option<ServiceCommand>,
}

impl BringupConfig {
    /// Path from `FTP_BRINGUP_CONFIG`, else the system default.
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(data)?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.wifi.ssid.trim().is_empty() {
            return Err(invalid("wifi.ssid must not be empty"));
        }
        if raw.wifi.max_retry == 0 {
            return Err(invalid("wifi.max_retry must be at least 1"));
        }
        if raw.mdns.hostname.trim().is_empty() {
            return Err(invalid("mdns.hostname must not be empty"));
        }
        if !(-12..=14).contains(&raw.ntp.timezone_offset_hours) {
            return Err(invalid(format!(
                "ntp.timezone_offset_hours {} outside -12..=14",
                raw.ntp.timezone_offset_hours
            )));
        }
        let max_polls = raw.ntp.max_polls.unwrap_or(DEFAULT_SYNC_POLLS);
        if max_polls == 0 {
            return Err(invalid("ntp.max_polls must be at least 1"));
        }

        let mount_path = PathBuf::from(&raw.storage.mount_path);
        if !mount_path.is_absolute() {
            return Err(invalid(format!(
                "storage.mount_path {:?} must be absolute",
                raw.storage.mount_path
            )));
        }

        let static_ip = raw.wifi.static_ip.map(parse_static_ip).transpose()?;
        let backend = parse_backend(raw.storage.backend, mount_path)?;

        Ok(Self {
            credentials: WifiCredentials::new(raw.wifi.ssid, raw.wifi.password),
            max_retry: raw.wifi.max_retry,
            static_ip,
            hostname: raw.mdns.hostname,
            ntp_server: raw.ntp.server,
            utc_offset_hours: raw.ntp.timezone_offset_hours,
            poll_interval: raw
                .ntp
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            max_polls,
            backend,
            power_settle: raw
                .storage
                .power_settle_ms
                .map(Duration::from_millis)
                .unwrap_or(POWER_SETTLE),
            service: raw.service.map(|s| ServiceCommand {
                command: s.command,
                args: s.args,
            }),
        })
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

fn parse_addr(field: &str, value: &str) -> Result<Ipv4Addr, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(format!("{field} {value:?} is not an IPv4 address")))
}

fn parse_static_ip(raw: RawStaticIp) -> Result<StaticIpConfig, ConfigError> {
    let dns = match raw.dns {
        None => DEFAULT_DNS,
        Some(list) if list.len() == 2 => [
            parse_addr("wifi.static_ip.dns[0]", &list[0])?,
            parse_addr("wifi.static_ip.dns[1]", &list[1])?,
        ],
        Some(list) => {
            return Err(invalid(format!(
                "wifi.static_ip.dns needs exactly two servers, got {}",
                list.len()
            )))
        }
    };
    Ok(StaticIpConfig {
        address: parse_addr("wifi.static_ip.address", &raw.address)?,
        netmask: parse_addr("wifi.static_ip.netmask", &raw.netmask)?,
        gateway: parse_addr("wifi.static_ip.gateway", &raw.gateway)?,
        dns,
    })
}

fn parse_speed(speed: &str) -> Result<SdmmcSpeed, ConfigError> {
    match speed {
        "probing" => Ok(SdmmcSpeed::Probing),
        "default" => Ok(SdmmcSpeed::Default),
        "high" => Ok(SdmmcSpeed::HighSpeed),
        "26m" => Ok(SdmmcSpeed::Mhz26),
        "52m" => Ok(SdmmcSpeed::Mhz52),
        other => Err(invalid(format!("storage.backend.speed {other:?} unknown"))),
    }
}

fn parse_backend(raw: RawBackend, mount_path: PathBuf) -> Result<StorageBackend, ConfigError> {
    match raw {
        RawBackend::Flash { partition_label } => {
            if partition_label.is_empty() {
                return Err(invalid("storage.backend.partition_label must not be empty"));
            }
            Ok(StorageBackend::FlashVolume {
                partition_label,
                mount_path,
            })
        }
        RawBackend::Sdmmc {
            width,
            speed,
            internal_pullups,
        } => {
            let width = match width {
                1 => SdmmcWidth::One,
                4 => SdmmcWidth::Four,
                w => return Err(invalid(format!("storage.backend.width must be 1 or 4, got {w}"))),
            };
            Ok(StorageBackend::CardVolume {
                mount_path,
                bus_mode: CardBusMode::Sdmmc {
                    width,
                    speed: parse_speed(&speed)?,
                    internal_pullups,
                },
            })
        }
        RawBackend::Sdspi {
            miso,
            mosi,
            sclk,
            cs,
            power,
        } => Ok(StorageBackend::CardVolume {
            mount_path,
            bus_mode: CardBusMode::Spi(SpiPins {
                miso,
                mosi,
                sclk,
                cs,
                power,
            }),
        }),
    }
}
