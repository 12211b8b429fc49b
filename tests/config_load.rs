// CLASSIFICATION: COMMUNITY
// Filename: config_load.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use ftp_bringup::config::{BringupConfig, CONFIG_ENV, DEFAULT_CONFIG_PATH};
use ftp_bringup::error::ConfigError;
use ftp_bringup::storage::{CardBusMode, SpiPins, StorageBackend};
use ftp_bringup::SequencerConfig;
use serial_test::serial;
use tempfile::tempdir;

const SPI_CARD: &str = r#"
[wifi]
ssid = "workshop"
password = "hunter2"
max_retry = 3

[mdns]
hostname = "esp32-ftp"

[ntp]
server = "ntp.example.org"
timezone_offset_hours = 9
max_polls = 4

[storage]
mount_path = "/sdcard"
power_settle_ms = 10

[storage.backend]
kind = "sdspi"
miso = 2
mosi = 15
sclk = 14
cs = 13
power = 12

[service]
command = "/usr/sbin/ftpd"
args = ["-D"]
"#;

#[test]
#[serial]
fn full_file_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bringup.toml");
    fs::write(&path, SPI_CARD).unwrap();

    let cfg = BringupConfig::load(&path).unwrap();
    assert_eq!(cfg.max_retry, 3);
    assert_eq!(cfg.max_polls, 4);
    assert_eq!(cfg.utc_offset_hours, 9);
    assert_eq!(cfg.power_settle, Duration::from_millis(10));
    assert_eq!(
        cfg.backend,
        StorageBackend::CardVolume {
            mount_path: PathBuf::from("/sdcard"),
            bus_mode: CardBusMode::Spi(SpiPins {
                miso: 2,
                mosi: 15,
                sclk: 14,
                cs: 13,
                power: Some(12),
            }),
        }
    );
    let service = cfg.service.as_ref().unwrap();
    assert_eq!(service.command, "/usr/sbin/ftpd");
    assert_eq!(service.args, vec!["-D".to_string()]);

    let seq = SequencerConfig::from(&cfg);
    assert_eq!(seq.hostname, "esp32-ftp");
    assert!(!format!("{:?}", seq.credentials).contains("hunter2"));
}

#[test]
#[serial]
fn unknown_key_rejected() {
    let text = SPI_CARD.replace("max_retry = 3", "max_retry = 3\nchannel = 6");
    assert!(matches!(
        BringupConfig::from_toml_str(&text),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
#[serial]
fn missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = BringupConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
#[serial]
fn env_overrides_default_path() {
    std::env::remove_var(CONFIG_ENV);
    assert_eq!(BringupConfig::default_path(), PathBuf::from(DEFAULT_CONFIG_PATH));
    std::env::set_var(CONFIG_ENV, "/tmp/other.toml");
    assert_eq!(BringupConfig::default_path(), PathBuf::from("/tmp/other.toml"));
    std::env::remove_var(CONFIG_ENV);
}

#[test]
#[serial]
fn bad_speed_and_offset_rejected() {
    let card = r#"
[wifi]
ssid = "lab"

[mdns]
hostname = "ftp"

[storage.backend]
kind = "sdmmc"
speed = "100m"
"#;
    assert!(matches!(
        BringupConfig::from_toml_str(card),
        Err(ConfigError::Invalid(_))
    ));
    let tz = SPI_CARD.replace("timezone_offset_hours = 9", "timezone_offset_hours = 15");
    assert!(BringupConfig::from_toml_str(&tz).is_err());
}
