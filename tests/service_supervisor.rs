// CLASSIFICATION: COMMUNITY
// Filename: service_supervisor.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

mod common;

use std::fs;

use ftp_bringup::service::{run_service, start_service, CommandService};
use ftp_bringup::signal::ServiceExit;
use common::{FnService, MediaState, SimMedia};
use ftp_bringup::storage::{FlashMounter, VolumeMounter};
use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn closure_service_runs_in_mount_root() {
    common::init_logger();
    let dir = tempdir().unwrap();
    let (media, _) = SimMedia::new(MediaState::Formatted);
    let mut flash = FlashMounter::new("storage", dir.path(), media);
    let handle = flash.mount().unwrap();

    let running = start_service(
        Box::new(FnService::new(|root| {
            fs::write(root.join("upload.bin"), [0u8; 16]).map_err(|e| e.to_string())
        })),
        &handle,
    )
    .unwrap();
    assert_eq!(running.name(), "SimFTP");
    assert_eq!(running.wait().unwrap(), ServiceExit::Finished);
    assert_eq!(fs::metadata(dir.path().join("upload.bin")).unwrap().len(), 16);
    flash.unmount(handle).unwrap();
}

#[test]
#[serial]
#[cfg(unix)]
fn command_exit_status_maps_to_exit() {
    let dir = tempdir().unwrap();
    let (media, _) = SimMedia::new(MediaState::Formatted);
    let mut flash = FlashMounter::new("storage", dir.path(), media);
    let handle = flash.mount().unwrap();

    let ok = run_service(Box::new(CommandService::new("true", Vec::new())), &handle).unwrap();
    assert_eq!(ok, ServiceExit::Finished);

    let failed = run_service(Box::new(CommandService::new("false", Vec::new())), &handle).unwrap();
    assert!(matches!(failed, ServiceExit::Aborted(_)));

    let missing = run_service(
        Box::new(CommandService::new("/nonexistent/ftpd", Vec::new())),
        &handle,
    )
    .unwrap();
    assert!(matches!(missing, ServiceExit::Aborted(_)));
    flash.unmount(handle).unwrap();
}
