// CLASSIFICATION: COMMUNITY
// Filename: service.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Supervisor for the file-transfer service task.
//!
//! The service runs on its own thread against the mounted root. The
//! supervisor's only interaction with it afterwards is the completion
//! signal; there is no automatic restart.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use log::{error, info};

use crate::error::BringupError;
use crate::signal::{completion_pair, ServiceCompletionSignal, ServiceExit};
use crate::storage::MountHandle;

/// Stack reserved for the service thread.
pub const SERVICE_STACK_SIZE: usize = 256 * 1024;

/// A file-transfer engine. Internals are its own business, including
/// concurrency control over files under `root`.
pub trait FileTransferService: Send + 'static {
    fn name(&self) -> &'static str;

    /// Serve until the engine decides to stop.
    fn serve(self: Box<Self>, root: &Path) -> Result<(), String>;
}

/// A started service whose completion has not been observed yet.
#[derive(Debug)]
pub struct RunningService {
    name: &'static str,
    signal: ServiceCompletionSignal,
}

impl RunningService {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Block until the service task fires its completion signal.
    pub fn wait(self) -> Result<ServiceExit, BringupError> {
        let exit = self.signal.wait()?;
        match &exit {
            ServiceExit::Finished => info!("{} task finish", self.name),
            ServiceExit::Aborted(why) => error!("{} task aborted: {why}", self.name),
        }
        Ok(exit)
    }
}

/// Spawn `service` on its own thread, bound to the mounted volume.
pub fn start_service(
    service: Box<dyn FileTransferService>,
    mount: &MountHandle,
) -> Result<RunningService, BringupError> {
    let name = service.name();
    let root = mount.mount_path().to_path_buf();
    let (notifier, signal) = completion_pair();
    info!("starting {name} on {}", root.display());
    thread::Builder::new()
        .name(name.to_lowercase())
        .stack_size(SERVICE_STACK_SIZE)
        .spawn(move || {
            let exit = match service.serve(&root) {
                Ok(()) => ServiceExit::Finished,
                Err(e) => ServiceExit::Aborted(e),
            };
            notifier.fire(exit);
        })
        .map_err(|e| BringupError::UnexpectedSignalState(format!("cannot spawn {name}: {e}")))?;
    Ok(RunningService { name, signal })
}

/// Start `service` and wait for it to finish.
pub fn run_service(
    service: Box<dyn FileTransferService>,
    mount: &MountHandle,
) -> Result<ServiceExit, BringupError> {
    start_service(service, mount)?.wait()
}

/// Runs an external file-transfer daemon with the mount point as its
/// working directory.
#[derive(Debug, Clone)]
pub struct CommandService {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandService {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl FileTransferService for CommandService {
    fn name(&self) -> &'static str {
        "FTP"
    }

    fn serve(self: Box<Self>, root: &Path) -> Result<(), String> {
        info!("exec {} {:?}", self.program.display(), self.args);
        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(root)
            .status()
            .map_err(|e| format!("spawn {}: {e}", self.program.display()))?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("{} exited with {status}", self.program.display()))
        }
    }
}
