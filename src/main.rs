// CLASSIFICATION: COMMUNITY
// Filename: main.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use ftp_bringup::config::BringupConfig;
use ftp_bringup::halt::halt_forever;
use ftp_bringup::nvs::init_store;
use ftp_bringup::platform::{host_collaborators, HostStore};
use ftp_bringup::{SequenceReport, Sequencer, SequencerConfig};

#[derive(Parser)]
#[command(about = "Bring up the network, clock and storage, then run the file-transfer service")]
struct Cli {
    /// Configuration file (defaults to $FTP_BRINGUP_CONFIG or /etc/ftp-bringup.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding emulated media and the boot report
    #[arg(long, default_value = "/var/lib/ftp-bringup")]
    state_dir: PathBuf,
    /// Exit with status 1 on failure instead of halting
    #[arg(long)]
    no_halt: bool,
}

fn write_report(state_dir: &Path, report: &SequenceReport) -> anyhow::Result<()> {
    let path = state_dir.join("bringup.json");
    let body = serde_json::to_string_pretty(&report.to_json())?;
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(BringupConfig::default_path);
    let cfg = BringupConfig::load(&path).with_context(|| format!("load {}", path.display()))?;
    info!("configuration loaded from {}", path.display());
    fs::create_dir_all(&cli.state_dir)
        .with_context(|| format!("create {}", cli.state_dir.display()))?;

    let report = match init_store(&mut HostStore::new(cli.state_dir.join("nvs"))) {
        Ok(()) => {
            let parts = host_collaborators(&cfg, &cli.state_dir)?;
            Some(Sequencer::new(SequencerConfig::from(&cfg), parts).run())
        }
        Err(e) => {
            error!("key-value store unusable: {e}");
            None
        }
    };

    if let Some(report) = &report {
        if let Err(e) = write_report(&cli.state_dir, report) {
            error!("boot report not written: {e:#}");
        }
        if report.succeeded() {
            info!("bring-up sequence complete");
            return Ok(());
        }
    }

    if cli.no_halt {
        std::process::exit(1);
    }
    halt_forever()
}
