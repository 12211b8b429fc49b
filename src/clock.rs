// CLASSIFICATION: COMMUNITY
// Filename: clock.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Wall-clock synchronisation over a network time source.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use log::{info, warn};

use crate::error::{BringupError, DriverError};
use crate::outcome::BringupOutcome;
use crate::retry::RetryBudget;

/// Polls allowed before giving up on the time source.
pub const DEFAULT_SYNC_POLLS: u32 = 10;
/// Interval between status polls on hardware.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Synchronisation state reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Clock never set.
    Reset,
    /// Smooth adjustment under way; time is already usable.
    InProgress,
    Completed,
}

/// Background time client running in continuous polling mode.
pub trait TimeSyncClient: Send {
    /// Start polling `server`. Returns immediately.
    fn start(&mut self, server: &str) -> Result<(), DriverError>;

    fn sync_status(&self) -> SyncStatus;

    /// Current wall-clock time in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Result of a successful synchronisation.
#[derive(Debug, Clone, Copy)]
pub struct ClockSynced {
    pub utc: DateTime<Utc>,
    /// Status observations taken, including the one that saw the clock set.
    pub polls: u32,
}

/// Start the time client and wait for the clock to leave the unset state.
///
/// Every observation of [`SyncStatus::Reset`] spends one unit of `budget`;
/// the stage fails on the observation that exhausts it.
pub fn sync_clock(
    client: &mut dyn TimeSyncClient,
    server: &str,
    mut budget: RetryBudget,
    poll_interval: Duration,
) -> BringupOutcome<ClockSynced> {
    info!("Initializing SNTP, server {server}");
    if let Err(e) = client.start(server) {
        return BringupOutcome::Failed(e.into());
    }
    budget.reset();
    loop {
        if client.sync_status() != SyncStatus::Reset {
            let utc = client.now();
            info!("Notification of a time synchronization event");
            return BringupOutcome::Ready(ClockSynced {
                utc,
                polls: budget.attempts_made() + 1,
            });
        }
        budget.try_consume();
        if budget.is_exhausted() {
            warn!("system time still unset after {} polls", budget.attempts_made());
            return BringupOutcome::Failed(BringupError::ClockSyncTimeout {
                attempts: budget.attempts_made(),
            });
        }
        info!(
            "Waiting for system time to be set... ({}/{})",
            budget.attempts_made(),
            budget.max_attempts()
        );
        thread::sleep(poll_interval);
    }
}

/// Render `utc` shifted by a whole-hour offset, for log output only.
///
/// Persisted file timestamps stay in UTC.
pub fn local_time_string(utc: DateTime<Utc>, offset_hours: i32) -> String {
    let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap_or_else(|| Utc.fix());
    utc.with_timezone(&offset).format("%c").to_string()
}
