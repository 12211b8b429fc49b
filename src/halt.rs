// CLASSIFICATION: COMMUNITY
// Filename: halt.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Idle halt after an irrecoverable bring-up failure.
//!
//! The device waits for an external reset; nothing here reboots.

use std::thread;
use std::time::Duration;

use log::error;

/// Park the calling thread forever.
pub fn halt_forever() -> ! {
    error!("bring-up halted; waiting for reset");
    loop {
        thread::park_timeout(Duration::from_secs(3600));
    }
}
