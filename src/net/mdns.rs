// CLASSIFICATION: COMMUNITY
// Filename: mdns.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Hostname advertisement on the local link.

use log::{error, info};

use crate::error::{BringupError, DriverError};
use crate::net::station::ConnectivityHandle;
use crate::outcome::BringupOutcome;

/// Multicast name responder.
pub trait NameAdvertiser: Send {
    /// Start the responder. Calling it again on a running responder is a no-op.
    fn init(&mut self) -> Result<(), DriverError>;

    /// Publish `hostname`. Re-publishing the same name must succeed.
    fn set_hostname(&mut self, hostname: &str) -> Result<(), DriverError>;
}

/// Check `hostname` is a single DNS label (RFC 1123).
pub fn validate_hostname(hostname: &str) -> Result<(), String> {
    if hostname.is_empty() || hostname.len() > 63 {
        return Err(format!("hostname length {} outside 1..=63", hostname.len()));
    }
    if hostname.starts_with('-') || hostname.ends_with('-') {
        return Err(format!("hostname {hostname:?} starts or ends with '-'"));
    }
    if let Some(c) = hostname
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(format!("hostname {hostname:?} contains {c:?}"));
    }
    Ok(())
}

/// Register `hostname` once the link is up.
///
/// Any failure is a configuration problem, so there is no retry.
pub fn advertise(
    advertiser: &mut dyn NameAdvertiser,
    hostname: &str,
    _link: &ConnectivityHandle,
) -> BringupOutcome<()> {
    let res = validate_hostname(hostname)
        .and_then(|_| advertiser.init().map_err(|e| e.to_string()))
        .and_then(|_| advertiser.set_hostname(hostname).map_err(|e| e.to_string()));
    match res {
        Ok(()) => {
            info!("mdns hostname set to: [{hostname}]");
            BringupOutcome::Ready(())
        }
        Err(e) => {
            error!("mdns registration failed: {e}");
            BringupOutcome::Failed(BringupError::AdvertisementError(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validate_hostname;

    #[test]
    fn hostname_rules() {
        assert!(validate_hostname("ftp-server").is_ok());
        assert!(validate_hostname("esp32").is_ok());
        assert!(validate_hostname("").is_err());
        assert!(validate_hostname("-lead").is_err());
        assert!(validate_hostname("has.dot").is_err());
        assert!(validate_hostname(&"a".repeat(64)).is_err());
    }
}
