// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Network bring-up: station association and name advertisement.

pub mod mdns;
pub mod station;
pub mod wifi;

pub use mdns::{advertise, NameAdvertiser};
pub use station::{bring_up_network, AssociationStep, AssociationTracker, ConnectivityHandle};
pub use wifi::{IpInfo, StaticIpConfig, WifiCredentials, WifiDriver, WifiEvent, DEFAULT_DNS};
