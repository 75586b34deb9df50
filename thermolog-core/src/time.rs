//! Network link and time source abstraction
//!
//! The device gets wall-clock time from its network stack (NTP via
//! the WiFi module), so link status and time live on one trait.
//! Until time sync completes the stack reports 0, which downstream
//! code treats as "do not publish".

use core::fmt;

/// Epoch timestamp in seconds. Zero or negative means "not yet
/// synchronized".
pub type Timestamp = i64;

/// Details of the current network association, for the startup log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkInfo {
    /// Associated network name.
    pub ssid: String,
    /// Assigned address, already rendered.
    pub ip: String,
    /// Received signal strength in dBm.
    pub rssi: i32,
}

impl fmt::Display for LinkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SSID: {}, IP: {}, RSSI: {} dBm",
            self.ssid, self.ip, self.rssi
        )
    }
}

/// Contract for the network connectivity provider.
///
/// Implemented over the vendor WiFi stack on the device and by
/// mocks in tests. All methods are blocking and cheap.
pub trait Connectivity {
    /// Whether the link is currently associated.
    fn is_connected(&mut self) -> bool;

    /// Current wall-clock time in epoch seconds, 0 before time sync.
    fn epoch_seconds(&mut self) -> Timestamp;

    /// Details of the current association.
    fn link_info(&mut self) -> LinkInfo;
}

/// Fixed link for testing: scripted connectivity, settable clock.
#[derive(Debug, Clone, Default)]
pub struct FixedLink {
    connected: bool,
    now: Timestamp,
}

impl FixedLink {
    /// Link that is up with the given clock value.
    pub fn connected_at(now: Timestamp) -> Self {
        Self {
            connected: true,
            now,
        }
    }

    /// Change the link state.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Set the clock.
    pub fn set_time(&mut self, now: Timestamp) {
        self.now = now;
    }

    /// Move the clock forward.
    pub fn advance(&mut self, seconds: i64) {
        self.now += seconds;
    }
}

impl Connectivity for FixedLink {
    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn epoch_seconds(&mut self) -> Timestamp {
        self.now
    }

    fn link_info(&mut self) -> LinkInfo {
        LinkInfo {
            ssid: "fixed".into(),
            ip: "0.0.0.0".into(),
            rssi: 0,
        }
    }
}
