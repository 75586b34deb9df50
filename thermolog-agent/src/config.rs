//! Agent configuration
//!
//! One TOML file, read once at startup, never reloaded. Credentials
//! are pre-provisioned; there is no negotiation or refresh.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::AgentError;

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_link_retry_secs() -> u64 {
    5
}

/// Top-level agent configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Network credentials for the connectivity provider.
    pub wifi: WifiConfig,
    /// InfluxDB write endpoint.
    pub influx: InfluxSection,
    /// Shape of the published point.
    pub point: PointConfig,
    /// Seconds to sleep between poll cycles.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Seconds between link association attempts at startup.
    #[serde(default = "default_link_retry_secs")]
    pub link_retry_secs: u64,
}

/// WiFi association credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct WifiConfig {
    /// Network name.
    pub ssid: String,
    /// WPA passphrase.
    pub password: String,
}

/// InfluxDB v2 endpoint parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxSection {
    /// Host name or address.
    pub host: String,
    /// Port, typically 8086.
    pub port: u16,
    /// Organization.
    pub org: String,
    /// Bucket.
    pub bucket: String,
    /// Full `Authorization` header value, e.g. `Token <secret>`.
    pub token: String,
}

/// Measurement and tag set for the single published point.
#[derive(Debug, Clone, Deserialize)]
pub struct PointConfig {
    /// Measurement name, e.g. `fridge`.
    pub measurement: String,
    /// Tag pairs in publish order, e.g. `[["room", "kitchen"]]`.
    #[serde(default)]
    pub tags: Vec<(String, String)>,
}

impl AgentConfig {
    /// Read and parse the configuration file.
    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let text = fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("read {}: {e}", path.display())))?;
        let config: AgentConfig = toml::from_str(&text)
            .map_err(|e| AgentError::Config(format!("parse {}: {e}", path.display())))?;
        if config.point.measurement.is_empty() {
            return Err(AgentError::Config("point.measurement must not be empty".into()));
        }
        Ok(config)
    }
}
