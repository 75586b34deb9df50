//! Agent-level error taxonomy.

use thermolog_connectors::TransportError;
use thermolog_core::SensorError;
use thiserror::Error;

/// Fatal errors that stop the agent before or during startup.
///
/// Nothing inside the polling steady state maps here: sensor
/// faults, invalid timestamps, and transport failures are logged
/// and the loop continues.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Configuration file missing, unreadable, or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The thermocouple failed to initialize. There is no recovery
    /// path; the device must be serviced.
    #[error(transparent)]
    SensorInit(#[from] SensorError),

    /// The transport could not be constructed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
