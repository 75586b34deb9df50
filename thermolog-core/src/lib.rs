//! Core data model for thermolog
//!
//! Holds everything with decision logic and no I/O: sensor readings
//! with hardware fault decoding, the reusable line-protocol data
//! point, and the traits the polling loop needs from its
//! collaborators (thermocouple probe, network link).
//!
//! Key constraints:
//! - One reading per poll cycle, nothing persisted
//! - Encoding is a pure function of point state
//! - Blocking, single-threaded callers only
//!
//! ```
//! use thermolog_core::DataPoint;
//!
//! let mut point = DataPoint::new();
//! point.set_measurement("fridge");
//! point.set_tag("room", "kitchen");
//! point.set_field("temp", 38.2);
//! point.set_timestamp(1699999999);
//!
//! assert_eq!(point.encode(), "fridge,room=kitchen temp=38.20 1699999999");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod point;
pub mod reading;
pub mod time;

// Public API
pub use point::DataPoint;
pub use reading::{FaultFlags, FaultKind, Reading, SensorError, SensorReader, Thermocouple};
pub use time::{Connectivity, FixedLink, LinkInfo, Timestamp};

/// Crate version, exposed for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
