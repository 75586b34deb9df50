//! Sensor readings and hardware fault decoding
//!
//! The thermocouple interface reports a temperature and, separately,
//! a fault status register where each bit independently signals a
//! distinct wiring fault. A reading is only trusted when the value
//! is numeric; a NaN value means the probe is faulted and the status
//! register says how.
//!
//! ## Decode policy
//!
//! - Numeric value: the reading is valid and any stale fault bits
//!   are ignored.
//! - NaN value: every set fault bit is reported, not just the first
//!   (open circuit and a short can co-occur).
//! - NaN value with a clean status register: reported as
//!   [`FaultKind::Unknown`] so an invalid reading never looks
//!   fault-free.
//!
//! The reader never retries. A transient fault self-heals only
//! because the loop polls again on the next cycle.

use core::fmt;

use thiserror::Error;

/// Fault status register bit: thermocouple input is open.
const FAULT_OPEN: u8 = 0x01;
/// Fault status register bit: thermocouple shorted to ground.
const FAULT_SHORT_GND: u8 = 0x02;
/// Fault status register bit: thermocouple shorted to supply.
const FAULT_SHORT_VCC: u8 = 0x04;

/// Errors from the probe's digital interface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// The probe did not respond during initialization. Fatal for
    /// the whole agent: a device that cannot read its only sensor
    /// is useless.
    #[error("sensor initialization failed: {0}")]
    InitFailed(&'static str),
}

/// A single wiring fault reported by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Thermocouple input is open (broken or disconnected wire).
    OpenCircuit,
    /// Thermocouple shorted to ground.
    ShortToGround,
    /// Thermocouple shorted to the supply rail.
    ShortToSupply,
    /// Value was NaN but the status register reported no fault.
    Unknown,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Diagnostic strings match the device firmware so existing
        // log scrapers keep working.
        let msg = match self {
            FaultKind::OpenCircuit => "Thermocouple is open - no connections.",
            FaultKind::ShortToGround => "Thermocouple is short-circuited to GND.",
            FaultKind::ShortToSupply => "Thermocouple is short-circuited to VCC.",
            FaultKind::Unknown => "Thermocouple fault of unknown kind.",
        };
        f.write_str(msg)
    }
}

/// Set of active wiring faults, decoded from the status register.
///
/// Bits are independent; iteration yields every active fault in
/// register bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultFlags {
    open_circuit: bool,
    short_to_ground: bool,
    short_to_supply: bool,
    unknown: bool,
}

impl FaultFlags {
    /// Empty set: no active faults.
    pub const NONE: FaultFlags = FaultFlags {
        open_circuit: false,
        short_to_ground: false,
        short_to_supply: false,
        unknown: false,
    };

    /// Decode a raw fault status register.
    ///
    /// A zero register decodes to [`FaultKind::Unknown`]: this is
    /// only called when the value was NaN, and "invalid but no
    /// fault" is not a state the caller should ever see.
    pub fn from_bits(bits: u8) -> Self {
        if bits == 0 {
            return FaultFlags {
                unknown: true,
                ..FaultFlags::NONE
            };
        }
        FaultFlags {
            open_circuit: bits & FAULT_OPEN != 0,
            short_to_ground: bits & FAULT_SHORT_GND != 0,
            short_to_supply: bits & FAULT_SHORT_VCC != 0,
            unknown: false,
        }
    }

    /// True when no fault is active.
    pub fn is_empty(&self) -> bool {
        *self == FaultFlags::NONE
    }

    /// Iterate over every active fault.
    pub fn iter(&self) -> impl Iterator<Item = FaultKind> {
        let flags = *self;
        [
            (flags.open_circuit, FaultKind::OpenCircuit),
            (flags.short_to_ground, FaultKind::ShortToGround),
            (flags.short_to_supply, FaultKind::ShortToSupply),
            (flags.unknown, FaultKind::Unknown),
        ]
        .into_iter()
        .filter_map(|(set, kind)| set.then_some(kind))
    }
}

/// One temperature reading, produced per poll cycle.
///
/// Lifetime is a single loop iteration; readings are never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Temperature in the configured unit. NaN when the probe is
    /// faulted; the raw value is kept either way.
    pub value: f64,
    /// Whether `value` is numeric and usable.
    pub valid: bool,
    /// Active faults; empty for a valid reading.
    pub faults: FaultFlags,
}

/// Contract for the thermocouple's digital interface.
///
/// Implemented over the vendor driver on the device and by mocks in
/// tests. All methods are blocking.
pub trait Thermocouple {
    /// Initialize the probe. Called once before the first read.
    fn begin(&mut self) -> Result<(), SensorError>;

    /// Read the probe temperature in the configured unit
    /// (Fahrenheit in this deployment). NaN signals a fault.
    fn read_unit(&mut self) -> f64;

    /// Read the raw fault status register.
    fn fault_bits(&mut self) -> u8;

    /// Cold-junction reference temperature, for diagnostics only.
    fn internal(&mut self) -> f64;
}

/// Adapter from the raw probe interface to [`Reading`]s.
pub struct SensorReader<T: Thermocouple> {
    probe: T,
}

impl<T: Thermocouple> SensorReader<T> {
    /// Wrap a probe. Does not touch the hardware; call
    /// [`SensorReader::begin`] before the first read.
    pub fn new(probe: T) -> Self {
        Self { probe }
    }

    /// Initialize the underlying probe.
    pub fn begin(&mut self) -> Result<(), SensorError> {
        self.probe.begin()
    }

    /// Take one reading, applying the NaN/bitmask decode policy.
    pub fn read(&mut self) -> Reading {
        let value = self.probe.read_unit();
        if value.is_nan() {
            Reading {
                value,
                valid: false,
                faults: FaultFlags::from_bits(self.probe.fault_bits()),
            }
        } else {
            // A numeric value is trusted over stale fault bits.
            Reading {
                value,
                valid: true,
                faults: FaultFlags::NONE,
            }
        }
    }

    /// Cold-junction reference temperature, passed through for
    /// debug logging.
    pub fn internal(&mut self) -> f64 {
        self.probe.internal()
    }
}
