//! Thermocouple probe stand-in for host builds
//!
//! The device build plugs the MAX31855 SPI driver in behind the
//! [`Thermocouple`] trait. A host build has no SPI bus, so this
//! module provides a deterministic simulated probe for bring-up
//! and soak testing of the publish path.

use thermolog_core::{SensorError, Thermocouple};

/// Simulated probe: a base temperature with a small repeating
/// wobble, so consecutive points are distinguishable downstream.
pub struct SimulatedProbe {
    base: f64,
    cycle: u32,
}

impl SimulatedProbe {
    /// Probe reporting around `base` degrees.
    pub fn new(base: f64) -> Self {
        Self { base, cycle: 0 }
    }
}

impl Thermocouple for SimulatedProbe {
    fn begin(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read_unit(&mut self) -> f64 {
        self.cycle = self.cycle.wrapping_add(1);
        // +/- 0.5 degrees over an 8-cycle period.
        let wobble = f64::from(self.cycle % 8) / 8.0 - 0.5;
        self.base + wobble
    }

    fn fault_bits(&mut self) -> u8 {
        0
    }

    fn internal(&mut self) -> f64 {
        72.0
    }
}
