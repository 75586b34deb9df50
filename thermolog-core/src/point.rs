//! Reusable line-protocol data point
//!
//! A [`DataPoint`] is built once at startup and mutated in place
//! every poll cycle (field value, timestamp) rather than
//! reconstructed, so the steady state allocates nothing new.
//!
//! ## Wire format
//!
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp
//! ```
//!
//! Tags and fields keep insertion order; the timestamp is appended
//! only when positive. Field values are rendered with exactly two
//! decimal places, which is deterministic and more resolution than
//! a class-2 thermocouple can deliver.
//!
//! ## Known limitation
//!
//! Keys and values are not escaped or validated. Commas, spaces or
//! `=` in a tag value will corrupt the record. The upstream
//! firmware had the same behavior and every key/value here is a
//! compile-time or config constant, so this is documented rather
//! than fixed.

use crate::time::Timestamp;

/// A measurement with tags, fields, and an optional timestamp.
///
/// Encoding is a pure function of the point's state: encoding the
/// same state twice yields byte-identical output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPoint {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, f64)>,
    timestamp: Timestamp,
}

impl DataPoint {
    /// Empty point. Set a measurement before encoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the measurement name.
    pub fn set_measurement(&mut self, name: impl Into<String>) {
        self.measurement = name.into();
    }

    /// Set a tag. Replaces the value in place if the key exists, so
    /// repeated updates keep the original insertion order.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.tags.push((key, value)),
        }
    }

    /// Set a numeric field. Same replace-in-place semantics as
    /// [`DataPoint::set_tag`].
    pub fn set_field(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Set the epoch-seconds timestamp. Zero or negative marks the
    /// point as not publishable.
    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Current timestamp.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Whether the timestamp gates publication open (`> 0`).
    pub fn has_valid_timestamp(&self) -> bool {
        self.timestamp > 0
    }

    /// Serialize to line protocol.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(64);
        out.push_str(&self.measurement);

        for (key, value) in &self.tags {
            out.push(',');
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }

        out.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(&format!("{value:.2}"));
        }

        if self.timestamp > 0 {
            out.push(' ');
            out.push_str(&self.timestamp.to_string());
        }

        out
    }
}
