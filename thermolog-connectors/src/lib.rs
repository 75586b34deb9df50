//! Outbound transport for thermolog
//!
//! ## Overview
//!
//! One protocol, one direction: line-protocol text POSTed to an
//! InfluxDB v2 write endpoint. The [`Publisher`] owns a request
//! template built once at startup; each publish substitutes the
//! body and hands the request to a [`Transport`] for the actual
//! exchange.
//!
//! ## Status codes are not errors
//!
//! A transport only fails when the exchange itself cannot complete
//! (no route, connection refused, broken socket). An HTTP 4xx or
//! 5xx is a *successful* exchange with an unfavorable result; it is
//! returned as a [`PublishResponse`] and interpreting it is the
//! caller's business. The telemetry loop's policy today is to log
//! the code and move on.
//!
//! ## Example
//!
//! ```no_run
//! use thermolog_connectors::{HttpTransport, InfluxConfig, Publisher};
//!
//! let config = InfluxConfig::new("influx.local", 8086)
//!     .org("home")
//!     .bucket("sensors")
//!     .token("Token abc123");
//!
//! let transport = HttpTransport::new(&config)?;
//! let mut publisher = Publisher::new(&config, transport);
//!
//! let response = publisher.publish("fridge,room=kitchen temp=38.20 1699999999")?;
//! println!("write returned {}", response.status);
//! # Ok::<(), thermolog_connectors::TransportError>(())
//! ```

#![deny(unsafe_code)]

pub mod http;
pub mod publisher;

// Re-export common types
pub use http::{HttpTransport, InfluxConfig};
pub use publisher::Publisher;

use core::fmt;

use thiserror::Error;

/// Transport-level failures: the exchange could not complete.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Link is down or the peer is unreachable.
    #[error("not connected")]
    NotConnected,

    /// The exchange started but did not complete.
    #[error("exchange failed: {0}")]
    Exchange(String),

    /// The transport was configured with unusable parameters.
    #[error("configuration error: {0}")]
    Config(String),
}

/// An HTTP request with a pre-built envelope and a swappable body.
///
/// Method, path, and headers are fixed at construction; only `body`
/// changes between publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// HTTP method, e.g. `POST`.
    pub method: String,
    /// Request path including the query string.
    pub path: String,
    /// Header name/value pairs, sent in order.
    pub headers: Vec<(String, String)>,
    /// Line-protocol payload for this publish.
    pub body: String,
}

impl fmt::Display for PublishRequest {
    /// Renders the full request text, used for debug logging before
    /// each exchange.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} HTTP/1.1", self.method, self.path)?;
        for (name, value) in &self.headers {
            writeln!(f, "{name}: {value}")?;
        }
        writeln!(f)?;
        f.write_str(&self.body)
    }
}

/// Result of a completed exchange. Consumed immediately; never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResponse {
    /// HTTP status code, whatever the server said.
    pub status: u16,
    /// Response body, if any.
    pub body: String,
}

/// Contract for the request/response executor.
///
/// Blocking and synchronous: the caller is a single-threaded
/// polling loop with nothing better to do.
pub trait Transport {
    /// Execute one exchange.
    fn execute(&mut self, request: &PublishRequest) -> Result<PublishResponse, TransportError>;
}
