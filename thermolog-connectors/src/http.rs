//! Blocking HTTP transport over ureq
//!
//! ## Design decisions
//!
//! We intentionally keep this minimal:
//! - No retries and no backoff. The telemetry loop drops the datum
//!   and polls again a few seconds later; retrying here would just
//!   delay the next reading.
//! - No request timeout. The device firmware this replaces blocked
//!   indefinitely on a hung transport, and that behavior is kept
//!   rather than silently changed. A wedged server wedges the loop.
//! - Plain HTTP is allowed: the write endpoint is on the same LAN
//!   segment as the sensor gateway.
//!
//! `ureq` fits because it is small, blocking, and has no runtime.

use log::debug;

use crate::{PublishRequest, PublishResponse, Transport, TransportError};

/// Connection parameters for an InfluxDB v2 write endpoint.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Organization for the write query string.
    pub org: String,
    /// Bucket for the write query string.
    pub bucket: String,
    /// Pre-provisioned `Authorization` header value, sent verbatim.
    pub token: String,
}

impl InfluxConfig {
    /// Create a configuration for the given endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            org: String::new(),
            bucket: String::new(),
            token: String::new(),
        }
    }

    /// Set the organization.
    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }

    /// Set the bucket.
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Set the authorization token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Write path with query string, seconds precision.
    pub fn write_path(&self) -> String {
        format!(
            "/api/v2/write?org={}&bucket={}&precision=s",
            self.org, self.bucket
        )
    }
}

/// Request executor backed by a blocking [`ureq::Agent`].
pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint.
    pub fn new(config: &InfluxConfig) -> Result<Self, TransportError> {
        if config.host.is_empty() {
            return Err(TransportError::Config("host must not be empty".into()));
        }
        if config.port == 0 {
            return Err(TransportError::Config("port must not be zero".into()));
        }

        // No .timeout() on purpose, see module docs.
        let agent = ureq::AgentBuilder::new()
            .user_agent(&format!("thermolog/{}", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            agent,
            base_url: format!("http://{}:{}", config.host, config.port),
        })
    }
}

impl Transport for HttpTransport {
    fn execute(&mut self, request: &PublishRequest) -> Result<PublishResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut req = self.agent.request(&request.method, &url);
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }

        match req.send_string(&request.body) {
            Ok(resp) => {
                let status = resp.status();
                let body = resp
                    .into_string()
                    .map_err(|e| TransportError::Exchange(e.to_string()))?;
                Ok(PublishResponse { status, body })
            }
            // An error status is still a completed exchange. The
            // loop owns status-code policy, not the transport.
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                debug!("server returned error status {status}");
                Ok(PublishResponse { status, body })
            }
            Err(ureq::Error::Transport(e)) => Err(TransportError::Exchange(e.to_string())),
        }
    }
}
