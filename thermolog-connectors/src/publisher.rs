//! Publisher owning the immutable request template
//!
//! The envelope (method, path, headers) is built exactly once from
//! the InfluxDB configuration. Publishing swaps the body in and
//! executes the exchange; nothing else about the request ever
//! changes after construction.

use log::debug;

use crate::{InfluxConfig, PublishRequest, PublishResponse, Transport, TransportError};

/// Executes publishes against a pre-built request template.
pub struct Publisher<T: Transport> {
    template: PublishRequest,
    transport: T,
}

impl<T: Transport> Publisher<T> {
    /// Build the request template from the endpoint configuration
    /// and take ownership of the transport.
    pub fn new(config: &InfluxConfig, transport: T) -> Self {
        let template = PublishRequest {
            method: "POST".into(),
            path: config.write_path(),
            headers: vec![
                ("Content-Type".into(), "text/plain; charset=utf-8".into()),
                ("Accept".into(), "application/json".into()),
                ("Authorization".into(), config.token.clone()),
            ],
            body: String::new(),
        };
        Self {
            template,
            transport,
        }
    }

    /// Publish one encoded point.
    ///
    /// Returns whatever status the server answered with; fails only
    /// when the exchange itself could not complete.
    pub fn publish(&mut self, body: &str) -> Result<PublishResponse, TransportError> {
        self.template.body.clear();
        self.template.body.push_str(body);
        debug!("request:\n{}", self.template);
        self.transport.execute(&self.template)
    }

    /// The request template, for inspection and logging.
    pub fn template(&self) -> &PublishRequest {
        &self.template
    }
}
