//! thermolog agent binary
//!
//! Loads the configuration, wires probe + link + publisher into the
//! telemetry loop, and runs it forever. The only exits are a
//! configuration problem or a sensor that will not initialize.

use std::env;
use std::path::Path;
use std::process;

use log::{debug, error, info};

mod agent;
mod config;
mod error;
mod link;
mod probe;

use agent::TelemetryLoop;
use config::AgentConfig;
use error::AgentError;
use link::SystemLink;
use probe::SimulatedProbe;

use std::time::Duration;

use thermolog_connectors::{HttpTransport, InfluxConfig, Publisher};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = env::args().nth(1).unwrap_or_else(|| "thermolog.toml".into());
    if let Err(e) = run(Path::new(&config_path)) {
        error!("{e}");
        process::exit(1);
    }
}

fn run(config_path: &Path) -> Result<(), AgentError> {
    let config = AgentConfig::load(config_path)?;
    info!("thermolog {} starting", thermolog_core::VERSION);
    debug!(
        "wifi credentials loaded for SSID {} ({} byte passphrase)",
        config.wifi.ssid,
        config.wifi.password.len()
    );

    let influx = InfluxConfig::new(config.influx.host.clone(), config.influx.port)
        .org(config.influx.org.clone())
        .bucket(config.influx.bucket.clone())
        .token(config.influx.token.clone());
    let transport = HttpTransport::new(&influx)?;
    let publisher = Publisher::new(&influx, transport);

    let mut agent = TelemetryLoop::new(
        SimulatedProbe::new(38.2),
        SystemLink::new(config.wifi.ssid.clone()),
        publisher,
    )
    .measurement(config.point.measurement.clone())
    .poll_interval(Duration::from_secs(config.poll_interval_secs))
    .link_retry(Duration::from_secs(config.link_retry_secs));

    for (key, value) in &config.point.tags {
        agent = agent.tag(key.clone(), value.clone());
    }

    agent.run()
}
