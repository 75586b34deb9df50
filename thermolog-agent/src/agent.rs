//! The telemetry loop
//!
//! Two states, in order: `Connecting` (block until the link is up,
//! retrying forever) and `Polling` (read, encode, publish, sleep,
//! repeat). Sensor initialization sits between them and is the only
//! fatal step: a device that cannot read its sensor is useless, so
//! it stops rather than limps.
//!
//! Per-cycle policy, in order:
//! 1. Read the probe. An invalid reading logs every active fault
//!    and carries on; faults are never fatal.
//! 2. Update the reused point's field and timestamp.
//! 3. Timestamp gate: a non-positive timestamp (time not yet
//!    synced) skips the publish entirely. The datum is dropped, not
//!    queued; the next cycle simply tries again.
//! 4. Publish and log the status code. A transport failure is
//!    logged and the loop continues - no backoff, no reconnect.
//!    That matches the firmware this replaces; see DESIGN.md.
//!
//! The loop exclusively owns the reused [`DataPoint`] and the
//! publisher's request template. Everything is blocking and
//! single-threaded; the only suspension point is the fixed sleep
//! between cycles.

use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use thermolog_connectors::{Publisher, Transport};
use thermolog_core::{Connectivity, DataPoint, SensorReader, Thermocouple};

use crate::error::AgentError;

/// Name of the single published field.
const TEMP_FIELD: &str = "temp";

/// Orchestrator tying probe, link, and publisher together on a
/// fixed polling cadence.
pub struct TelemetryLoop<S: Thermocouple, C: Connectivity, T: Transport> {
    reader: SensorReader<S>,
    link: C,
    publisher: Publisher<T>,
    point: DataPoint,
    poll_interval: Duration,
    link_retry: Duration,
}

impl<S: Thermocouple, C: Connectivity, T: Transport> TelemetryLoop<S, C, T> {
    /// Wire up the loop. Point shape and intervals are set with the
    /// builder methods before calling [`TelemetryLoop::run`].
    pub fn new(probe: S, link: C, publisher: Publisher<T>) -> Self {
        Self {
            reader: SensorReader::new(probe),
            link,
            publisher,
            point: DataPoint::new(),
            poll_interval: Duration::from_secs(5),
            link_retry: Duration::from_secs(5),
        }
    }

    /// Set the measurement name of the published point.
    pub fn measurement(mut self, name: impl Into<String>) -> Self {
        self.point.set_measurement(name);
        self
    }

    /// Add a tag to the published point.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.point.set_tag(key, value);
        self
    }

    /// Set the sleep between poll cycles.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the delay between link checks while connecting.
    pub fn link_retry(mut self, delay: Duration) -> Self {
        self.link_retry = delay;
        self
    }

    /// Block until the connectivity provider reports an established
    /// link. Retries forever; there is no operator to page.
    pub fn wait_for_link(&mut self) {
        while !self.link.is_connected() {
            info!("waiting for network link, retrying in {:?}", self.link_retry);
            thread::sleep(self.link_retry);
        }
        info!("link up: {}", self.link.link_info());
    }

    /// Initialize the probe hardware. Failure is fatal.
    pub fn init_sensor(&mut self) -> Result<(), AgentError> {
        info!("initializing thermocouple...");
        self.reader.begin()?;
        info!("ready");
        Ok(())
    }

    /// One poll cycle: read, update the point, gate on timestamp,
    /// publish, log the outcome.
    pub fn run_cycle(&mut self) {
        debug!("internal={:.2}", self.reader.internal());

        let reading = self.reader.read();
        if reading.valid {
            info!("probe={:.2}", reading.value);
        } else {
            warn!("probe fault detected");
            for fault in reading.faults.iter() {
                warn!("FAULT: {fault}");
            }
        }

        // The raw value goes in either way; the timestamp gate below
        // decides whether anything ships this cycle.
        self.point.set_field(TEMP_FIELD, reading.value);
        self.point.set_timestamp(self.link.epoch_seconds());

        if !self.point.has_valid_timestamp() {
            warn!("invalid timestamp, skipping publish");
            return;
        }

        match self.publisher.publish(&self.point.encode()) {
            Ok(response) => info!("influx resp: {}", response.status),
            Err(e) => error!("publish failed: {e}"),
        }
    }

    /// Connect, initialize, then poll forever.
    pub fn run(&mut self) -> Result<(), AgentError> {
        self.wait_for_link();
        self.init_sensor()?;
        loop {
            self.run_cycle();
            thread::sleep(self.poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use thermolog_connectors::{
        InfluxConfig, PublishRequest, PublishResponse, TransportError,
    };
    use thermolog_core::{FixedLink, LinkInfo, SensorError, Timestamp};

    /// Scripted probe: begin result plus a fixed value/bitmask.
    struct MockProbe {
        begin_ok: bool,
        value: f64,
        bits: u8,
        reads: Arc<Mutex<usize>>,
    }

    impl MockProbe {
        fn reading(value: f64) -> Self {
            Self {
                begin_ok: true,
                value,
                bits: 0,
                reads: Arc::new(Mutex::new(0)),
            }
        }

        fn faulted(bits: u8) -> Self {
            Self {
                begin_ok: true,
                value: f64::NAN,
                bits,
                reads: Arc::new(Mutex::new(0)),
            }
        }

        fn broken() -> Self {
            Self {
                begin_ok: false,
                value: 0.0,
                bits: 0,
                reads: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl Thermocouple for MockProbe {
        fn begin(&mut self) -> Result<(), SensorError> {
            if self.begin_ok {
                Ok(())
            } else {
                Err(SensorError::InitFailed("no response on SPI"))
            }
        }

        fn read_unit(&mut self) -> f64 {
            *self.reads.lock().unwrap() += 1;
            self.value
        }

        fn fault_bits(&mut self) -> u8 {
            self.bits
        }

        fn internal(&mut self) -> f64 {
            72.0
        }
    }

    /// Link that comes up after a scripted number of checks.
    struct FlakyLink {
        checks_until_up: usize,
        now: Timestamp,
    }

    impl Connectivity for FlakyLink {
        fn is_connected(&mut self) -> bool {
            if self.checks_until_up == 0 {
                true
            } else {
                self.checks_until_up -= 1;
                false
            }
        }

        fn epoch_seconds(&mut self) -> Timestamp {
            self.now
        }

        fn link_info(&mut self) -> LinkInfo {
            LinkInfo::default()
        }
    }

    /// Transport recording every request; fails while `failures`
    /// is positive, then answers 204.
    struct RecordingTransport {
        requests: Arc<Mutex<Vec<PublishRequest>>>,
        failures: usize,
    }

    impl RecordingTransport {
        fn new() -> (Self, Arc<Mutex<Vec<PublishRequest>>>) {
            let requests = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    requests: requests.clone(),
                    failures: 0,
                },
                requests,
            )
        }

        fn failing_first(n: usize) -> (Self, Arc<Mutex<Vec<PublishRequest>>>) {
            let (mut transport, requests) = Self::new();
            transport.failures = n;
            (transport, requests)
        }
    }

    impl Transport for RecordingTransport {
        fn execute(
            &mut self,
            request: &PublishRequest,
        ) -> Result<PublishResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.failures > 0 {
                self.failures -= 1;
                return Err(TransportError::Exchange("connection refused".into()));
            }
            Ok(PublishResponse {
                status: 204,
                body: String::new(),
            })
        }
    }

    fn publisher(transport: RecordingTransport) -> Publisher<RecordingTransport> {
        let config = InfluxConfig::new("influx.local", 8086)
            .org("home")
            .bucket("sensors")
            .token("Token abc123");
        Publisher::new(&config, transport)
    }

    fn fridge_loop(
        probe: MockProbe,
        link: FixedLink,
        transport: RecordingTransport,
    ) -> TelemetryLoop<MockProbe, FixedLink, RecordingTransport> {
        TelemetryLoop::new(probe, link, publisher(transport))
            .measurement("fridge")
            .tag("room", "kitchen")
            .poll_interval(Duration::ZERO)
            .link_retry(Duration::ZERO)
    }

    #[test]
    fn end_to_end_publishes_worked_example() {
        let (transport, requests) = RecordingTransport::new();
        let mut agent = fridge_loop(
            MockProbe::reading(38.2),
            FixedLink::connected_at(1699999999),
            transport,
        );
        agent.init_sensor().unwrap();
        agent.run_cycle();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body, "fridge,room=kitchen temp=38.20 1699999999");
        assert_eq!(requests[0].method, "POST");
        assert_eq!(
            requests[0].path,
            "/api/v2/write?org=home&bucket=sensors&precision=s"
        );
    }

    #[test]
    fn unsynced_clock_skips_publish() {
        let (transport, requests) = RecordingTransport::new();
        let mut agent = fridge_loop(
            MockProbe::reading(38.2),
            FixedLink::connected_at(0),
            transport,
        );
        agent.init_sensor().unwrap();
        agent.run_cycle();

        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn clock_sync_mid_run_resumes_publishing() {
        let (transport, requests) = RecordingTransport::new();
        let mut agent = fridge_loop(
            MockProbe::reading(38.2),
            FixedLink::connected_at(0),
            transport,
        );
        agent.init_sensor().unwrap();

        agent.run_cycle();
        assert!(requests.lock().unwrap().is_empty());

        agent.link.set_time(1700000123);
        agent.run_cycle();
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].body.ends_with(" 1700000123"));
    }

    #[test]
    fn transport_failures_do_not_lock_out_later_cycles() {
        let (transport, requests) = RecordingTransport::failing_first(3);
        let mut agent = fridge_loop(
            MockProbe::reading(38.2),
            FixedLink::connected_at(1700000000),
            transport,
        );
        agent.init_sensor().unwrap();

        for _ in 0..4 {
            agent.run_cycle();
            agent.link.advance(5);
        }

        // Three failed exchanges and one successful one, all
        // attempted: no backoff ever kicks in.
        assert_eq!(requests.lock().unwrap().len(), 4);
    }

    #[test]
    fn faulted_probe_still_reaches_the_timestamp_gate() {
        let (transport, requests) = RecordingTransport::new();
        let mut agent = fridge_loop(
            MockProbe::faulted(0x01),
            FixedLink::connected_at(1700000000),
            transport,
        );
        agent.init_sensor().unwrap();
        agent.run_cycle();

        // The NaN-bearing field is published; timestamp gating is
        // independent of reading validity.
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body, "fridge,room=kitchen temp=NaN 1700000000");
    }

    #[test]
    fn faulted_probe_with_unsynced_clock_publishes_nothing() {
        let (transport, requests) = RecordingTransport::new();
        let mut agent = fridge_loop(
            MockProbe::faulted(0x07),
            FixedLink::connected_at(0),
            transport,
        );
        agent.init_sensor().unwrap();
        agent.run_cycle();

        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn init_failure_halts_before_any_cycle() {
        let (transport, requests) = RecordingTransport::new();
        let probe = MockProbe::broken();
        let reads = probe.reads.clone();
        let mut agent = fridge_loop(probe, FixedLink::connected_at(1700000000), transport);

        let result = agent.run();
        assert!(matches!(result, Err(AgentError::SensorInit(_))));
        assert_eq!(*reads.lock().unwrap(), 0);
        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn waits_until_link_reports_connected() {
        let (transport, _requests) = RecordingTransport::new();
        let link = FlakyLink {
            checks_until_up: 3,
            now: 1700000000,
        };
        let mut agent = TelemetryLoop::new(MockProbe::reading(38.2), link, publisher(transport))
            .measurement("fridge")
            .link_retry(Duration::ZERO);

        agent.wait_for_link();
        // Returned, so the link came up after the scripted checks.
        assert!(agent.link.is_connected());
    }

    #[test]
    fn reused_point_keeps_tag_order_across_cycles() {
        let (transport, requests) = RecordingTransport::new();
        let mut agent = fridge_loop(
            MockProbe::reading(38.2),
            FixedLink::connected_at(1700000000),
            transport,
        );
        agent.init_sensor().unwrap();

        for _ in 0..3 {
            agent.run_cycle();
            agent.link.advance(5);
        }

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        for request in requests.iter() {
            assert!(request.body.starts_with("fridge,room=kitchen temp="));
        }
    }
}
