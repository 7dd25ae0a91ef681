//! Tick-driven simulation of one Master and one Node.
//!
//! Each tick runs the Master's control loop, lets the radio carry bytes in
//! both directions and then runs the Node's control loop. The Master's clock
//! advances by `tick_ms` per tick, so the time it reports to the Node moves
//! with simulated time rather than wall time.

use chrono::TimeDelta;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use soilnet_link::ChannelSerial;
use soilnet_metrics::metric_defs;
use soilnet_station::{
    FixedClock, MasterStation, NodeStation, NodeTelemetry, RemoteConfig, SensorReadings,
    SensorSuite, SoilSensor,
};
use tracing::{debug, info};

use crate::config::{NodeSection, SimulationConfig};
use crate::error::RunnerResult;
use crate::radio::{RadioLink, RadioStats};

/// Maximum deviation of the simulated probe from its configured raw value.
const PROBE_NOISE: i16 = 3;

// ============================================================================
// Node Sensors
// ============================================================================

type Probe = SoilSensor<Box<dyn FnMut() -> u16 + Send>>;

/// Sensors of the simulated field unit.
///
/// Readings are fixed, except moisture when a soil probe is configured: the
/// probe returns its raw value with a little seeded noise and moisture is
/// converted from it on every sample.
pub struct SimSensors {
    readings: SensorReadings,
    probe: Option<Probe>,
}

impl SimSensors {
    /// Build the sensors described by a node section.
    pub fn from_config(node: &NodeSection, seed: u64) -> RunnerResult<Self> {
        let probe = match node.probe_raw {
            Some(raw) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let input: Box<dyn FnMut() -> u16 + Send> = Box::new(move || {
                    raw.saturating_add_signed(rng.gen_range(-PROBE_NOISE..=PROBE_NOISE))
                });
                Some(SoilSensor::new(input, node.probe_samples)?)
            }
            None => None,
        };
        Ok(SimSensors {
            readings: node.readings,
            probe,
        })
    }
}

impl SensorSuite for SimSensors {
    fn sample(&mut self) -> SensorReadings {
        let mut readings = self.readings;
        if let Some(probe) = self.probe.as_mut() {
            readings.moisture = probe.moisture();
        }
        readings
    }
}

// ============================================================================
// Results
// ============================================================================

/// Round-trip latency between a query and the telemetry that answers it.
///
/// Latency is measured from the most recent query. Only aligned telemetry is
/// counted, since a misaligned frame may carry bytes of an older reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoundTripStats {
    /// Round trips recorded.
    pub count: u64,
    /// Shortest round trip, in ticks.
    pub min_ticks: u64,
    /// Longest round trip, in ticks.
    pub max_ticks: u64,
    /// Sum of all round trips, in ticks.
    pub total_ticks: u64,
}

impl RoundTripStats {
    /// Add one round trip.
    pub fn record(&mut self, ticks: u64) {
        if self.count == 0 {
            self.min_ticks = ticks;
            self.max_ticks = ticks;
        } else {
            self.min_ticks = self.min_ticks.min(ticks);
            self.max_ticks = self.max_ticks.max(ticks);
        }
        self.count += 1;
        self.total_ticks = self.total_ticks.saturating_add(ticks);
    }

    /// Mean round trip in ticks, or `0.0` before any was recorded.
    pub fn mean_ticks(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ticks as f64 / self.count as f64
        }
    }
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    /// Ticks run.
    pub ticks: u64,
    /// Radio loss seed.
    pub seed: u64,
    /// Queries the Master handed to its port.
    pub queries_sent: u64,
    /// Query frames the Node completed, aligned or not.
    pub queries_received: u64,
    /// Replies the Node handed to its port.
    pub replies_sent: u64,
    /// Ack frames the Master completed, aligned or not.
    pub telemetry_received: u64,
    /// Queries that did not start with the query sentinel.
    pub misaligned_queries: u64,
    /// Acknowledgments that did not start with the ack sentinel.
    pub misaligned_acks: u64,
    /// Bytes carried and lost by the radio.
    pub radio: RadioStats,
    /// Query to telemetry latency.
    pub round_trip: RoundTripStats,
    /// Configuration the Node last received.
    pub node_config: Option<RemoteConfig>,
    /// Telemetry the Master last received.
    pub last_telemetry: Option<NodeTelemetry>,
}

/// What happened during one [`Simulation::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEvents {
    /// The Master sent a query.
    pub query_sent: bool,
    /// The Node completed a query and replied.
    pub query_answered: bool,
    /// Telemetry the Master completed, if any.
    pub telemetry: Option<NodeTelemetry>,
}

// ============================================================================
// Simulation
// ============================================================================

/// One Master and one Node joined by a simulated radio.
pub struct Simulation {
    config: SimulationConfig,
    tick_duration: TimeDelta,
    radio: RadioLink,
    master: MasterStation<ChannelSerial, FixedClock>,
    node: NodeStation<ChannelSerial, SimSensors>,
    tick: u64,
    pending_query_tick: Option<u64>,
    round_trip: RoundTripStats,
    telemetry_received: u64,
}

impl Simulation {
    /// Build a simulation from a validated configuration.
    ///
    /// The Master starts with a save request pending, so the first query
    /// goes out on the first tick.
    pub fn new(config: SimulationConfig) -> RunnerResult<Self> {
        config.validate()?;
        let tick_duration = config.tick_duration()?;

        let (radio, master_port, node_port) = RadioLink::new(
            config.link.byte_loss_probability,
            config.bytes_per_tick(),
            config.seed,
        );

        let mut clock = FixedClock::default();
        clock.set(config.master.start_time);
        let mut master = MasterStation::new(config.master.station_config(), master_port, clock);
        master.set_settings(config.master.settings);
        master.register_pop(config.master.probability_of_precipitation);
        master.set_irrigation_command(config.master.irrigation_command);
        master.request_save();

        let sensors = SimSensors::from_config(&config.node, config.seed.wrapping_add(1))?;
        let node = NodeStation::new(config.node.station_config(), node_port, sensors);

        Ok(Simulation {
            config,
            tick_duration,
            radio,
            master,
            node,
            tick: 0,
            pending_query_tick: None,
            round_trip: RoundTripStats::default(),
            telemetry_received: 0,
        })
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) -> StepEvents {
        self.tick += 1;
        self.master.clock_mut().advance(self.tick_duration);

        let master_tick = self.master.tick();
        if master_tick.query_sent {
            self.pending_query_tick = Some(self.tick);
        }
        if let Some(telemetry) = master_tick.telemetry {
            self.telemetry_received += 1;
            let sent = self.pending_query_tick.take().filter(|_| telemetry.aligned);
            if let Some(sent) = sent {
                let round_trip = self.tick - sent;
                self.round_trip.record(round_trip);
                metrics::histogram!(metric_defs::SIM_ROUND_TRIP_TICKS.name)
                    .record(round_trip as f64);
                debug!(
                    "Simulation: Tick {}: telemetry after {} ticks (moisture {}%)",
                    self.tick, round_trip, telemetry.readings.moisture
                );
            }
        }

        self.radio.pump();
        let exchange = self.node.tick();

        StepEvents {
            query_sent: master_tick.query_sent,
            query_answered: exchange.is_some(),
            telemetry: master_tick.telemetry,
        }
    }

    /// Run the configured number of ticks and summarize.
    pub fn run(&mut self) -> SimulationSummary {
        info!(
            "Simulation: Running {} ticks ({} ms each, seed {}, loss {})",
            self.config.ticks,
            self.config.tick_ms,
            self.config.seed,
            self.config.link.byte_loss_probability
        );
        for _ in 0..self.config.ticks {
            self.step();
        }
        let summary = self.summary();
        info!(
            "Simulation: {} queries sent, {} answered, {} telemetry frames received",
            summary.queries_sent, summary.replies_sent, summary.telemetry_received
        );
        summary
    }

    /// Summary of everything so far.
    pub fn summary(&self) -> SimulationSummary {
        let master_link = self.master.link_stats();
        let node_link = self.node.link_stats();
        SimulationSummary {
            ticks: self.tick,
            seed: self.config.seed,
            queries_sent: self.master.queries_sent(),
            queries_received: node_link.frames_received,
            replies_sent: self.node.replies_sent(),
            telemetry_received: self.telemetry_received,
            misaligned_queries: node_link.sentinel_mismatches,
            misaligned_acks: master_link.sentinel_mismatches,
            radio: self.radio.stats(),
            round_trip: self.round_trip,
            node_config: self.node.remote_config().copied(),
            last_telemetry: self.master.telemetry().copied(),
        }
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The Master station.
    pub fn master(&self) -> &MasterStation<ChannelSerial, FixedClock> {
        &self.master
    }

    /// Mutable access to the Master station.
    pub fn master_mut(&mut self) -> &mut MasterStation<ChannelSerial, FixedClock> {
        &mut self.master
    }

    /// The Node station.
    pub fn node(&self) -> &NodeStation<ChannelSerial, SimSensors> {
        &self.node
    }

    /// The radio.
    pub fn radio(&self) -> &RadioLink {
        &self.radio
    }

    /// Mutable access to the radio.
    pub fn radio_mut(&mut self) -> &mut RadioLink {
        &mut self.radio
    }
}
