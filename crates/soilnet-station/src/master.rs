//! Master station: the coordinator's control loop.
//!
//! The Master owns the irrigation parameters the user configures, stamps them
//! with the current time and forecast, and sends them to the Node as a query.
//! Each tick it also polls once for the Node's acknowledgment, which carries
//! the field unit's telemetry back.

use serde::{Deserialize, Serialize};
use soilnet_link::{AckField, FieldSet, LinkStats, Master, QueryField, SerialPort};
use soilnet_metrics::{metric_defs, RoleLabels};
use tracing::{debug, trace, warn};

use crate::clock::Clock;
use crate::settings::{IrrigationSettings, NodeTelemetry, Param, RemoteConfig, ScheduleInfo};

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for a Master station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    /// Station name, used in logs and metric labels.
    pub name: String,
    /// Ticks between periodic queries. `0` disables periodic queries, so
    /// only save requests trigger one.
    pub query_interval_ticks: u32,
}

impl Default for MasterConfig {
    fn default() -> Self {
        MasterConfig {
            name: "master".to_string(),
            query_interval_ticks: 100,
        }
    }
}

/// What happened during one [`MasterStation::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MasterTick {
    /// A query frame was handed to the link.
    pub query_sent: bool,
    /// Telemetry completed this tick.
    pub telemetry: Option<NodeTelemetry>,
}

// ============================================================================
// Master Station
// ============================================================================

/// The coordinator's per-tick control loop.
pub struct MasterStation<S: SerialPort, C: Clock> {
    config: MasterConfig,
    labels: RoleLabels,
    link: Master<S>,
    clock: C,

    // Values supplied by the display/forecast side
    settings: IrrigationSettings,
    probability_of_precipitation: u8,
    irrigation_command: u8,
    save_requested: bool,

    // Values received from the Node
    telemetry: Option<NodeTelemetry>,
    reception_indicator: bool,

    ticks_since_query: u32,
    queries_sent: u64,
}

impl<S: SerialPort, C: Clock> MasterStation<S, C> {
    /// Create a Master station talking over `serial`.
    pub fn new(config: MasterConfig, serial: S, clock: C) -> Self {
        let labels = RoleLabels::new(config.name.clone(), "master");
        MasterStation {
            config,
            labels,
            link: Master::new(serial),
            clock,
            settings: IrrigationSettings::default(),
            probability_of_precipitation: 0,
            irrigation_command: 0,
            save_requested: false,
            telemetry: None,
            reception_indicator: false,
            ticks_since_query: 0,
            queries_sent: 0,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    // ========================================================================
    // Display-side Interface
    // ========================================================================

    /// Current irrigation parameters.
    pub fn settings(&self) -> &IrrigationSettings {
        &self.settings
    }

    /// Mutable access to the irrigation parameters.
    pub fn settings_mut(&mut self) -> &mut IrrigationSettings {
        &mut self.settings
    }

    /// Replace the irrigation parameters.
    pub fn set_settings(&mut self, settings: IrrigationSettings) {
        self.settings = settings;
    }

    /// Read one parameter.
    pub fn param(&self, param: Param) -> u8 {
        self.settings.get(param)
    }

    /// Set one parameter.
    pub fn set_param(&mut self, param: Param, value: u8) {
        self.settings.set(param, value);
    }

    /// Record the latest probability of precipitation.
    pub fn register_pop(&mut self, probability_of_precipitation: u8) {
        self.probability_of_precipitation = probability_of_precipitation;
    }

    /// Set the remote irrigation command sent with the next query.
    pub fn set_irrigation_command(&mut self, command: u8) {
        self.irrigation_command = command;
    }

    /// Ask for a query to go out on the next tick.
    pub fn request_save(&mut self) {
        self.save_requested = true;
    }

    /// Read and clear the pending save request.
    pub fn take_save_request(&mut self) -> bool {
        std::mem::take(&mut self.save_requested)
    }

    /// Latest telemetry received from the Node, if any.
    pub fn telemetry(&self) -> Option<&NodeTelemetry> {
        self.telemetry.as_ref()
    }

    /// Toggles on every received frame; a display shows it as a heartbeat.
    pub fn reception_indicator(&self) -> bool {
        self.reception_indicator
    }

    // ========================================================================
    // Link Side
    // ========================================================================

    /// The query that would be sent now.
    pub fn outgoing(&self) -> RemoteConfig {
        RemoteConfig {
            settings: self.settings,
            schedule: ScheduleInfo {
                current_hour: self.clock.hour(),
                current_minute: self.clock.minute(),
                probability_of_precipitation: self.probability_of_precipitation,
                irrigation_command: self.irrigation_command,
            },
        }
    }

    /// Encode every query field and transmit once.
    pub fn send_query(&mut self) {
        let outgoing = self.outgoing();
        for &field in QueryField::ALL {
            self.link.encode(outgoing.field(field), field);
        }

        let before = self.link.stats();
        self.link.transmit();
        let after = self.link.stats();
        self.ticks_since_query = 0;

        if after.frames_sent > before.frames_sent {
            self.queries_sent += 1;
            metrics::counter!(metric_defs::LINK_FRAMES_SENT.name, &self.labels.to_labels())
                .increment(1);
            metrics::counter!(metric_defs::STATION_QUERIES_SENT.name, &self.labels.to_labels())
                .increment(1);
            debug!(
                "MasterStation[{}]: Query sent (moisture {}-{}%, time {:02}:{:02})",
                self.config.name,
                outgoing.settings.min_moisture,
                outgoing.settings.max_moisture,
                outgoing.schedule.current_hour,
                outgoing.schedule.current_minute
            );
        } else {
            metrics::counter!(metric_defs::LINK_WRITE_FAILURES.name, &self.labels.to_labels())
                .increment(1);
            warn!("MasterStation[{}]: Query could not be written", self.config.name);
        }
    }

    /// Run one pass of the control loop.
    ///
    /// Sends a query if a save was requested or the query interval elapsed,
    /// then takes at most one byte from the link.
    pub fn tick(&mut self) -> MasterTick {
        let mut result = MasterTick::default();

        self.ticks_since_query = self.ticks_since_query.saturating_add(1);
        let interval_elapsed = self.config.query_interval_ticks > 0
            && self.ticks_since_query >= self.config.query_interval_ticks;
        if self.take_save_request() || interval_elapsed {
            self.send_query();
            result.query_sent = true;
        }

        if self.link.poll() {
            result.telemetry = Some(self.on_frame_received());
        }
        metrics::gauge!(metric_defs::LINK_RX_CURSOR.name, &self.labels.to_labels())
            .set(self.link.cursor() as f64);

        result
    }

    fn on_frame_received(&mut self) -> NodeTelemetry {
        let aligned = self.link.rx_sentinel_matches();
        let telemetry = NodeTelemetry::from_fields(|f: AckField| self.link.decode(f), aligned);
        let labels = self.labels.to_labels();

        metrics::counter!(metric_defs::LINK_FRAMES_RECEIVED.name, &labels).increment(1);
        if !aligned {
            metrics::counter!(metric_defs::LINK_SENTINEL_MISMATCH.name, &labels).increment(1);
            warn!(
                "MasterStation[{}]: Ack frame started with 0x{:02X}, values may be misaligned",
                self.config.name,
                self.link.rx_frame().sentinel()
            );
        }
        metrics::gauge!(metric_defs::STATION_MOISTURE.name, &labels)
            .set(f64::from(telemetry.readings.moisture));
        metrics::gauge!(metric_defs::STATION_BATTERY_LEVEL.name, &labels)
            .set(f64::from(telemetry.readings.battery_level));

        trace!(
            "MasterStation[{}]: Telemetry {:?}",
            self.config.name,
            telemetry.readings
        );
        if telemetry.battery_low() {
            debug!(
                "MasterStation[{}]: Node battery low ({:.1} V)",
                self.config.name,
                telemetry.battery_volts()
            );
        }

        self.reception_indicator = !self.reception_indicator;
        self.telemetry = Some(telemetry);
        telemetry
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of queries handed to the link.
    pub fn queries_sent(&self) -> u64 {
        self.queries_sent
    }

    /// Link counters.
    pub fn link_stats(&self) -> LinkStats {
        self.link.stats()
    }

    /// The underlying endpoint.
    pub fn link(&self) -> &Master<S> {
        &self.link
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
