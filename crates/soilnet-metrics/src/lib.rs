//! Metrics for the SoilNet link and stations.
//!
//! Every metric the workspace records is declared once here as a [`Metric`]
//! constant, so names and label keys stay consistent between the stations
//! that record them and whatever recorder the runner installs.
//!
//! ```rust
//! use soilnet_metrics::{metric_defs, RoleLabels};
//!
//! let labels = RoleLabels::new("greenhouse", "master");
//! metrics::counter!(metric_defs::LINK_FRAMES_SENT.name, &labels.to_labels()).increment(1);
//! ```

pub use metrics;

use metrics::{KeyName, SharedString, Unit};

/// Counter, gauge or histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Only ever increases.
    Counter,
    /// Latest value wins.
    Gauge,
    /// Distribution of recorded values.
    Histogram,
}

/// A metric declaration: name, kind, description, unit and label keys.
#[derive(Debug, Clone)]
pub struct Metric {
    /// Full metric name, e.g. `soilnet.link.frames_sent`.
    pub name: &'static str,
    /// What the recorder should make of samples.
    pub kind: MetricKind,
    /// One-line description handed to the recorder.
    pub description: &'static str,
    /// Unit of measurement, if any.
    pub unit: Option<Unit>,
    /// Label keys every sample carries, in order.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind, description: &'static str) -> Self {
        Metric {
            name,
            kind,
            description,
            unit: None,
            labels: &[],
        }
    }

    /// Declare a counter.
    pub const fn counter(name: &'static str, description: &'static str) -> Self {
        Self::new(name, MetricKind::Counter, description)
    }

    /// Declare a gauge.
    pub const fn gauge(name: &'static str, description: &'static str) -> Self {
        Self::new(name, MetricKind::Gauge, description)
    }

    /// Declare a histogram.
    pub const fn histogram(name: &'static str, description: &'static str) -> Self {
        Self::new(name, MetricKind::Histogram, description)
    }

    /// Attach a unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Attach the label keys.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Register name, unit and description with the installed recorder.
    pub fn describe(&self) {
        let key = KeyName::from_const_str(self.name);
        let description = SharedString::const_str(self.description);
        metrics::with_recorder(|recorder| match self.kind {
            MetricKind::Counter => recorder.describe_counter(key, self.unit, description),
            MetricKind::Gauge => recorder.describe_gauge(key, self.unit, description),
            MetricKind::Histogram => recorder.describe_histogram(key, self.unit, description),
        });
    }
}

/// All metric definitions.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Label keys on every station-scoped metric.
    pub const ROLE_LABELS: &[&str] = &[STATION_LABEL, ROLE_LABEL];
    /// Station name label key.
    pub const STATION_LABEL: &str = "station";
    /// `master` or `node` label key.
    pub const ROLE_LABEL: &str = "role";
    /// Label key on radio metrics: `downlink` or `uplink`.
    pub const DIRECTION_LABEL: &str = "direction";

    // ========================================================================
    // Link
    // ========================================================================

    /// Frames handed to the serial port.
    pub const LINK_FRAMES_SENT: Metric =
        Metric::counter("soilnet.link.frames_sent", "Frames handed to the serial port")
            .with_unit(Unit::Count)
            .with_labels(ROLE_LABELS);

    /// Frames completed by the receiver.
    pub const LINK_FRAMES_RECEIVED: Metric =
        Metric::counter("soilnet.link.frames_received", "Frames completed by the receiver")
            .with_unit(Unit::Count)
            .with_labels(ROLE_LABELS);

    /// Completed frames whose first byte was not the expected sentinel.
    ///
    /// Non-zero means the receiver has lost frame alignment.
    pub const LINK_SENTINEL_MISMATCH: Metric =
        Metric::counter("soilnet.link.sentinel_mismatch", "Completed frames with an unexpected sentinel byte")
            .with_unit(Unit::Count)
            .with_labels(ROLE_LABELS);

    /// Transmissions rejected by the serial port.
    pub const LINK_WRITE_FAILURES: Metric =
        Metric::counter("soilnet.link.write_failures", "Transmissions rejected by the serial port")
            .with_unit(Unit::Count)
            .with_labels(ROLE_LABELS);

    /// Bytes gathered toward the in-progress inbound frame.
    pub const LINK_RX_CURSOR: Metric =
        Metric::gauge("soilnet.link.rx_cursor", "Bytes gathered toward the in-progress inbound frame")
            .with_unit(Unit::Bytes)
            .with_labels(ROLE_LABELS);

    // ========================================================================
    // Stations
    // ========================================================================

    /// Queries sent by the Master.
    pub const STATION_QUERIES_SENT: Metric =
        Metric::counter("soilnet.station.queries_sent", "Queries sent by the Master")
            .with_unit(Unit::Count)
            .with_labels(ROLE_LABELS);

    /// Replies sent by the Node.
    pub const STATION_REPLIES_SENT: Metric =
        Metric::counter("soilnet.station.replies_sent", "Replies sent by the Node")
            .with_unit(Unit::Count)
            .with_labels(ROLE_LABELS);

    /// Soil moisture last reported by the Node, in percent.
    pub const STATION_MOISTURE: Metric =
        Metric::gauge("soilnet.station.moisture", "Soil moisture last reported by the Node")
            .with_unit(Unit::Percent)
            .with_labels(ROLE_LABELS);

    /// Node battery level, in tenths of a volt.
    pub const STATION_BATTERY_LEVEL: Metric =
        Metric::gauge("soilnet.station.battery_level", "Node battery level in tenths of a volt")
            .with_labels(ROLE_LABELS);

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Bytes dropped by the simulated radio.
    pub const SIM_BYTES_DROPPED: Metric =
        Metric::counter("soilnet.sim.bytes_dropped", "Bytes dropped by the simulated radio")
            .with_unit(Unit::Count)
            .with_labels(&[DIRECTION_LABEL]);

    /// Ticks between a query and the matching reply reaching the Master.
    pub const SIM_ROUND_TRIP_TICKS: Metric =
        Metric::histogram("soilnet.sim.round_trip_ticks", "Ticks between a query and the reply reaching the Master")
            .with_unit(Unit::Count);

    /// Every definition above.
    pub const ALL: &[&Metric] = &[
        &LINK_FRAMES_SENT,
        &LINK_FRAMES_RECEIVED,
        &LINK_SENTINEL_MISMATCH,
        &LINK_WRITE_FAILURES,
        &LINK_RX_CURSOR,
        &STATION_QUERIES_SENT,
        &STATION_REPLIES_SENT,
        &STATION_MOISTURE,
        &STATION_BATTERY_LEVEL,
        &SIM_BYTES_DROPPED,
        &SIM_ROUND_TRIP_TICKS,
    ];
}

/// Labels identifying which station, in which role, recorded a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleLabels {
    /// Station name.
    pub station: String,
    /// `master` or `node`.
    pub role: String,
}

impl RoleLabels {
    /// Create labels for a station.
    pub fn new(station: impl Into<String>, role: impl Into<String>) -> Self {
        RoleLabels {
            station: station.into(),
            role: role.into(),
        }
    }

    /// Labels in the `(key, value)` form the `metrics` macros accept.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![
            (metric_defs::STATION_LABEL, self.station.clone()),
            (metric_defs::ROLE_LABEL, self.role.clone()),
        ]
    }
}

/// Register descriptions for every metric. Call once after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        let labels = RoleLabels::new("greenhouse", "node").to_labels();
        assert_eq!(
            labels,
            vec![("station", "greenhouse".to_string()), ("role", "node".to_string())]
        );
    }

    #[test]
    fn test_names_are_unique_and_namespaced() {
        let mut names: Vec<&str> = metric_defs::ALL.iter().map(|m| m.name).collect();
        assert!(names.iter().all(|n| n.starts_with("soilnet.")));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), metric_defs::ALL.len());
    }

    #[test]
    fn test_definitions() {
        assert_eq!(metric_defs::LINK_FRAMES_SENT.kind, MetricKind::Counter);
        assert_eq!(metric_defs::LINK_RX_CURSOR.kind, MetricKind::Gauge);
        assert_eq!(metric_defs::LINK_RX_CURSOR.unit, Some(Unit::Bytes));
        assert_eq!(metric_defs::SIM_ROUND_TRIP_TICKS.kind, MetricKind::Histogram);
        assert_eq!(metric_defs::SIM_BYTES_DROPPED.labels, &["direction"]);
        assert_eq!(metric_defs::STATION_BATTERY_LEVEL.unit, None);
        assert!(metric_defs::ALL.iter().all(|m| !m.description.is_empty()));
    }

    #[test]
    fn test_role_labels_match_declared_keys() {
        let keys: Vec<&str> = RoleLabels::new("greenhouse", "master")
            .to_labels()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        let station_scoped = metric_defs::ALL
            .iter()
            .filter(|m| m.name.starts_with("soilnet.link.") || m.name.starts_with("soilnet.station."));
        for metric in station_scoped {
            assert_eq!(metric.labels, keys.as_slice(), "{}", metric.name);
        }
    }

    #[test]
    fn test_describe_without_recorder() {
        // With no recorder installed the descriptions are simply discarded.
        describe_metrics();
    }
}
