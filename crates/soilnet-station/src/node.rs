//! Node station: the field unit's control loop.
//!
//! The Node is passive on the link. It polls one byte per tick; once a whole
//! query has arrived it stores the irrigation configuration it carries,
//! samples its sensors and answers with an acknowledgment frame.

use serde::{Deserialize, Serialize};
use soilnet_link::{AckField, FieldSet, LinkStats, Node, QueryField, SerialPort};
use soilnet_metrics::{metric_defs, RoleLabels};
use tracing::{debug, trace, warn};

use crate::sensor::SensorSuite;
use crate::settings::{RemoteConfig, SensorReadings};

/// Configuration for a Node station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Station name, used in logs and metric labels.
    pub name: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            name: "node".to_string(),
        }
    }
}

/// The result of answering one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeExchange {
    /// Configuration decoded from the query.
    pub received: RemoteConfig,
    /// Whether the query started with the expected sentinel.
    pub aligned: bool,
    /// Readings sent back in the reply.
    pub replied: SensorReadings,
}

/// The field unit's per-tick control loop.
pub struct NodeStation<S: SerialPort, Sn: SensorSuite> {
    config: NodeConfig,
    labels: RoleLabels,
    link: Node<S>,
    sensors: Sn,
    remote: Option<RemoteConfig>,
    replies_sent: u64,
}

impl<S: SerialPort, Sn: SensorSuite> NodeStation<S, Sn> {
    /// Create a Node station talking over `serial`.
    pub fn new(config: NodeConfig, serial: S, sensors: Sn) -> Self {
        let labels = RoleLabels::new(config.name.clone(), "node");
        NodeStation {
            config,
            labels,
            link: Node::new(serial),
            sensors,
            remote: None,
            replies_sent: 0,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Run one pass of the control loop.
    ///
    /// Returns the exchange if a query completed (and was answered) this tick.
    pub fn tick(&mut self) -> Option<NodeExchange> {
        let complete = self.link.poll();
        metrics::gauge!(metric_defs::LINK_RX_CURSOR.name, &self.labels.to_labels())
            .set(self.link.cursor() as f64);
        if !complete {
            return None;
        }

        let aligned = self.link.rx_sentinel_matches();
        let received = RemoteConfig::from_fields(|f: QueryField| self.link.decode(f));
        let labels = self.labels.to_labels();
        metrics::counter!(metric_defs::LINK_FRAMES_RECEIVED.name, &labels).increment(1);
        if !aligned {
            metrics::counter!(metric_defs::LINK_SENTINEL_MISMATCH.name, &labels).increment(1);
            warn!(
                "NodeStation[{}]: Query started with 0x{:02X}, values may be misaligned",
                self.config.name,
                self.link.rx_frame().sentinel()
            );
        }
        debug!(
            "NodeStation[{}]: Query received (moisture {}-{}%, time {:02}:{:02}, command {})",
            self.config.name,
            received.settings.min_moisture,
            received.settings.max_moisture,
            received.schedule.current_hour,
            received.schedule.current_minute,
            received.schedule.irrigation_command
        );
        self.remote = Some(received);

        let replied = self.reply();
        Some(NodeExchange {
            received,
            aligned,
            replied,
        })
    }

    /// Sample the sensors, encode every ack field and transmit once.
    pub fn reply(&mut self) -> SensorReadings {
        let readings = self.sensors.sample();
        for &field in AckField::ALL {
            self.link.encode(readings.field(field), field);
        }

        let before = self.link.stats();
        self.link.transmit();
        let labels = self.labels.to_labels();
        if self.link.stats().frames_sent > before.frames_sent {
            self.replies_sent += 1;
            metrics::counter!(metric_defs::LINK_FRAMES_SENT.name, &labels).increment(1);
            metrics::counter!(metric_defs::STATION_REPLIES_SENT.name, &labels).increment(1);
            trace!("NodeStation[{}]: Reply sent {:?}", self.config.name, readings);
        } else {
            metrics::counter!(metric_defs::LINK_WRITE_FAILURES.name, &labels).increment(1);
            warn!("NodeStation[{}]: Reply could not be written", self.config.name);
        }
        readings
    }

    /// Configuration from the most recent query, if any has arrived.
    pub fn remote_config(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref()
    }

    /// Number of replies handed to the link.
    pub fn replies_sent(&self) -> u64 {
        self.replies_sent
    }

    /// Link counters.
    pub fn link_stats(&self) -> LinkStats {
        self.link.stats()
    }

    /// The underlying endpoint.
    pub fn link(&self) -> &Node<S> {
        &self.link
    }

    /// Mutable access to the sensors.
    pub fn sensors_mut(&mut self) -> &mut Sn {
        &mut self.sensors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::StaticSensors;
    use soilnet_link::ChannelSerial;

    fn readings() -> SensorReadings {
        SensorReadings {
            moisture: 55,
            temperature: 21,
            humidity: 40,
            water_level: 7,
            battery_level: 118,
        }
    }

    #[test]
    fn test_idle_node_sends_nothing() {
        let (port, mut peer) = ChannelSerial::pair();
        let mut node = NodeStation::new(NodeConfig::default(), port, StaticSensors::new(readings()));
        for _ in 0..50 {
            assert!(node.tick().is_none());
        }
        assert!(peer.drain().is_empty());
        assert!(node.remote_config().is_none());
    }

    #[test]
    fn test_query_is_answered() {
        let (port, mut peer) = ChannelSerial::pair();
        let mut node = NodeStation::new(NodeConfig::default(), port, StaticSensors::new(readings()));
        peer.write(&[0xAA, 20, 80, 5, 30, 9, 15, 15, 0, 70, 0])
            .expect("write should succeed");

        let exchange = (0..11).find_map(|_| node.tick()).expect("query should complete");
        assert!(exchange.aligned);
        assert_eq!(exchange.received.settings.min_moisture, 20);
        assert_eq!(exchange.received.settings.max_irrigation_time, 30);
        assert_eq!(exchange.received.schedule.current_hour, 9);
        assert_eq!(exchange.received.schedule.probability_of_precipitation, 70);
        assert_eq!(exchange.replied, readings());

        assert_eq!(peer.drain(), vec![0xBB, 55, 21, 40, 7, 118]);
        assert_eq!(node.replies_sent(), 1);
        assert_eq!(node.remote_config(), Some(&exchange.received));
    }
}
