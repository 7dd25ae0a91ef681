//! # soilnet-station
//!
//! Control loops for the two SoilNet roles, built on [`soilnet_link`].
//!
//! - [`MasterStation`] holds the irrigation parameters, sends them to the
//!   field unit together with the time and forecast, and collects telemetry.
//! - [`NodeStation`] answers each query with a fresh sensor sample.
//!
//! Both are driven by calling `tick()` from a cooperative loop. A tick never
//! blocks: it sends at most one frame and receives at most one byte.
//!
//! ## Usage
//!
//! ```rust
//! use soilnet_link::ChannelSerial;
//! use soilnet_station::{
//!     FixedClock, MasterConfig, MasterStation, NodeConfig, NodeStation, Param, SensorReadings,
//!     StaticSensors,
//! };
//!
//! let (master_port, node_port) = ChannelSerial::pair();
//! let mut master = MasterStation::new(MasterConfig::default(), master_port, FixedClock::new(6, 0));
//! let sensors = StaticSensors::new(SensorReadings { moisture: 42, ..Default::default() });
//! let mut node = NodeStation::new(NodeConfig::default(), node_port, sensors);
//!
//! master.set_param(Param::MinMoisture, 30);
//! master.request_save();
//!
//! for _ in 0..32 {
//!     master.tick();
//!     node.tick();
//! }
//! assert_eq!(node.remote_config().map(|c| c.settings.min_moisture), Some(30));
//! assert_eq!(master.telemetry().map(|t| t.readings.moisture), Some(42));
//! ```

pub mod clock;
pub mod error;
pub mod master;
pub mod node;
pub mod sensor;
pub mod settings;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{StationError, StationResult};
pub use master::{MasterConfig, MasterStation, MasterTick};
pub use node::{NodeConfig, NodeExchange, NodeStation};
pub use sensor::{raw_to_moisture, AnalogInput, SensorSuite, SoilSensor, StaticSensors};
pub use settings::{
    IrrigationSettings, NodeTelemetry, Param, RemoteConfig, ScheduleInfo, SensorReadings,
};
