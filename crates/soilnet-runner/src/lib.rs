//! # soilnet-runner
//!
//! Runs a SoilNet Master and Node against each other over a simulated HC-12
//! radio. The radio carries bytes at the configured baud rate and can lose
//! individual bytes, which exercises the link's lack of resynchronization.
//!
//! ```rust
//! use soilnet_runner::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     ticks: 500,
//!     ..SimulationConfig::default()
//! };
//! let summary = Simulation::new(config).unwrap().run();
//! assert_eq!(summary.queries_sent, 5);
//! assert_eq!(summary.telemetry_received, 5);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod radio;
pub mod sim;

pub use config::{LinkConfig, MasterSection, NodeSection, SimulationConfig};
pub use error::{RunnerError, RunnerResult};
pub use logging::init_logging;
pub use radio::{Direction, DirectionStats, RadioLink, RadioStats};
pub use sim::{RoundTripStats, SimSensors, Simulation, SimulationSummary, StepEvents};
