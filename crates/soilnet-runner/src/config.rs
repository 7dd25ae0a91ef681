//! Simulation configuration.
//!
//! A simulation is described by a small YAML document. Every section is
//! optional; missing values fall back to the defaults below.
//!
//! ```yaml
//! ticks: 20000
//! seed: 7
//! tick_ms: 10
//! link:
//!   baud_rate: 9600
//!   byte_loss_probability: 0.001
//! master:
//!   name: greenhouse
//!   query_interval_ticks: 500
//!   start_time: "06:00:00"
//!   probability_of_precipitation: 20
//!   settings:
//!     min_moisture: 30
//!     max_moisture: 70
//! node:
//!   name: bed-1
//!   probe_raw: 315
//!   readings:
//!     temperature: 21
//!     battery_level: 118
//! ```

use std::path::Path;

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use soilnet_link::DEFAULT_BAUD_RATE;
use soilnet_station::{IrrigationSettings, MasterConfig, NodeConfig, SensorReadings};

use crate::error::{RunnerError, RunnerResult};

/// Bits on the wire per byte (start + 8 data + stop).
pub const BITS_PER_BYTE: u32 = 10;

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of control-loop ticks to run.
    pub ticks: u64,
    /// Seed for the radio loss model.
    pub seed: u64,
    /// Simulated duration of one tick, in milliseconds.
    pub tick_ms: u64,
    /// Radio link model.
    pub link: LinkConfig,
    /// Master station.
    pub master: MasterSection,
    /// Node station.
    pub node: NodeSection,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            ticks: 10_000,
            seed: 0,
            tick_ms: 10,
            link: LinkConfig::default(),
            master: MasterSection::default(),
            node: NodeSection::default(),
        }
    }
}

/// Radio link model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Serial baud rate; bounds how many bytes cross the link per tick.
    pub baud_rate: u32,
    /// Probability that any single byte is lost in the air.
    pub byte_loss_probability: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            baud_rate: DEFAULT_BAUD_RATE,
            byte_loss_probability: 0.0,
        }
    }
}

impl LinkConfig {
    /// Bytes the link can carry per second.
    pub fn bytes_per_second(&self) -> f64 {
        f64::from(self.baud_rate) / f64::from(BITS_PER_BYTE)
    }
}

/// Master station section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterSection {
    /// Station name.
    pub name: String,
    /// Ticks between periodic queries; `0` sends only the initial one.
    pub query_interval_ticks: u32,
    /// Time on the Master's clock at tick 0.
    pub start_time: NaiveTime,
    /// Irrigation parameters.
    pub settings: IrrigationSettings,
    /// Probability of precipitation reported by the forecast.
    pub probability_of_precipitation: u8,
    /// Remote irrigation command.
    pub irrigation_command: u8,
}

impl Default for MasterSection {
    fn default() -> Self {
        MasterSection {
            name: MasterConfig::default().name,
            query_interval_ticks: MasterConfig::default().query_interval_ticks,
            start_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
            settings: IrrigationSettings {
                min_moisture: 30,
                max_moisture: 70,
                min_irrigation_time: 5,
                max_irrigation_time: 30,
                forecast_hour: 15,
                forecast_minute: 0,
            },
            probability_of_precipitation: 0,
            irrigation_command: 0,
        }
    }
}

impl MasterSection {
    /// The station configuration this section describes.
    pub fn station_config(&self) -> MasterConfig {
        MasterConfig {
            name: self.name.clone(),
            query_interval_ticks: self.query_interval_ticks,
        }
    }
}

/// Node station section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// Station name.
    pub name: String,
    /// Fixed sensor readings.
    pub readings: SensorReadings,
    /// Raw soil-probe value. When set, moisture is derived from it instead
    /// of `readings.moisture`.
    pub probe_raw: Option<u16>,
    /// Conversions averaged per probe reading.
    pub probe_samples: u8,
}

impl Default for NodeSection {
    fn default() -> Self {
        NodeSection {
            name: NodeConfig::default().name,
            readings: SensorReadings {
                moisture: 45,
                temperature: 22,
                humidity: 55,
                water_level: 80,
                battery_level: 120,
            },
            probe_raw: None,
            probe_samples: 10,
        }
    }
}

impl NodeSection {
    /// The station configuration this section describes.
    pub fn station_config(&self) -> NodeConfig {
        NodeConfig {
            name: self.name.clone(),
        }
    }
}

impl SimulationConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str) -> RunnerResult<Self> {
        let config: SimulationConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> RunnerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Check the configuration for values the simulation cannot run with.
    pub fn validate(&self) -> RunnerResult<()> {
        let p = self.link.byte_loss_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(RunnerError::InvalidConfig(format!(
                "byte_loss_probability must be within 0..=1, got {}",
                p
            )));
        }
        if self.link.baud_rate == 0 {
            return Err(RunnerError::InvalidConfig("baud_rate must be positive".to_string()));
        }
        self.tick_duration()?;
        if self.node.probe_raw.is_some() && self.node.probe_samples == 0 {
            return Err(RunnerError::InvalidConfig(
                "probe_samples must be positive when probe_raw is set".to_string(),
            ));
        }
        self.master.settings.validate()?;
        Ok(())
    }

    /// Simulated time covered by one tick.
    pub fn tick_duration(&self) -> RunnerResult<TimeDelta> {
        i64::try_from(self.tick_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .filter(|d| !d.is_zero())
            .ok_or_else(|| {
                RunnerError::InvalidConfig(format!(
                    "tick_ms must be positive and representable as a duration, got {}",
                    self.tick_ms
                ))
            })
    }

    /// Bytes the link carries per tick, possibly fractional.
    pub fn bytes_per_tick(&self) -> f64 {
        self.link.bytes_per_second() * self.tick_ms as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        SimulationConfig::default().validate().expect("defaults should validate");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SimulationConfig::from_yaml("{}").expect("valid yaml");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
ticks: 500
link:
  byte_loss_probability: 0.05
master:
  start_time: "21:15:00"
  settings:
    min_moisture: 10
    max_moisture: 90
node:
  probe_raw: 180
"#;
        let config = SimulationConfig::from_yaml(yaml).expect("valid yaml");
        assert_eq!(config.ticks, 500);
        assert_eq!(config.link.baud_rate, 9600);
        assert_eq!(config.link.byte_loss_probability, 0.05);
        assert_eq!(config.master.start_time, NaiveTime::from_hms_opt(21, 15, 0).unwrap());
        assert_eq!(config.master.settings.max_moisture, 90);
        assert_eq!(config.master.settings.forecast_hour, 0);
        assert_eq!(config.node.probe_raw, Some(180));
        assert_eq!(config.node.name, "node");
    }

    #[test]
    fn test_rejects_bad_loss_probability() {
        let err = SimulationConfig::from_yaml("link:\n  byte_loss_probability: 1.5\n").unwrap_err();
        assert!(matches!(err, RunnerError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_inverted_settings() {
        let yaml = "master:\n  settings:\n    min_moisture: 80\n    max_moisture: 20\n";
        let err = SimulationConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, RunnerError::Station(_)));
    }

    #[test]
    fn test_rejects_unrepresentable_tick_duration() {
        for tick_ms in ["0", "9223372036854775808", "18446744073709551615"] {
            let yaml = format!("ticks: 1\ntick_ms: {}\n", tick_ms);
            let err = SimulationConfig::from_yaml(&yaml).unwrap_err();
            assert!(matches!(err, RunnerError::InvalidConfig(_)), "tick_ms {}", tick_ms);
        }
        let config = SimulationConfig {
            tick_ms: 60_000,
            ..SimulationConfig::default()
        };
        assert_eq!(config.tick_duration().unwrap(), TimeDelta::minutes(1));
    }

    #[test]
    fn test_bytes_per_tick() {
        let config = SimulationConfig::default();
        // 9600 baud = 960 bytes/s, 10 ms ticks
        assert!((config.bytes_per_tick() - 9.6).abs() < 1e-9);
    }
}
