//! Values carried by the link, in station terms.
//!
//! The link moves raw bytes. These types give those bytes names and the few
//! rules the stations apply to them.

use serde::{Deserialize, Serialize};
use soilnet_link::{AckField, QueryField};

use crate::error::{StationError, StationResult};

/// Battery level at or below which the Node is reported low (10.2 V).
pub const LOW_BATTERY_LEVEL: u8 = 102;

/// Largest moisture bound accepted, in percent.
pub const MAX_MOISTURE_PERCENT: u8 = 100;

// ============================================================================
// Irrigation Settings
// ============================================================================

/// A user-configurable irrigation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    /// Lower soil-moisture bound (%).
    MinMoisture,
    /// Upper soil-moisture bound (%).
    MaxMoisture,
    /// Minimum irrigation time (minutes).
    MinIrrigationTime,
    /// Maximum irrigation time (minutes).
    MaxIrrigationTime,
    /// Forecast hour (0..24).
    ForecastHour,
    /// Forecast minute (0..60).
    ForecastMinute,
}

impl Param {
    /// The query field carrying this parameter.
    pub fn field(self) -> QueryField {
        match self {
            Param::MinMoisture => QueryField::MinMoisture,
            Param::MaxMoisture => QueryField::MaxMoisture,
            Param::MinIrrigationTime => QueryField::MinIrrigationTime,
            Param::MaxIrrigationTime => QueryField::MaxIrrigationTime,
            Param::ForecastHour => QueryField::ForecastHour,
            Param::ForecastMinute => QueryField::ForecastMinute,
        }
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Param::MinMoisture => "min_moisture",
            Param::MaxMoisture => "max_moisture",
            Param::MinIrrigationTime => "min_irrigation_time",
            Param::MaxIrrigationTime => "max_irrigation_time",
            Param::ForecastHour => "forecast_hour",
            Param::ForecastMinute => "forecast_minute",
        };
        f.write_str(name)
    }
}

/// Irrigation parameters set on the Master and pushed to the Node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrigationSettings {
    /// Lower soil-moisture bound (%).
    pub min_moisture: u8,
    /// Upper soil-moisture bound (%).
    pub max_moisture: u8,
    /// Minimum irrigation time (minutes).
    pub min_irrigation_time: u8,
    /// Maximum irrigation time (minutes).
    pub max_irrigation_time: u8,
    /// Hour the forecast applies to.
    pub forecast_hour: u8,
    /// Minute the forecast applies to.
    pub forecast_minute: u8,
}

impl IrrigationSettings {
    /// Every parameter, in display order.
    pub const PARAMS: [Param; 6] = [
        Param::MinMoisture,
        Param::MaxMoisture,
        Param::MinIrrigationTime,
        Param::MaxIrrigationTime,
        Param::ForecastHour,
        Param::ForecastMinute,
    ];

    /// Read one parameter.
    pub fn get(&self, param: Param) -> u8 {
        match param {
            Param::MinMoisture => self.min_moisture,
            Param::MaxMoisture => self.max_moisture,
            Param::MinIrrigationTime => self.min_irrigation_time,
            Param::MaxIrrigationTime => self.max_irrigation_time,
            Param::ForecastHour => self.forecast_hour,
            Param::ForecastMinute => self.forecast_minute,
        }
    }

    /// Set one parameter. Forecast hour and minute wrap modulo 24 and 60.
    pub fn set(&mut self, param: Param, value: u8) {
        match param {
            Param::MinMoisture => self.min_moisture = value,
            Param::MaxMoisture => self.max_moisture = value,
            Param::MinIrrigationTime => self.min_irrigation_time = value,
            Param::MaxIrrigationTime => self.max_irrigation_time = value,
            Param::ForecastHour => self.forecast_hour = value % 24,
            Param::ForecastMinute => self.forecast_minute = value % 60,
        }
    }

    /// Check ranges and bound ordering.
    pub fn validate(&self) -> StationResult<()> {
        for param in [Param::MinMoisture, Param::MaxMoisture] {
            let value = self.get(param);
            if value > MAX_MOISTURE_PERCENT {
                return Err(StationError::ParamOutOfRange {
                    param,
                    value,
                    max: MAX_MOISTURE_PERCENT,
                });
            }
        }
        for (param, max) in [(Param::ForecastHour, 23), (Param::ForecastMinute, 59)] {
            let value = self.get(param);
            if value > max {
                return Err(StationError::ParamOutOfRange { param, value, max });
            }
        }
        for (lower, upper) in [
            (Param::MinMoisture, Param::MaxMoisture),
            (Param::MinIrrigationTime, Param::MaxIrrigationTime),
        ] {
            if self.get(lower) > self.get(upper) {
                return Err(StationError::InvertedBounds {
                    lower,
                    lower_value: self.get(lower),
                    upper,
                    upper_value: self.get(upper),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// The non-parameter part of a query: clock, forecast outcome and command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInfo {
    /// Master's clock hour when the query was built.
    pub current_hour: u8,
    /// Master's clock minute when the query was built.
    pub current_minute: u8,
    /// Probability of precipitation (%).
    pub probability_of_precipitation: u8,
    /// Remote irrigation command.
    pub irrigation_command: u8,
}

/// Everything the Node learns from one query frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Irrigation parameters.
    pub settings: IrrigationSettings,
    /// Clock and forecast.
    pub schedule: ScheduleInfo,
}

impl RemoteConfig {
    /// Assemble from a field reader, typically `Node::decode`.
    pub fn from_fields(read: impl Fn(QueryField) -> u8) -> Self {
        RemoteConfig {
            settings: IrrigationSettings {
                min_moisture: read(QueryField::MinMoisture),
                max_moisture: read(QueryField::MaxMoisture),
                min_irrigation_time: read(QueryField::MinIrrigationTime),
                max_irrigation_time: read(QueryField::MaxIrrigationTime),
                forecast_hour: read(QueryField::ForecastHour),
                forecast_minute: read(QueryField::ForecastMinute),
            },
            schedule: ScheduleInfo {
                current_hour: read(QueryField::CurrentHour),
                current_minute: read(QueryField::CurrentMinute),
                probability_of_precipitation: read(QueryField::ProbabilityOfPrecipitation),
                irrigation_command: read(QueryField::IrrigationCommand),
            },
        }
    }

    /// Value for one query field.
    pub fn field(&self, field: QueryField) -> u8 {
        match field {
            QueryField::MinMoisture => self.settings.min_moisture,
            QueryField::MaxMoisture => self.settings.max_moisture,
            QueryField::MinIrrigationTime => self.settings.min_irrigation_time,
            QueryField::MaxIrrigationTime => self.settings.max_irrigation_time,
            QueryField::CurrentHour => self.schedule.current_hour,
            QueryField::CurrentMinute => self.schedule.current_minute,
            QueryField::ForecastHour => self.settings.forecast_hour,
            QueryField::ForecastMinute => self.settings.forecast_minute,
            QueryField::ProbabilityOfPrecipitation => self.schedule.probability_of_precipitation,
            QueryField::IrrigationCommand => self.schedule.irrigation_command,
        }
    }
}

// ============================================================================
// Telemetry
// ============================================================================

/// One sampling of the Node's sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorReadings {
    /// Soil moisture (%).
    pub moisture: u8,
    /// Air temperature (°C).
    pub temperature: u8,
    /// Relative humidity (%).
    pub humidity: u8,
    /// Reservoir water level.
    pub water_level: u8,
    /// Battery level in tenths of a volt.
    pub battery_level: u8,
}

impl SensorReadings {
    /// Value for one ack field.
    pub fn field(&self, field: AckField) -> u8 {
        match field {
            AckField::Moisture => self.moisture,
            AckField::Temperature => self.temperature,
            AckField::Humidity => self.humidity,
            AckField::WaterLevel => self.water_level,
            AckField::BatteryLevel => self.battery_level,
        }
    }
}

/// Node telemetry as seen by the Master.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTelemetry {
    /// The raw readings.
    pub readings: SensorReadings,
    /// Whether the frame carrying them started with the expected sentinel.
    pub aligned: bool,
}

impl NodeTelemetry {
    /// Assemble from a field reader, typically `Master::decode`.
    pub fn from_fields(read: impl Fn(AckField) -> u8, aligned: bool) -> Self {
        NodeTelemetry {
            readings: SensorReadings {
                moisture: read(AckField::Moisture),
                temperature: read(AckField::Temperature),
                humidity: read(AckField::Humidity),
                water_level: read(AckField::WaterLevel),
                battery_level: read(AckField::BatteryLevel),
            },
            aligned,
        }
    }

    /// Battery voltage.
    pub fn battery_volts(&self) -> f32 {
        f32::from(self.readings.battery_level) / 10.0
    }

    /// Whether the battery is at or below 10.2 V.
    pub fn battery_low(&self) -> bool {
        self.readings.battery_level <= LOW_BATTERY_LEVEL
    }
}
