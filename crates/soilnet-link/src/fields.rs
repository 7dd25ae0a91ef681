//! Field identifiers for both frame directions.
//!
//! A field is located purely by its ordinal: field `i` of a set lives at
//! offset `i + 1`, right after the sentinel. The Master's outbound set is the
//! Node's inbound set (and vice versa), so the same enumeration is used on
//! both ends and the offsets agree by construction.

use crate::constants::*;

/// A closed set of fields making up one frame direction.
pub trait FieldSet: Copy + Eq + std::fmt::Debug + 'static {
    /// Number of data fields (frame length minus the sentinel).
    const COUNT: usize;
    /// Sentinel marking the origin of frames carrying this set.
    const SENTINEL: u8;
    /// Every field, in ordinal order.
    const ALL: &'static [Self];

    /// Zero-based position of the field within the set.
    fn ordinal(self) -> usize;

    /// Byte offset of the field inside a frame.
    fn offset(self) -> usize {
        self.ordinal() + 1
    }

    /// Short lowercase name used in logs.
    fn name(self) -> &'static str;
}

/// Fields of a Master→Node query frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum QueryField {
    /// Lower soil-moisture bound (%).
    MinMoisture = 0,
    /// Upper soil-moisture bound (%).
    MaxMoisture,
    /// Minimum irrigation time (minutes).
    MinIrrigationTime,
    /// Maximum irrigation time (minutes).
    MaxIrrigationTime,
    /// Current hour from the Master's clock.
    CurrentHour,
    /// Current minute from the Master's clock.
    CurrentMinute,
    /// Hour at which the forecast applies.
    ForecastHour,
    /// Minute at which the forecast applies.
    ForecastMinute,
    /// Probability of precipitation (%).
    ProbabilityOfPrecipitation,
    /// Remote irrigation command.
    IrrigationCommand,
}

impl FieldSet for QueryField {
    const COUNT: usize = QUERY_FIELD_COUNT;
    const SENTINEL: u8 = QUERY;
    const ALL: &'static [Self] = &[
        QueryField::MinMoisture,
        QueryField::MaxMoisture,
        QueryField::MinIrrigationTime,
        QueryField::MaxIrrigationTime,
        QueryField::CurrentHour,
        QueryField::CurrentMinute,
        QueryField::ForecastHour,
        QueryField::ForecastMinute,
        QueryField::ProbabilityOfPrecipitation,
        QueryField::IrrigationCommand,
    ];

    fn ordinal(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            QueryField::MinMoisture => "min_moisture",
            QueryField::MaxMoisture => "max_moisture",
            QueryField::MinIrrigationTime => "min_irrigation_time",
            QueryField::MaxIrrigationTime => "max_irrigation_time",
            QueryField::CurrentHour => "current_hour",
            QueryField::CurrentMinute => "current_minute",
            QueryField::ForecastHour => "forecast_hour",
            QueryField::ForecastMinute => "forecast_minute",
            QueryField::ProbabilityOfPrecipitation => "probability_of_precipitation",
            QueryField::IrrigationCommand => "irrigation_command",
        }
    }
}

/// Fields of a Node→Master acknowledgment frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AckField {
    /// Soil moisture (%).
    Moisture = 0,
    /// Air temperature.
    Temperature,
    /// Relative humidity (%).
    Humidity,
    /// Reservoir water level.
    WaterLevel,
    /// Battery level in tenths of a volt.
    BatteryLevel,
}

impl FieldSet for AckField {
    const COUNT: usize = ACK_FIELD_COUNT;
    const SENTINEL: u8 = ACK;
    const ALL: &'static [Self] = &[
        AckField::Moisture,
        AckField::Temperature,
        AckField::Humidity,
        AckField::WaterLevel,
        AckField::BatteryLevel,
    ];

    fn ordinal(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            AckField::Moisture => "moisture",
            AckField::Temperature => "temperature",
            AckField::Humidity => "humidity",
            AckField::WaterLevel => "water_level",
            AckField::BatteryLevel => "battery_level",
        }
    }
}
