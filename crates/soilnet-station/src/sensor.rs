//! Sensor collaborators for the Node.

use crate::error::{StationError, StationResult};
use crate::settings::SensorReadings;

/// Most samples a [`SoilSensor`] averages per reading.
pub const MAX_SAMPLES: u8 = 20;

/// Raw ADC value of the probe in dry air (0 % moisture).
pub const RAW_IN_AIR: u16 = 450;

/// Raw ADC value of the probe in water (100 % moisture).
pub const RAW_IN_WATER: u16 = 180;

/// Supplies the Node's outbound readings each cycle.
pub trait SensorSuite {
    /// Sample every sensor once.
    fn sample(&mut self) -> SensorReadings;
}

impl<T: SensorSuite + ?Sized> SensorSuite for &mut T {
    fn sample(&mut self) -> SensorReadings {
        (**self).sample()
    }
}

/// A single analog input pin.
pub trait AnalogInput {
    /// One raw conversion.
    fn read(&mut self) -> u16;
}

impl<F: FnMut() -> u16> AnalogInput for F {
    fn read(&mut self) -> u16 {
        self()
    }
}

/// Capacitive soil-moisture probe on an analog input.
#[derive(Debug)]
pub struct SoilSensor<A> {
    input: A,
    samples: u8,
}

impl<A: AnalogInput> SoilSensor<A> {
    /// Create a sensor averaging `samples` conversions, capped at [`MAX_SAMPLES`].
    pub fn new(input: A, samples: u8) -> StationResult<Self> {
        if samples == 0 {
            return Err(StationError::NoSamples);
        }
        Ok(SoilSensor {
            input,
            samples: samples.min(MAX_SAMPLES),
        })
    }

    /// Number of conversions averaged per reading.
    pub fn samples(&self) -> u8 {
        self.samples
    }

    /// Read moisture in percent.
    pub fn moisture(&mut self) -> u8 {
        let total: u32 = (0..self.samples).map(|_| u32::from(self.input.read())).sum();
        let average = (total as f32 / f32::from(self.samples)).round() as u16;
        raw_to_moisture(average)
    }
}

/// Convert a raw probe value to moisture percent.
///
/// Linear between [`RAW_IN_WATER`] (100 %) and [`RAW_IN_AIR`] (0 %), clamped
/// to that range and rounded to the nearest percent.
pub fn raw_to_moisture(raw: u16) -> u8 {
    let raw = raw.clamp(RAW_IN_WATER, RAW_IN_AIR);
    let span = f32::from(RAW_IN_AIR - RAW_IN_WATER);
    let wetness = f32::from(RAW_IN_AIR - raw) / span;
    (wetness * 100.0).round() as u8
}

/// Readings that only change when set. Useful for bench setups and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticSensors {
    /// Readings returned by every sample.
    pub readings: SensorReadings,
}

impl StaticSensors {
    /// Sensors always reporting `readings`.
    pub fn new(readings: SensorReadings) -> Self {
        StaticSensors { readings }
    }
}

impl SensorSuite for StaticSensors {
    fn sample(&mut self) -> SensorReadings {
        self.readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_to_moisture_endpoints() {
        assert_eq!(raw_to_moisture(RAW_IN_AIR), 0);
        assert_eq!(raw_to_moisture(RAW_IN_WATER), 100);
        assert_eq!(raw_to_moisture(315), 50);
    }

    #[test]
    fn test_raw_to_moisture_clamps() {
        assert_eq!(raw_to_moisture(1023), 0);
        assert_eq!(raw_to_moisture(0), 100);
    }

    #[test]
    fn test_soil_sensor_averages() {
        let mut values = [400u16, 300].into_iter().cycle();
        let mut sensor = SoilSensor::new(move || values.next().unwrap_or(0), 4).expect("valid");
        // Average 350 -> (450 - 350) / 270 = 37.04 %
        assert_eq!(sensor.moisture(), 37);
    }

    #[test]
    fn test_soil_sensor_caps_samples() {
        let mut reads = 0u32;
        let mut sensor = SoilSensor::new(
            || {
                reads += 1;
                RAW_IN_WATER
            },
            200,
        )
        .expect("valid");
        assert_eq!(sensor.samples(), MAX_SAMPLES);
        assert_eq!(sensor.moisture(), 100);
        drop(sensor);
        assert_eq!(reads, u32::from(MAX_SAMPLES));
    }

    #[test]
    fn test_soil_sensor_rejects_zero_samples() {
        assert!(matches!(
            SoilSensor::new(|| 0u16, 0),
            Err(StationError::NoSamples)
        ));
    }
}
