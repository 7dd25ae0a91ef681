//! Wall-clock source for the Master.
//!
//! The Master stamps every query with its current hour and minute so the Node
//! can schedule irrigation without a clock of its own.

use chrono::{Local, NaiveTime, TimeDelta, Timelike};

/// Supplies the current time of day.
pub trait Clock {
    /// Current time of day.
    fn now(&self) -> NaiveTime;

    /// Current hour (0..24).
    fn hour(&self) -> u8 {
        self.now().hour() as u8
    }

    /// Current minute (0..60).
    fn minute(&self) -> u8 {
        self.now().minute() as u8
    }
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    time: NaiveTime,
}

impl FixedClock {
    /// Clock stopped at `hour:minute`. Out-of-range values fall back to midnight.
    pub fn new(hour: u8, minute: u8) -> Self {
        FixedClock {
            time: NaiveTime::from_hms_opt(u32::from(hour), u32::from(minute), 0)
                .unwrap_or(NaiveTime::MIN),
        }
    }

    /// Move the clock forward, wrapping past midnight.
    pub fn advance(&mut self, delta: TimeDelta) {
        let (time, _) = self.time.overflowing_add_signed(delta);
        self.time = time;
    }

    /// Set the clock.
    pub fn set(&mut self, time: NaiveTime) {
        self.time = time;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        FixedClock::new(0, 0)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.time
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveTime {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let mut clock = FixedClock::new(23, 58);
        assert_eq!((clock.hour(), clock.minute()), (23, 58));

        clock.advance(TimeDelta::minutes(3));
        assert_eq!((clock.hour(), clock.minute()), (0, 1));
    }

    #[test]
    fn test_fixed_clock_out_of_range() {
        let clock = FixedClock::new(24, 0);
        assert_eq!((clock.hour(), clock.minute()), (0, 0));
    }

    #[test]
    fn test_system_clock_in_range() {
        let clock = SystemClock;
        assert!(clock.hour() < 24);
        assert!(clock.minute() < 60);
    }
}
