//! Simulated HC-12 radio hop between two serial ports.
//!
//! Each station talks to its own [`ChannelSerial`]. The radio holds the far
//! end of both and carries bytes across once per tick, limited by the baud
//! rate and dropping bytes at random with a seeded generator.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use soilnet_link::{ChannelSerial, SerialPort};
use soilnet_metrics::metric_defs;
use tracing::trace;

/// Direction of travel across the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Master to Node (queries).
    Downlink,
    /// Node to Master (acknowledgments).
    Uplink,
}

impl Direction {
    /// Label value used in metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Downlink => "downlink",
            Direction::Uplink => "uplink",
        }
    }
}

/// Byte counters for one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectionStats {
    /// Bytes delivered to the receiving station.
    pub delivered: u64,
    /// Bytes lost in the air.
    pub dropped: u64,
}

/// Counters for both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RadioStats {
    /// Master to Node.
    pub downlink: DirectionStats,
    /// Node to Master.
    pub uplink: DirectionStats,
}

/// The air between the two radio modules.
pub struct RadioLink {
    master_side: ChannelSerial,
    node_side: ChannelSerial,
    loss_probability: f64,
    bytes_per_tick: f64,
    downlink_credit: f64,
    uplink_credit: f64,
    rng: ChaCha8Rng,
    stats: RadioStats,
}

impl RadioLink {
    /// Create a radio and the two station-side ports it serves.
    ///
    /// Returns `(radio, master_port, node_port)`.
    pub fn new(
        loss_probability: f64,
        bytes_per_tick: f64,
        seed: u64,
    ) -> (Self, ChannelSerial, ChannelSerial) {
        let (master_port, master_side) = ChannelSerial::pair();
        let (node_port, node_side) = ChannelSerial::pair();
        let radio = RadioLink {
            master_side,
            node_side,
            loss_probability: loss_probability.clamp(0.0, 1.0),
            bytes_per_tick: bytes_per_tick.max(0.0),
            downlink_credit: 0.0,
            uplink_credit: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            stats: RadioStats::default(),
        };
        (radio, master_port, node_port)
    }

    /// Carry one tick's worth of bytes in each direction.
    pub fn pump(&mut self) {
        let ceiling = self.bytes_per_tick + 1.0;
        self.downlink_credit = (self.downlink_credit + self.bytes_per_tick).min(ceiling);
        self.uplink_credit = (self.uplink_credit + self.bytes_per_tick).min(ceiling);

        let mut credit = self.downlink_credit;
        Self::carry(
            Direction::Downlink,
            &mut self.master_side,
            &mut self.node_side,
            &mut credit,
            self.loss_probability,
            &mut self.rng,
            &mut self.stats.downlink,
        );
        self.downlink_credit = credit;

        let mut credit = self.uplink_credit;
        Self::carry(
            Direction::Uplink,
            &mut self.node_side,
            &mut self.master_side,
            &mut credit,
            self.loss_probability,
            &mut self.rng,
            &mut self.stats.uplink,
        );
        self.uplink_credit = credit;
    }

    fn carry(
        direction: Direction,
        from: &mut ChannelSerial,
        to: &mut ChannelSerial,
        credit: &mut f64,
        loss_probability: f64,
        rng: &mut ChaCha8Rng,
        stats: &mut DirectionStats,
    ) {
        while *credit >= 1.0 {
            let Some(byte) = from.read_byte() else {
                // Idle air does not bank bandwidth.
                *credit = credit.min(1.0);
                return;
            };
            *credit -= 1.0;

            if loss_probability > 0.0 && rng.gen_bool(loss_probability) {
                stats.dropped += 1;
                metrics::counter!(
                    metric_defs::SIM_BYTES_DROPPED.name,
                    metric_defs::DIRECTION_LABEL => direction.as_str()
                )
                .increment(1);
                trace!("RadioLink: {} byte 0x{:02X} lost", direction.as_str(), byte);
                continue;
            }
            if to.write(&[byte]).is_ok() {
                stats.delivered += 1;
            }
        }
    }

    /// Put `bytes` straight into the receiving station's port, as interference
    /// picked up by its radio would. Not subject to loss or the rate limit.
    pub fn inject(&mut self, direction: Direction, bytes: &[u8]) {
        let to = match direction {
            Direction::Downlink => &mut self.node_side,
            Direction::Uplink => &mut self.master_side,
        };
        if to.write(bytes).is_ok() {
            trace!("RadioLink: {} bytes injected {}", bytes.len(), direction.as_str());
        }
    }

    /// Byte counters so far.
    pub fn stats(&self) -> RadioStats {
        self.stats
    }

    /// Bytes waiting to cross in the given direction.
    pub fn in_flight(&self, direction: Direction) -> usize {
        match direction {
            Direction::Downlink => self.master_side.available(),
            Direction::Uplink => self.node_side.available(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lossless_delivery_is_rate_limited() {
        let (mut radio, mut master, mut node) = RadioLink::new(0.0, 4.0, 1);
        master.write(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]).unwrap();

        radio.pump();
        assert_eq!(node.available(), 4);
        radio.pump();
        radio.pump();
        assert_eq!(node.drain(), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
        assert_eq!(radio.stats().downlink.delivered, 11);
        assert_eq!(radio.stats().uplink, DirectionStats::default());
    }

    #[test]
    fn test_fractional_rate_accumulates() {
        let (mut radio, mut master, node) = RadioLink::new(0.0, 0.5, 1);
        master.write(&[9, 9, 9]).unwrap();

        radio.pump();
        assert_eq!(node.available(), 0);
        radio.pump();
        assert_eq!(node.available(), 1);
        radio.pump();
        radio.pump();
        assert_eq!(node.available(), 2);
    }

    #[test]
    fn test_uplink_carries_node_bytes() {
        let (mut radio, mut master, mut node) = RadioLink::new(0.0, 10.0, 1);
        node.write(&[0xBB, 1, 2, 3, 4, 5]).unwrap();
        radio.pump();
        assert_eq!(master.drain(), vec![0xBB, 1, 2, 3, 4, 5]);
        assert_eq!(radio.in_flight(Direction::Uplink), 0);
    }

    #[test]
    fn test_injected_bytes_bypass_loss() {
        let (mut radio, mut master, mut node) = RadioLink::new(1.0, 1.0, 5);
        radio.inject(Direction::Uplink, &[1, 2, 3]);
        radio.inject(Direction::Downlink, &[4]);
        assert_eq!(master.drain(), vec![1, 2, 3]);
        assert_eq!(node.drain(), vec![4]);
        assert_eq!(radio.stats(), RadioStats::default());
    }

    #[test]
    fn test_total_loss_drops_everything() {
        let (mut radio, mut master, node) = RadioLink::new(1.0, 100.0, 3);
        master.write(&[0xAA; 11]).unwrap();
        radio.pump();
        assert_eq!(node.available(), 0);
        assert_eq!(radio.stats().downlink.dropped, 11);
    }

    #[test]
    fn test_same_seed_drops_same_bytes() {
        let run = |seed| {
            let (mut radio, mut master, mut node) = RadioLink::new(0.3, 100.0, seed);
            master.write(&(0..64).collect::<Vec<u8>>()).unwrap();
            radio.pump();
            node.drain()
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42).len(), 64);
    }
}
