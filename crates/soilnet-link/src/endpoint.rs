//! Role-specific endpoints.
//!
//! Master and Node run the same encode/transmit/receive/decode algorithm and
//! differ only in which field set they send and which they expect back:
//!
//! | Role   | Sends        | Tx len | Receives     | Rx len |
//! |--------|--------------|--------|--------------|--------|
//! | Master | `QueryField` | 11     | `AckField`   | 6      |
//! | Node   | `AckField`   | 6      | `QueryField` | 11     |
//!
//! The sentinels follow from the field sets, so both roles are plain type
//! aliases of one generic [`Endpoint`].

use log::{trace, warn};

use crate::constants::*;
use crate::fields::{AckField, FieldSet, QueryField};
use crate::frame::Frame;
use crate::receiver::{FrameReceiver, ReceiveState};
use crate::serial::SerialPort;

/// Counters kept by an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Frames handed to the serial port.
    pub frames_sent: u64,
    /// Transmissions the serial port rejected.
    pub write_failures: u64,
    /// Bytes taken from the serial port.
    pub bytes_received: u64,
    /// Frames completed by the receiver.
    pub frames_received: u64,
    /// Completed frames whose first byte was not the expected sentinel.
    pub sentinel_mismatches: u64,
}

/// One side of the link: an outbound frame, an inbound receiver, and the
/// serial port they share.
///
/// Both buffers are owned for the endpoint's whole lifetime and rewritten in
/// place on every cycle.
#[derive(Debug)]
pub struct Endpoint<S, Tx, Rx, const TX_LEN: usize, const RX_LEN: usize>
where
    S: SerialPort,
    Tx: FieldSet,
    Rx: FieldSet,
{
    serial: S,
    tx: Frame<Tx, TX_LEN>,
    rx: FrameReceiver<Rx, RX_LEN>,
    frames_sent: u64,
    write_failures: u64,
    sentinel_mismatches: u64,
}

/// The coordinator: sends queries, receives acknowledgments.
pub type Master<S> = Endpoint<S, QueryField, AckField, QUERY_FRAME_LEN, ACK_FRAME_LEN>;

/// The field unit: sends acknowledgments, receives queries.
pub type Node<S> = Endpoint<S, AckField, QueryField, ACK_FRAME_LEN, QUERY_FRAME_LEN>;

impl<S, Tx, Rx, const TX_LEN: usize, const RX_LEN: usize> Endpoint<S, Tx, Rx, TX_LEN, RX_LEN>
where
    S: SerialPort,
    Tx: FieldSet,
    Rx: FieldSet,
{
    /// Create an endpoint over `serial`.
    pub fn new(serial: S) -> Self {
        Endpoint {
            serial,
            tx: Frame::new(),
            rx: FrameReceiver::new(),
            frames_sent: 0,
            write_failures: 0,
            sentinel_mismatches: 0,
        }
    }

    /// Sentinel written at offset 0 of every outbound frame.
    pub const fn outbound_sentinel() -> u8 {
        Tx::SENTINEL
    }

    /// Sentinel inbound frames are expected to start with.
    pub const fn expected_inbound_sentinel() -> u8 {
        Rx::SENTINEL
    }

    // ========================================================================
    // Transmit
    // ========================================================================

    /// Write `value` into the outbound slot for `field`.
    pub fn encode(&mut self, value: u8, field: Tx) {
        self.tx.encode(value, field);
    }

    /// Send the whole outbound frame, sentinel first.
    ///
    /// Fire-and-forget: a failing port is logged and counted, never reported.
    pub fn transmit(&mut self) {
        match self.serial.write(self.tx.as_bytes()) {
            Ok(()) => {
                self.frames_sent += 1;
                trace!("tx frame: {:?}", self.tx);
            }
            Err(e) => {
                self.write_failures += 1;
                warn!("tx frame dropped: {}", e);
            }
        }
    }

    /// Clear every outbound field back to zero.
    pub fn clear_outbound(&mut self) {
        self.tx.reset();
    }

    // ========================================================================
    // Receive
    // ========================================================================

    /// Pull at most one byte from the serial port.
    ///
    /// Returns `true` on the call that completes an inbound frame.
    pub fn poll(&mut self) -> bool {
        let complete = self.rx.poll(&mut self.serial);
        if complete && !self.rx.frame().sentinel_matches() {
            self.sentinel_mismatches += 1;
            trace!(
                "rx frame complete with sentinel 0x{:02X}, expected 0x{:02X}",
                self.rx.frame().sentinel(),
                Rx::SENTINEL
            );
        }
        complete
    }

    /// Alias of [`poll`](Self::poll) matching the device API name.
    pub fn received(&mut self) -> bool {
        self.poll()
    }

    /// Raw inbound value of `field`.
    ///
    /// Valid only directly after [`poll`](Self::poll) returned `true`.
    pub fn decode(&self, field: Rx) -> u8 {
        self.rx.decode(field)
    }

    /// Whether the last completed frame started with the expected sentinel.
    ///
    /// Completion never depends on this; it only reports what arrived.
    pub fn rx_sentinel_matches(&self) -> bool {
        self.rx.frame().sentinel_matches()
    }

    /// Current receive state.
    pub fn receive_state(&self) -> ReceiveState {
        self.rx.state()
    }

    /// Bytes gathered toward the current inbound frame.
    pub fn cursor(&self) -> usize {
        self.rx.cursor()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The outbound frame as it stands.
    pub fn tx_frame(&self) -> &Frame<Tx, TX_LEN> {
        &self.tx
    }

    /// The inbound buffer as it stands.
    pub fn rx_frame(&self) -> &Frame<Rx, RX_LEN> {
        self.rx.frame()
    }

    /// Snapshot of the endpoint's counters.
    pub fn stats(&self) -> LinkStats {
        LinkStats {
            frames_sent: self.frames_sent,
            write_failures: self.write_failures,
            bytes_received: self.rx.bytes_received(),
            frames_received: self.rx.frames_received(),
            sentinel_mismatches: self.sentinel_mismatches,
        }
    }

    /// Borrow the serial port.
    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Mutably borrow the serial port.
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Give back the serial port.
    pub fn into_serial(self) -> S {
        self.serial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SerialError;
    use crate::serial::ChannelSerial;

    /// A port whose writes always fail.
    struct BrokenPort;

    impl SerialPort for BrokenPort {
        fn available(&self) -> usize {
            0
        }

        fn read_byte(&mut self) -> Option<u8> {
            None
        }

        fn write(&mut self, _bytes: &[u8]) -> Result<(), SerialError> {
            Err(SerialError::Io("radio unplugged".to_string()))
        }
    }

    #[test]
    fn test_sentinels_per_role() {
        assert_eq!(Master::<ChannelSerial>::outbound_sentinel(), 0xAA);
        assert_eq!(Master::<ChannelSerial>::expected_inbound_sentinel(), 0xBB);
        assert_eq!(Node::<ChannelSerial>::outbound_sentinel(), 0xBB);
        assert_eq!(Node::<ChannelSerial>::expected_inbound_sentinel(), 0xAA);
    }

    #[test]
    fn test_transmit_writes_whole_frame_in_order() {
        let (port, mut peer) = ChannelSerial::pair();
        let mut master = Master::new(port);
        master.encode(7, QueryField::CurrentHour);
        master.transmit();

        assert_eq!(peer.drain(), vec![0xAA, 0, 0, 0, 0, 7, 0, 0, 0, 0, 0]);
        assert_eq!(master.stats().frames_sent, 1);
    }

    #[test]
    fn test_transmit_twice_without_draining() {
        let (port, mut peer) = ChannelSerial::pair();
        let mut node = Node::new(port);
        node.encode(1, AckField::Moisture);
        node.transmit();
        node.encode(2, AckField::Moisture);
        node.transmit();

        assert_eq!(peer.drain(), vec![0xBB, 1, 0, 0, 0, 0, 0xBB, 2, 0, 0, 0, 0]);
    }

    #[test]
    fn test_transmit_failure_is_swallowed() {
        let mut master = Master::new(BrokenPort);
        master.transmit();
        master.transmit();

        let stats = master.stats();
        assert_eq!(stats.frames_sent, 0);
        assert_eq!(stats.write_failures, 2);
    }

    #[test]
    fn test_transmit_does_not_disturb_receive() {
        let (port, mut peer) = ChannelSerial::pair();
        let mut master = Master::new(port);

        peer.write(&[0xBB, 1, 2]).expect("write should succeed");
        for _ in 0..3 {
            assert!(!master.poll());
        }
        master.encode(55, QueryField::MinMoisture);
        master.transmit();
        assert_eq!(master.cursor(), 3);

        peer.write(&[3, 4, 5]).expect("write should succeed");
        assert!(!master.poll());
        assert!(!master.poll());
        assert!(master.poll());
        assert_eq!(master.decode(AckField::BatteryLevel), 5);
    }

    #[test]
    fn test_clear_outbound_keeps_sentinel() {
        let (port, _peer) = ChannelSerial::pair();
        let mut node = Node::new(port);
        node.encode(9, AckField::Humidity);
        node.clear_outbound();
        assert_eq!(node.tx_frame().as_bytes(), &[0xBB, 0, 0, 0, 0, 0]);
    }
}
