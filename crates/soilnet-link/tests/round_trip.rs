//! Cross-role behavior of the link: what one endpoint encodes, the paired
//! endpoint decodes, byte for byte and call for call.

use soilnet_link::{
    AckField, ChannelSerial, FieldSet, Master, Node, QueryField, ReceiveState, SerialPort,
    ACK_FRAME_LEN, QUERY_FRAME_LEN,
};

fn linked_pair() -> (Master<ChannelSerial>, Node<ChannelSerial>) {
    let (master_port, node_port) = ChannelSerial::pair();
    (Master::new(master_port), Node::new(node_port))
}

/// Poll until a frame completes, returning the 1-based call that completed it.
fn poll_until_complete<F: FnMut() -> bool>(mut poll: F, max_calls: usize) -> Option<usize> {
    (1..=max_calls).find(|_| poll())
}

// ============================================================================
// Round-trip Fidelity
// ============================================================================

#[test]
fn test_every_query_field_reaches_node() {
    let (mut master, mut node) = linked_pair();

    for (i, &field) in QueryField::ALL.iter().enumerate() {
        for value in [0u8, 1, 0x7F, 0xAA, 0xBB, 0xFF] {
            master.clear_outbound();
            master.encode(value, field);
            master.transmit();

            let call = poll_until_complete(|| node.poll(), QUERY_FRAME_LEN);
            assert_eq!(call, Some(QUERY_FRAME_LEN), "field {} value {}", i, value);
            assert_eq!(node.decode(field), value);
            for &other in QueryField::ALL.iter().filter(|&&f| f != field) {
                assert_eq!(node.decode(other), 0, "{} leaked into {}", field.name(), other.name());
            }
        }
    }
}

#[test]
fn test_every_ack_field_reaches_master() {
    let (mut master, mut node) = linked_pair();

    for &field in AckField::ALL {
        for value in [0u8, 42, 0xAA, 0xFF] {
            node.clear_outbound();
            node.encode(value, field);
            node.transmit();

            let call = poll_until_complete(|| master.poll(), ACK_FRAME_LEN);
            assert_eq!(call, Some(ACK_FRAME_LEN));
            assert_eq!(master.decode(field), value);
        }
    }
}

#[test]
fn test_only_last_encode_is_observed() {
    let (mut master, mut node) = linked_pair();

    master.encode(10, QueryField::ForecastHour);
    master.encode(11, QueryField::ForecastHour);
    master.encode(23, QueryField::ForecastHour);
    master.transmit();

    assert!(poll_until_complete(|| node.poll(), QUERY_FRAME_LEN).is_some());
    assert_eq!(node.decode(QueryField::ForecastHour), 23);
}

// ============================================================================
// Completion Signalling
// ============================================================================

#[test]
fn test_completion_fires_exactly_once_per_frame() {
    let (mut master, mut node) = linked_pair();

    for _ in 0..3 {
        master.transmit();
    }

    let results: Vec<bool> = (0..3 * QUERY_FRAME_LEN + 20).map(|_| node.poll()).collect();
    let completions: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, &done)| done)
        .map(|(i, _)| i + 1)
        .collect();

    assert_eq!(completions, vec![11, 22, 33]);
}

#[test]
fn test_short_stream_never_completes() {
    let (mut port, node_port) = ChannelSerial::pair();
    let mut node = Node::new(node_port);

    port.write(&[0xAA, 1, 2, 3, 4, 5, 6, 7, 8, 9]).expect("write should succeed");
    for _ in 0..1000 {
        assert!(!node.poll());
    }
    assert_eq!(node.receive_state(), ReceiveState::Accumulating(10));
}

// ============================================================================
// Exchanges
// ============================================================================

#[test]
fn test_master_sends_moisture_bounds() {
    let (mut master, mut node) = linked_pair();

    master.encode(20, QueryField::MinMoisture);
    master.encode(80, QueryField::MaxMoisture);
    master.transmit();
    assert_eq!(node.serial().available(), 11);

    for call in 1..=11 {
        let done = node.poll();
        assert_eq!(done, call == 11, "call {}", call);
    }
    assert_eq!(node.decode(QueryField::MinMoisture), 20);
    assert_eq!(node.decode(QueryField::MaxMoisture), 80);
    assert!(node.rx_sentinel_matches());
}

#[test]
fn test_node_sends_telemetry() {
    let (mut master, mut node) = linked_pair();

    node.encode(55, AckField::Moisture);
    node.encode(102, AckField::BatteryLevel);
    node.transmit();
    assert_eq!(master.serial().available(), 6);

    for call in 1..=6 {
        let done = master.poll();
        assert_eq!(done, call == 6, "call {}", call);
    }
    assert_eq!(master.decode(AckField::Moisture), 55);
    assert_eq!(master.decode(AckField::BatteryLevel), 102);
    assert_eq!(master.decode(AckField::Temperature), 0);
}

#[test]
fn test_bad_sentinel_still_completes() {
    // Completion is decided by byte count only. A frame that does not start
    // with the expected sentinel is still reported and decoded as if valid.
    let (mut port, master_port) = ChannelSerial::pair();
    let mut master = Master::new(master_port);

    port.write(&[0x13, 0x37, 0x00, 0xFF, 0x42, 0x99]).expect("write should succeed");
    let call = poll_until_complete(|| master.poll(), ACK_FRAME_LEN);

    assert_eq!(call, Some(ACK_FRAME_LEN));
    assert_eq!(master.decode(AckField::Moisture), 0x37);
    assert_eq!(master.decode(AckField::BatteryLevel), 0x99);

    // The mismatch is observable but changes nothing about reception.
    assert!(!master.rx_sentinel_matches());
    assert_eq!(master.stats().sentinel_mismatches, 1);
}

#[test]
fn test_dropped_byte_desynchronizes_following_frames() {
    let (mut master, mut node) = linked_pair();

    master.encode(1, QueryField::MinMoisture);
    master.encode(2, QueryField::MaxMoisture);
    master.encode(3, QueryField::MinIrrigationTime);

    // One frame loses its fourth byte on the way, two clean frames follow.
    let mut short = master.tx_frame().as_bytes().to_vec();
    short.remove(3);
    master.serial_mut().write(&short).expect("write should succeed");
    master.transmit();
    master.transmit();

    let call = poll_until_complete(|| node.poll(), QUERY_FRAME_LEN);
    assert_eq!(call, Some(QUERY_FRAME_LEN));
    // The next frame's sentinel was absorbed as the last field of the short one.
    assert_eq!(node.decode(QueryField::IrrigationCommand), 0xAA);
    assert!(node.rx_sentinel_matches());

    let call = poll_until_complete(|| node.poll(), QUERY_FRAME_LEN);
    assert_eq!(call, Some(QUERY_FRAME_LEN));
    assert!(!node.rx_sentinel_matches());
    assert_eq!(node.rx_frame().sentinel(), 1);
    assert_eq!(node.stats().sentinel_mismatches, 1);
}
