//! Fixed-length frames and the field encoder/decoder.
//!
//! Every frame has the same shape, only the length and sentinel differ per
//! direction:
//!
//! ```text
//! +----------+---------+---------+-----+-----------+
//! | sentinel | field 0 | field 1 | ... | field n-1 |
//! +----------+---------+---------+-----+-----------+
//!   offset 0   offset 1  offset 2        offset n
//! ```
//!
//! Each field is one raw byte. There is no length prefix and no checksum.

use std::marker::PhantomData;

use crate::constants::*;
use crate::error::{LinkError, LinkResult};
use crate::fields::{AckField, FieldSet, QueryField};

/// A fixed-length frame carrying the field set `F`.
///
/// `N` must equal `F::COUNT + 1`; this is checked when the frame is built.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame<F: FieldSet, const N: usize> {
    bytes: [u8; N],
    _fields: PhantomData<F>,
}

/// Master→Node frame (11 bytes).
pub type QueryFrame = Frame<QueryField, QUERY_FRAME_LEN>;
/// Node→Master frame (6 bytes).
pub type AckFrame = Frame<AckField, ACK_FRAME_LEN>;

impl<F: FieldSet, const N: usize> Frame<F, N> {
    const LAYOUT_OK: () = assert!(N == F::COUNT + 1, "frame length must be field count + 1");

    /// Frame length in bytes.
    pub const LEN: usize = N;

    /// Create a frame holding the sentinel and all-zero fields.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::LAYOUT_OK;
        let mut bytes = [0u8; N];
        bytes[SENTINEL_OFFSET] = F::SENTINEL;
        Frame {
            bytes,
            _fields: PhantomData,
        }
    }

    /// Create an all-zero frame, sentinel included.
    ///
    /// Used for receive buffers, which are filled byte by byte.
    pub fn zeroed() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::LAYOUT_OK;
        Frame {
            bytes: [0u8; N],
            _fields: PhantomData,
        }
    }

    /// Build a frame from raw bytes, checking length and sentinel.
    pub fn from_bytes(data: &[u8]) -> LinkResult<Self> {
        if data.len() != N {
            return Err(LinkError::LengthMismatch {
                expected: N,
                actual: data.len(),
            });
        }
        if data[SENTINEL_OFFSET] != F::SENTINEL {
            return Err(LinkError::BadSentinel {
                expected: F::SENTINEL,
                actual: data[SENTINEL_OFFSET],
            });
        }
        let mut frame = Self::zeroed();
        frame.bytes.copy_from_slice(data);
        Ok(frame)
    }

    /// Write `value` into the slot for `field`. The last write wins.
    pub fn encode(&mut self, value: u8, field: F) {
        self.bytes[field.offset()] = value;
    }

    /// Read the raw byte in the slot for `field`.
    pub fn decode(&self, field: F) -> u8 {
        self.bytes[field.offset()]
    }

    /// The byte at offset 0.
    pub fn sentinel(&self) -> u8 {
        self.bytes[SENTINEL_OFFSET]
    }

    /// Whether offset 0 holds the sentinel expected for this field set.
    pub fn sentinel_matches(&self) -> bool {
        self.sentinel() == F::SENTINEL
    }

    /// The whole frame, sentinel first.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Store one received byte at `offset`.
    pub(crate) fn store(&mut self, offset: usize, byte: u8) {
        self.bytes[offset] = byte;
    }

    /// Clear all fields back to zero, keeping the sentinel.
    pub fn reset(&mut self) {
        self.bytes[SENTINEL_OFFSET + 1..].fill(0);
        self.bytes[SENTINEL_OFFSET] = F::SENTINEL;
    }
}

impl<F: FieldSet, const N: usize> Default for Frame<F, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FieldSet, const N: usize> AsRef<[u8]> for Frame<F, N> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<F: FieldSet, const N: usize> std::fmt::Debug for Frame<F, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame[")?;
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_has_sentinel_and_zero_fields() {
        let frame = QueryFrame::new();
        assert_eq!(frame.as_bytes().len(), 11);
        assert_eq!(frame.sentinel(), QUERY);
        assert!(frame.as_bytes()[1..].iter().all(|&b| b == 0));

        let frame = AckFrame::new();
        assert_eq!(frame.as_bytes().len(), 6);
        assert_eq!(frame.sentinel(), ACK);
    }

    #[test]
    fn test_encode_places_value_at_offset() {
        let mut frame = QueryFrame::new();
        frame.encode(20, QueryField::MinMoisture);
        frame.encode(80, QueryField::MaxMoisture);
        frame.encode(1, QueryField::IrrigationCommand);

        assert_eq!(
            frame.as_bytes(),
            &[0xAA, 20, 80, 0, 0, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_last_write_wins() {
        let mut frame = AckFrame::new();
        frame.encode(10, AckField::Moisture);
        frame.encode(11, AckField::Moisture);
        frame.encode(12, AckField::Moisture);
        assert_eq!(frame.decode(AckField::Moisture), 12);
    }

    #[test]
    fn test_encode_never_touches_sentinel() {
        let mut frame = AckFrame::new();
        for &field in AckField::ALL {
            frame.encode(0xFF, field);
        }
        assert_eq!(frame.sentinel(), ACK);
    }

    #[test]
    fn test_from_bytes_checks_length_and_sentinel() {
        let err = AckFrame::from_bytes(&[0xBB, 1, 2]).unwrap_err();
        assert_eq!(err, LinkError::LengthMismatch { expected: 6, actual: 3 });

        let err = AckFrame::from_bytes(&[0xAA, 1, 2, 3, 4, 5]).unwrap_err();
        assert_eq!(err, LinkError::BadSentinel { expected: 0xBB, actual: 0xAA });

        let frame = AckFrame::from_bytes(&[0xBB, 1, 2, 3, 4, 5]).expect("valid frame");
        assert_eq!(frame.decode(AckField::WaterLevel), 4);
    }

    #[test]
    fn test_reset_restores_sentinel() {
        let mut frame = QueryFrame::zeroed();
        assert!(!frame.sentinel_matches());
        frame.store(3, 9);
        frame.reset();
        assert!(frame.sentinel_matches());
        assert_eq!(frame.decode(QueryField::MinIrrigationTime), 0);
    }

    #[test]
    fn test_debug_is_hex() {
        let frame = AckFrame::new();
        assert_eq!(format!("{:?}", frame), "Frame[BB 00 00 00 00 00]");
    }
}
