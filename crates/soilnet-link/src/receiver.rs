//! Non-blocking frame receiver.
//!
//! Frames arrive over a slow radio link while the device has other per-tick
//! work to do, so the receiver never waits: every call to
//! [`FrameReceiver::poll`] moves at most one byte from the serial port into
//! the receive buffer. A frame is complete once exactly `N` bytes have been
//! gathered.
//!
//! There is no timeout and no resynchronization. A stalled partial frame
//! stays parked until more bytes arrive, and those bytes are taken as its
//! continuation. Completion is decided by byte count alone; the sentinel is
//! never checked here.

use log::trace;

use crate::fields::FieldSet;
use crate::frame::Frame;
use crate::serial::SerialPort;

/// Progress of the frame currently being received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveState {
    /// No byte of a new frame has arrived yet.
    Empty,
    /// `n` bytes of the current frame are buffered (`0 < n < N`).
    Accumulating(usize),
    /// The last poll filled the frame; its fields are ready to decode.
    Complete,
}

impl ReceiveState {
    /// Number of bytes of the in-progress frame gathered so far.
    pub fn cursor(&self) -> usize {
        match self {
            ReceiveState::Accumulating(n) => *n,
            ReceiveState::Empty | ReceiveState::Complete => 0,
        }
    }
}

/// Byte-at-a-time accumulator for frames of field set `F`.
#[derive(Debug, Clone)]
pub struct FrameReceiver<F: FieldSet, const N: usize> {
    buffer: Frame<F, N>,
    state: ReceiveState,
    bytes_received: u64,
    frames_received: u64,
}

impl<F: FieldSet, const N: usize> FrameReceiver<F, N> {
    /// Create an empty receiver.
    pub fn new() -> Self {
        FrameReceiver {
            buffer: Frame::zeroed(),
            state: ReceiveState::Empty,
            bytes_received: 0,
            frames_received: 0,
        }
    }

    /// Take at most one byte from `port`.
    ///
    /// Returns `true` exactly on the call that stores the frame's last byte,
    /// at which point the cursor is already back at zero.
    pub fn poll<S: SerialPort + ?Sized>(&mut self, port: &mut S) -> bool {
        if port.available() == 0 {
            return false;
        }
        let Some(byte) = port.read_byte() else {
            return false;
        };

        let cursor = self.state.cursor();
        self.buffer.store(cursor, byte);
        self.bytes_received += 1;

        let cursor = cursor + 1;
        if cursor == N {
            self.state = ReceiveState::Complete;
            self.frames_received += 1;
            trace!("rx frame complete: {:?}", self.buffer);
            true
        } else {
            self.state = ReceiveState::Accumulating(cursor);
            false
        }
    }

    /// Raw value of `field` in the receive buffer.
    ///
    /// Only meaningful right after [`poll`](Self::poll) returned `true`;
    /// otherwise it may mix bytes of the previous and the in-progress frame.
    pub fn decode(&self, field: F) -> u8 {
        self.buffer.decode(field)
    }

    /// Current receive state.
    pub fn state(&self) -> ReceiveState {
        self.state
    }

    /// Bytes gathered toward the current frame.
    pub fn cursor(&self) -> usize {
        self.state.cursor()
    }

    /// The receive buffer as it stands.
    pub fn frame(&self) -> &Frame<F, N> {
        &self.buffer
    }

    /// Total bytes taken from the port.
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Total frames completed.
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }
}

impl<F: FieldSet, const N: usize> Default for FrameReceiver<F, N> {
    fn default() -> Self {
        Self::new()
    }
}
