//! Link error types.

use thiserror::Error;

/// Errors raised when inspecting frames outside the receive path.
///
/// The receiver itself never produces these: it reports completion by byte
/// count alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Byte slice does not have the frame's fixed length.
    #[error("frame length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Fixed frame length.
        expected: usize,
        /// Length of the offered slice.
        actual: usize,
    },

    /// Offset 0 does not hold the expected sentinel.
    #[error("unexpected sentinel: expected 0x{expected:02X}, got 0x{actual:02X}")]
    BadSentinel {
        /// Sentinel for this frame direction.
        expected: u8,
        /// Byte found at offset 0.
        actual: u8,
    },
}

/// Errors reported by a [`crate::SerialPort`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// The far end of the port has gone away.
    #[error("serial port disconnected")]
    Disconnected,

    /// The underlying transport failed.
    #[error("serial I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SerialError {
    fn from(err: std::io::Error) -> Self {
        SerialError::Io(err.to_string())
    }
}

/// Result type alias for frame inspection.
pub type LinkResult<T> = Result<T, LinkError>;
