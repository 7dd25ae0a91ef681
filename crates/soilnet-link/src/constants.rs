//! Protocol constants
//!
//! Sentinels and frame lengths for both directions of the link. The field
//! offsets themselves live on the field enumerations in [`crate::fields`].

// ============================================================================
// Sentinels (offset 0 of every frame)
// ============================================================================

/// Sentinel of a frame originating at the Master (query).
pub const QUERY: u8 = 0xAA;
/// Sentinel of a frame originating at the Node (acknowledgment).
pub const ACK: u8 = 0xBB;

/// Offset of the sentinel byte within a frame.
pub const SENTINEL_OFFSET: usize = 0;

// ============================================================================
// Field Counts
// ============================================================================

/// Number of data fields in a Master→Node query frame.
pub const QUERY_FIELD_COUNT: usize = 10;
/// Number of data fields in a Node→Master ack frame.
pub const ACK_FIELD_COUNT: usize = 5;

// ============================================================================
// Frame Lengths
// ============================================================================

/// Length of a Master→Node frame: sentinel + 10 fields.
pub const QUERY_FRAME_LEN: usize = QUERY_FIELD_COUNT + 1;
/// Length of a Node→Master frame: sentinel + 5 fields.
pub const ACK_FRAME_LEN: usize = ACK_FIELD_COUNT + 1;

// ============================================================================
// Link Defaults
// ============================================================================

/// Default baud rate of the HC-12 serial interface.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
