//! SoilNet HC-12 Link Protocol
//!
//! This crate implements the fixed-frame binary protocol spoken between the
//! irrigation coordinator ("Master") and a remote field unit ("Node") over a
//! half-duplex HC-12 radio serial link.
//!
//! # Protocol Overview
//!
//! Every message is a fixed-length frame. Byte 0 is a sentinel naming the
//! origin of the frame and every following byte holds exactly one field:
//!
//! - **Query** (Master → Node): `0xAA` + 10 fields, 11 bytes
//! - **Ack** (Node → Master): `0xBB` + 5 fields, 6 bytes
//!
//! Fields carry no tag. Their position is fixed by the ordinal of the field
//! identifier, which both roles share.
//!
//! Frames are received one byte per call so reception can be interleaved
//! with the rest of a device's control loop. There is no checksum and no
//! resynchronization: a lost byte shifts every later frame boundary.
//!
//! # Example
//!
//! ```rust
//! use soilnet_link::{AckField, ChannelSerial, Master, Node, QueryField};
//!
//! let (master_port, node_port) = ChannelSerial::pair();
//! let mut master = Master::new(master_port);
//! let mut node = Node::new(node_port);
//!
//! master.encode(20, QueryField::MinMoisture);
//! master.transmit();
//!
//! while !node.poll() {}
//! assert_eq!(node.decode(QueryField::MinMoisture), 20);
//!
//! node.encode(55, AckField::Moisture);
//! node.transmit();
//! while !master.poll() {}
//! assert_eq!(master.decode(AckField::Moisture), 55);
//! ```

mod constants;
mod endpoint;
mod error;
mod fields;
mod frame;
mod receiver;
mod serial;

pub use constants::*;
pub use endpoint::*;
pub use error::*;
pub use fields::*;
pub use frame::*;
pub use receiver::*;
pub use serial::*;
