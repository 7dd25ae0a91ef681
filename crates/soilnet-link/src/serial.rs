//! Serial channel abstraction.
//!
//! The link only needs three capabilities from its transport: how many bytes
//! are buffered, read one of them, and write a run of bytes. Anything that
//! provides those (a hardware UART, a software-driven port, an in-memory
//! channel) can carry the protocol.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::error::SerialError;

/// Minimal duplex byte transport.
pub trait SerialPort {
    /// Number of received bytes waiting to be read.
    fn available(&self) -> usize;

    /// Read one buffered byte. Returns `None` without waiting if none is buffered.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue bytes for transmission, in order.
    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError>;
}

impl<T: SerialPort + ?Sized> SerialPort for &mut T {
    fn available(&self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        (**self).write(bytes)
    }
}

impl<T: SerialPort + ?Sized> SerialPort for Box<T> {
    fn available(&self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        (**self).write(bytes)
    }
}

/// One end of an in-memory duplex serial line.
///
/// Bytes written on one end become available on the other. Both directions
/// are unbounded, so a write never waits for the reader to drain.
#[derive(Debug, Clone)]
pub struct ChannelSerial {
    tx: Sender<u8>,
    rx: Receiver<u8>,
}

impl ChannelSerial {
    /// Create a connected pair of ports.
    pub fn pair() -> (ChannelSerial, ChannelSerial) {
        let (a_tx, b_rx) = crossbeam_channel::unbounded();
        let (b_tx, a_rx) = crossbeam_channel::unbounded();
        (
            ChannelSerial { tx: a_tx, rx: a_rx },
            ChannelSerial { tx: b_tx, rx: b_rx },
        )
    }

    /// Drain every byte currently buffered on this end.
    pub fn drain(&mut self) -> Vec<u8> {
        self.rx.try_iter().collect()
    }
}

impl SerialPort for ChannelSerial {
    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        match self.rx.try_recv() {
            Ok(byte) => Some(byte),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        for &byte in bytes {
            self.tx.send(byte).map_err(|_| SerialError::Disconnected)?;
        }
        Ok(())
    }
}
