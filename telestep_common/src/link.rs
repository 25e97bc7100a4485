//! Radio link capability trait and addressing.
//!
//! This module defines:
//! - `Transceiver` trait - Interface for pluggable radio backends
//! - `PipeAddress` - Validated receive pipe address
//! - `LinkError` enum - Error types for link operations
//!
//! The drive loop never talks to a radio chip directly; it goes through
//! `Transceiver`, which lets the same loop run against real hardware or
//! against the in-memory link used by the test rig.

use std::str::FromStr;

use thiserror::Error;

use crate::consts::ADDRESS_LEN;

/// Error types for link operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The radio backend reported a hardware-level failure.
    #[error("link hardware fault: {0}")]
    Hardware(String),

    /// Receive was attempted before a pipe was opened.
    #[error("no receive pipe open")]
    NotOpen,

    /// Receive was attempted before listening was started.
    #[error("receiver is not listening")]
    NotListening,

    /// A pipe address had the wrong length.
    #[error("pipe address must be exactly {ADDRESS_LEN} bytes, got {0}")]
    AddressLength(usize),

    /// The all-zero pipe address is reserved and never assigned.
    #[error("the all-zero pipe address is reserved")]
    ReservedAddress,
}

// ─── Pipe Address ────────────────────────────────────────────────────

/// A validated `ADDRESS_LEN`-byte receive pipe address.
///
/// Both ends of the link must be configured with the same address.
/// Construction rejects the all-zero pattern, which the radio protocol
/// reserves and which typically indicates an uninitialised config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipeAddress([u8; ADDRESS_LEN]);

impl PipeAddress {
    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Result<Self, LinkError> {
        if bytes == [0u8; ADDRESS_LEN] {
            return Err(LinkError::ReservedAddress);
        }
        Ok(Self(bytes))
    }

    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl FromStr for PipeAddress {
    type Err = LinkError;

    /// Parses an address given as `ADDRESS_LEN` literal bytes,
    /// e.g. `"00001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; ADDRESS_LEN] = s
            .as_bytes()
            .try_into()
            .map_err(|_| LinkError::AddressLength(s.len()))?;
        Self::new(bytes)
    }
}

impl std::fmt::Display for PipeAddress {
    /// Prints printable ASCII bytes verbatim and everything else as
    /// `\xNN`, so `"00001"` logs as `00001`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &byte in &self.0 {
            if byte.is_ascii_graphic() {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02X}")?;
            }
        }
        Ok(())
    }
}

// ─── Transceiver Trait ───────────────────────────────────────────────

/// Trait defining the receive side of a radio backend.
///
/// # Lifecycle
///
/// 1. `open_receive_pipe()` - Called once with the configured address
/// 2. `start_receiving()` - Called once; the backend begins buffering
/// 3. `datagram_available()` / `read_datagram()` - Called every cycle
///
/// # Timing
///
/// `datagram_available()` and `read_datagram()` run inside the drive
/// cycle and must not block. Backends buffer internally (real radios do
/// this in their RX FIFO) and report what has already arrived.
pub trait Transceiver {
    /// Opens the receive pipe on `address`.
    fn open_receive_pipe(&mut self, address: &PipeAddress) -> Result<(), LinkError>;

    /// Switches the backend into receive mode. Datagrams arriving from
    /// this point on are buffered until read.
    fn start_receiving(&mut self) -> Result<(), LinkError>;

    /// Returns whether at least one buffered datagram is pending.
    ///
    /// Must not consume anything.
    fn datagram_available(&mut self) -> Result<bool, LinkError>;

    /// Consumes the oldest pending datagram.
    ///
    /// Copies up to `buf.len()` bytes and returns the datagram's true
    /// length, which may exceed the copied amount; excess bytes are
    /// discarded. With nothing pending, returns length zero.
    fn read_datagram(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;
}
