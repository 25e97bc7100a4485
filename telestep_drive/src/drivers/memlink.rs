//! In-memory transceiver backend.
//!
//! `MemoryLink` stands in for the radio during development and in the
//! test rig. Datagrams are staged with [`MemoryLink::inject`] and come
//! back out through the `Transceiver` receive interface in arrival
//! order, with the same semantics a hardware RX FIFO would give:
//! bounded depth, oldest first, reads consume.

use heapless::Vec;

use telestep_common::consts::MAX_DATAGRAM_LEN;
use telestep_common::link::{LinkError, PipeAddress, Transceiver};

/// Buffered datagram capacity.
///
/// Real radio FIFOs hold three payloads; the in-memory link is deeper
/// so tests can stage a burst up front.
pub const QUEUE_DEPTH: usize = 8;

type Datagram = Vec<u8, MAX_DATAGRAM_LEN>;

/// Simulated radio link backed by a bounded FIFO.
#[derive(Debug, Default)]
pub struct MemoryLink {
    queue: Vec<Datagram, QUEUE_DEPTH>,
    address: Option<PipeAddress>,
    listening: bool,
    fail_next: Option<LinkError>,
}

impl MemoryLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `payload` as if it had just arrived over the air.
    ///
    /// Returns `false` when the payload exceeds [`MAX_DATAGRAM_LEN`]
    /// (such a datagram cannot exist on the air) or when the queue is
    /// full (the FIFO drops new arrivals, not old ones).
    pub fn inject(&mut self, payload: &[u8]) -> bool {
        let Ok(datagram) = Datagram::from_slice(payload) else {
            return false;
        };
        self.queue.push(datagram).is_ok()
    }

    /// Makes the next `Transceiver` call fail with `error`. One-shot.
    pub fn fail_next(&mut self, error: LinkError) {
        self.fail_next = Some(error);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub const fn address(&self) -> Option<PipeAddress> {
        self.address
    }

    pub const fn is_listening(&self) -> bool {
        self.listening
    }
}

impl Transceiver for MemoryLink {
    fn open_receive_pipe(&mut self, address: &PipeAddress) -> Result<(), LinkError> {
        self.address = Some(*address);
        Ok(())
    }

    fn start_receiving(&mut self) -> Result<(), LinkError> {
        if self.address.is_none() {
            return Err(LinkError::NotOpen);
        }
        self.listening = true;
        Ok(())
    }

    fn datagram_available(&mut self) -> Result<bool, LinkError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        if !self.listening {
            return Err(LinkError::NotListening);
        }
        Ok(!self.queue.is_empty())
    }

    fn read_datagram(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        if !self.listening {
            return Err(LinkError::NotListening);
        }
        if self.queue.is_empty() {
            return Ok(0);
        }
        let datagram = self.queue.remove(0);
        let n = datagram.len().min(buf.len());
        buf[..n].copy_from_slice(&datagram[..n]);
        Ok(datagram.len())
    }
}
