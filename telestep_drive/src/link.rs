//! Link receiver: polls the transceiver and classifies the result.
//!
//! The receiver is the only component that touches the radio. Each
//! cycle it answers exactly one question for the gate: did a
//! well-formed command datagram arrive since the last poll? Everything
//! that can go wrong on the link (nothing pending, mis-sized payloads,
//! hardware faults) collapses into the non-datagram outcomes, so the
//! gate never needs to understand radio failure modes.

use bitflags::bitflags;
use tracing::{debug, error, warn};

use telestep_common::command::WIRE_LEN;
use telestep_common::consts::MAX_DATAGRAM_LEN;
use telestep_common::link::{LinkError, PipeAddress, Transceiver};

bitflags! {
    /// Latched link fault flags.
    ///
    /// Faults are sticky: once a transceiver call has failed, the
    /// receiver stops trusting the hardware and reports every later
    /// poll as empty, which holds the drive quiescent until restart.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LinkFaults: u8 {
        /// `datagram_available()` returned an error.
        const AVAILABILITY = 0x01;
        /// `read_datagram()` returned an error.
        const READ         = 0x02;
    }
}

impl Default for LinkFaults {
    fn default() -> Self {
        LinkFaults::empty()
    }
}

/// Result of one link poll, in gate terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A well-formed command datagram was consumed.
    Datagram([u8; WIRE_LEN]),
    /// Nothing usable arrived. Covers an idle link and a faulted one.
    Empty,
    /// A datagram arrived but its length is not `WIRE_LEN`.
    /// It has been consumed and discarded.
    Malformed { len: usize },
}

/// Per-receiver poll counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub polls: u64,
    pub datagrams: u64,
    pub empty: u64,
    pub malformed: u64,
}

/// Owns a [`Transceiver`] and turns its receive side into
/// [`PollOutcome`]s.
pub struct LinkReceiver<T: Transceiver> {
    transceiver: T,
    faults: LinkFaults,
    stats: LinkStats,
}

impl<T: Transceiver> LinkReceiver<T> {
    /// Opens the receive pipe on `address` and starts listening.
    pub fn open(mut transceiver: T, address: &PipeAddress) -> Result<Self, LinkError> {
        transceiver.open_receive_pipe(address)?;
        transceiver.start_receiving()?;
        debug!(%address, "receive pipe open, listening");
        Ok(Self {
            transceiver,
            faults: LinkFaults::empty(),
            stats: LinkStats::default(),
        })
    }

    /// Polls the link once. Never blocks, never fails: hardware errors
    /// latch a fault flag and surface as [`PollOutcome::Empty`].
    pub fn poll(&mut self) -> PollOutcome {
        self.stats.polls += 1;

        if !self.faults.is_empty() {
            // Latched out. The transceiver is not consulted again.
            self.stats.empty += 1;
            return PollOutcome::Empty;
        }

        let available = match self.transceiver.datagram_available() {
            Ok(available) => available,
            Err(e) => {
                self.latch(LinkFaults::AVAILABILITY, &e);
                self.stats.empty += 1;
                return PollOutcome::Empty;
            }
        };
        if !available {
            self.stats.empty += 1;
            return PollOutcome::Empty;
        }

        let mut buf = [0u8; MAX_DATAGRAM_LEN];
        let len = match self.transceiver.read_datagram(&mut buf) {
            Ok(len) => len,
            Err(e) => {
                self.latch(LinkFaults::READ, &e);
                self.stats.empty += 1;
                return PollOutcome::Empty;
            }
        };

        if len != WIRE_LEN {
            self.stats.malformed += 1;
            warn!(len, expected = WIRE_LEN, "discarding mis-sized datagram");
            return PollOutcome::Malformed { len };
        }

        self.stats.datagrams += 1;
        let mut datagram = [0u8; WIRE_LEN];
        datagram.copy_from_slice(&buf[..WIRE_LEN]);
        PollOutcome::Datagram(datagram)
    }

    fn latch(&mut self, flag: LinkFaults, error: &LinkError) {
        error!(%error, ?flag, "transceiver fault latched, holding link empty");
        self.faults.insert(flag);
    }

    pub const fn faults(&self) -> LinkFaults {
        self.faults
    }

    pub const fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Direct access to the backend, for test rigs that inject
    /// datagrams mid-run.
    pub fn transceiver_mut(&mut self) -> &mut T {
        &mut self.transceiver
    }
}
