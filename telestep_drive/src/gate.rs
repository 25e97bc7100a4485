//! Fail-safe gate: decides what the hardware does this cycle.
//!
//! The gate is a pure function from one poll outcome to one decision.
//! It keeps no state between cycles on purpose: receiving nothing must
//! always mean "quiescent now", not "quiescent after some timeout",
//! and a single good datagram must always restore active drive. Any
//! memory here would soften one of those two guarantees.

use telestep_common::command::DriveCommand;

use crate::link::PollOutcome;

/// Whether the drive follows commands this cycle or holds safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// A well-formed command arrived; execute it.
    Active,
    /// Nothing usable arrived; hold the quiescent state.
    Quiescent,
}

/// One cycle's dispatch decision.
///
/// `command` is always populated. In the quiescent state it is
/// [`DriveCommand::QUIESCENT`], so downstream consumers run the same
/// dispatch path in both states instead of branching on `state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    pub state: GateState,
    pub command: DriveCommand,
}

/// Resolves one poll outcome into this cycle's decision.
///
/// Malformed datagrams are treated exactly like silence: the sender is
/// either foreign or out of protocol sync, and guessing at its intent
/// is worse than stopping.
pub fn resolve(outcome: &PollOutcome) -> GateDecision {
    match outcome {
        PollOutcome::Datagram(bytes) => GateDecision {
            state: GateState::Active,
            command: DriveCommand::from_wire(bytes),
        },
        PollOutcome::Empty | PollOutcome::Malformed { .. } => GateDecision {
            state: GateState::Quiescent,
            command: DriveCommand::QUIESCENT,
        },
    }
}
