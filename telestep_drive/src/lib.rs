//! # Telestep Drive Library
//!
//! Receiver node of a wireless three-axis stepper rig. Consumes
//! command datagrams from a radio link, gates them through a fail-safe
//! decision every cycle, and drives three acceleration-limited step
//! generators plus an active-low drive-enable interlock.
//!
//! ## Safety Model
//!
//! The node is command-following only while commands actually arrive.
//! Every cycle without a well-formed datagram — link idle, sender
//! gone, garbage on the air, radio fault — dispatches the quiescent
//! state instead: all axes decelerating to standstill, power stage
//! disabled. There are no timeouts and no grace periods; silence is
//! safe by construction one cycle later.
//!
//! ## Module Structure
//!
//! - [`link`] - Polls the transceiver, classifies outcomes, latches faults
//! - [`gate`] - Pure fail-safe resolution from outcome to decision
//! - [`axis`] - Per-axis dispatch with velocity clamping
//! - [`interlock`] - Active-low global enable line
//! - [`cycle`] - Fixed-cadence loop, stats, RT setup
//! - [`drivers`] - Simulation backends for the capability traits

#![deny(clippy::disallowed_types)]

pub mod axis;
pub mod cycle;
pub mod drivers;
pub mod gate;
pub mod interlock;
pub mod link;
