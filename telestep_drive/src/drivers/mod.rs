//! Backend implementations of the capability traits.
//!
//! This module contains the simulation backends the drive runs and
//! tests against:
//!
//! - [`memlink`] - In-memory `Transceiver` with datagram injection
//! - [`softstep`] - Software `MotionProfile` with ramp physics
//! - [`pin`] - Recording `EnableLine`
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the matching trait from `telestep_common`
//! 3. Wire it up where the drive node is assembled in `main.rs`
//!
//! A real radio backend implements `Transceiver` over SPI, a real
//! stepper backend implements `MotionProfile` over step/dir pins, and
//! neither requires touching the drive loop.

pub mod memlink;
pub mod pin;
pub mod softstep;
