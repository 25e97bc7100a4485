//! Telestep Common Library
//!
//! This crate provides the wire protocol, capability traits and
//! configuration types shared by telestep nodes. The transmitter and
//! the receiver must agree on the command layout and the link
//! constants, which is why they live here rather than in either
//! binary.
//!
//! # Module Structure
//!
//! - [`command`] - Drive command model and wire codec
//! - [`consts`] - Protocol and motion constants
//! - [`link`] - `Transceiver` trait and pipe addressing
//! - [`motion`] - `MotionProfile` trait for per-axis step generation
//! - [`io`] - `EnableLine` trait for the interlock output
//! - [`config`] - Configuration loading and validation
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use telestep_common::prelude::*;
//!
//! let command = DriveCommand::QUIESCENT;
//! assert_eq!(command.to_wire(), [0u8; WIRE_LEN]);
//! ```

pub mod command;
pub mod config;
pub mod consts;
pub mod io;
pub mod link;
pub mod motion;
pub mod prelude;
