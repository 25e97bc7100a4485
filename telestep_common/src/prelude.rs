//! Prelude module for common re-exports.
//!
//! Consumers can do `use telestep_common::prelude::*;` and get the
//! most important types without listing individual paths.

use std::time::Duration;

// ─── Wire protocol ──────────────────────────────────────────────────
pub use crate::command::{Axis, AxisCommand, DriveCommand, WIRE_LEN};

// ─── Capability traits ──────────────────────────────────────────────
pub use crate::io::EnableLine;
pub use crate::link::{LinkError, PipeAddress, Transceiver};
pub use crate::motion::MotionProfile;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, DriveConfig, LogLevel};

// ─── System constants ───────────────────────────────────────────────
pub use crate::consts::{
    ACCELERATION_LIMIT, ADDRESS_LEN, AXIS_COUNT, CYCLE_INTERVAL_MS, MAX_DATAGRAM_LEN,
    VELOCITY_BOUND,
};

/// Default cycle interval as a Duration.
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_millis(CYCLE_INTERVAL_MS);
