//! Drive command model and its over-the-air byte layout.
//!
//! A command is a complete snapshot of the wanted drive state: one
//! activity/velocity pair per axis plus the global enable bit. Commands
//! carry no deltas and no sequence numbers, so a single received
//! datagram is sufficient to (re)construct the full target state.
//!
//! # Wire layout
//!
//! The packed little-endian image is `WIRE_LEN` bytes:
//!
//! | Offset | Size | Field             |
//! |--------|------|-------------------|
//! | 0      | 1    | X active flag     |
//! | 1      | 2    | X velocity (i16)  |
//! | 3      | 1    | Y active flag     |
//! | 4      | 2    | Y velocity (i16)  |
//! | 6      | 1    | Z active flag     |
//! | 7      | 2    | Z velocity (i16)  |
//! | 9      | 1    | global enable     |
//!
//! Flag bytes decode as "nonzero means true". Velocities are signed
//! two's-complement little-endian.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

use crate::consts::{AXIS_COUNT, MAX_DATAGRAM_LEN};

/// Exact length of an encoded [`DriveCommand`] in bytes.
pub const WIRE_LEN: usize = 10;

// Three (flag, i16) pairs plus the enable byte; and the whole image
// must fit in one radio datagram.
const_assert!(WIRE_LEN == AXIS_COUNT * 3 + 1);
const_assert!(WIRE_LEN <= MAX_DATAGRAM_LEN);

// ─── Axis Identity ───────────────────────────────────────────────────

/// Identity of one motion axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All axes in wire order.
    pub const ALL: [Axis; AXIS_COUNT] = [Axis::X, Axis::Y, Axis::Z];

    /// Zero-based index, matching the position in [`Axis::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Command Types ───────────────────────────────────────────────────

/// Target state for a single axis.
///
/// `velocity` is in speed units, sign giving direction. The field is
/// meaningful only while `active` is set; an inactive axis decelerates
/// to standstill regardless of the carried velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisCommand {
    pub active: bool,
    pub velocity: i16,
}

impl AxisCommand {
    /// Inactive, zero velocity.
    pub const STOP: Self = Self {
        active: false,
        velocity: 0,
    };
}

/// Complete per-cycle drive command: three axes plus the global enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriveCommand {
    pub x: AxisCommand,
    pub y: AxisCommand,
    pub z: AxisCommand,
    /// Global drive enable. `false` de-energises the power stage of all
    /// axes at once via the interlock line.
    pub enable: bool,
}

impl DriveCommand {
    /// The safe state: every axis stopped, power stage disabled.
    ///
    /// Encodes to an all-zero wire image.
    pub const QUIESCENT: Self = Self {
        x: AxisCommand::STOP,
        y: AxisCommand::STOP,
        z: AxisCommand::STOP,
        enable: false,
    };

    /// Projects the command for one axis.
    pub const fn axis(&self, axis: Axis) -> AxisCommand {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Encodes into the packed little-endian wire image.
    pub fn to_wire(&self) -> [u8; WIRE_LEN] {
        let mut buf = [0u8; WIRE_LEN];
        buf[0] = self.x.active as u8;
        buf[1..3].copy_from_slice(&self.x.velocity.to_le_bytes());
        buf[3] = self.y.active as u8;
        buf[4..6].copy_from_slice(&self.y.velocity.to_le_bytes());
        buf[6] = self.z.active as u8;
        buf[7..9].copy_from_slice(&self.z.velocity.to_le_bytes());
        buf[9] = self.enable as u8;
        buf
    }

    /// Decodes a wire image.
    ///
    /// Total over all byte values: flags decode nonzero-as-true and
    /// every i16 bit pattern is a valid velocity. Out-of-bound
    /// velocities are passed through here; the axis driver clamps them
    /// at dispatch.
    pub fn from_wire(bytes: &[u8; WIRE_LEN]) -> Self {
        Self {
            x: AxisCommand {
                active: bytes[0] != 0,
                velocity: i16::from_le_bytes([bytes[1], bytes[2]]),
            },
            y: AxisCommand {
                active: bytes[3] != 0,
                velocity: i16::from_le_bytes([bytes[4], bytes[5]]),
            },
            z: AxisCommand {
                active: bytes[6] != 0,
                velocity: i16::from_le_bytes([bytes[7], bytes[8]]),
            },
            enable: bytes[9] != 0,
        }
    }
}
