//! Protocol and motion constants shared by transmitter and receiver nodes.
//!
//! These values are part of the over-the-air contract: both ends of the
//! link must agree on them, which is why they live in the shared crate
//! rather than in the drive binary.

/// Number of motion axes carried by one command.
pub const AXIS_COUNT: usize = 3;

/// Nominal control cycle interval in milliseconds.
///
/// One link poll, one gate resolution and one dispatch to every axis
/// happen per cycle. The interval is a floor, not a deadline: a late
/// cycle starts the next one immediately without catch-up.
pub const CYCLE_INTERVAL_MS: u64 = 18;

/// Largest velocity magnitude an axis accepts, in speed units.
pub const VELOCITY_BOUND: u16 = 1000;

/// Largest velocity change a motion profile applies per cycle,
/// in speed units per cycle.
pub const ACCELERATION_LIMIT: u16 = 20;

/// Length of a receive pipe address in bytes.
pub const ADDRESS_LEN: usize = 5;

/// Largest datagram the radio link can deliver, in bytes.
///
/// Matches the nRF24-class payload limit. Anything longer never fits
/// on the air; the in-memory test link enforces the same cap.
pub const MAX_DATAGRAM_LEN: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceleration_cannot_exceed_velocity_bound() {
        // A ramp step larger than the bound itself would make the
        // profile oscillate around the target.
        assert!(ACCELERATION_LIMIT <= VELOCITY_BOUND);
    }

    #[test]
    fn velocity_bound_fits_wire_velocity_type() {
        assert!(VELOCITY_BOUND <= i16::MAX as u16);
    }
}
