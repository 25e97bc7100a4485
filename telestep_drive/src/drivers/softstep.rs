//! Software motion profile backend.
//!
//! `SoftStep` implements the per-axis ramp and step generation in
//! plain arithmetic, standing in for a hardware step generator. It
//! exists for the simulation binary and the test rig, but the physics
//! are honest: acceleration-limited velocity ramp, fractional step
//! accumulation, signed position tracking.

use std::time::Duration;

use telestep_common::consts::{ACCELERATION_LIMIT, CYCLE_INTERVAL_MS, VELOCITY_BOUND};
use telestep_common::motion::MotionProfile;

/// Simulated step generator for one axis.
///
/// Velocities are in speed units of steps per second. One `advance()`
/// covers one control cycle of `tick` duration; the acceleration
/// limit applies per advance, matching the wire contract.
#[derive(Debug, Clone)]
pub struct SoftStep {
    /// Largest velocity magnitude, steps/s.
    bound: f64,
    /// Largest velocity change per advance, steps/s.
    accel_per_tick: f64,
    /// Seconds covered by one advance.
    tick: f64,
    /// Ramp target, steps/s.
    target: f64,
    /// Current velocity, steps/s.
    velocity: f64,
    /// Fractional step carry between cycles.
    accum: f64,
    /// Net signed steps emitted since construction.
    position: i64,
    /// Total step pulses emitted, direction-independent.
    pulses: u64,
}

impl SoftStep {
    /// Profile covering one default control cycle per advance.
    pub fn new() -> Self {
        Self::with_tick(Duration::from_millis(CYCLE_INTERVAL_MS))
    }

    /// Profile covering `tick` per advance.
    pub fn with_tick(tick: Duration) -> Self {
        Self {
            bound: VELOCITY_BOUND as f64,
            accel_per_tick: ACCELERATION_LIMIT as f64,
            tick: tick.as_secs_f64(),
            target: 0.0,
            velocity: 0.0,
            accum: 0.0,
            position: 0,
            pulses: 0,
        }
    }

    /// Current ramp velocity in steps/s.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current ramp target in steps/s.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Net signed steps emitted since construction.
    pub const fn position(&self) -> i64 {
        self.position
    }

    /// Total pulses emitted regardless of direction.
    pub const fn pulses(&self) -> u64 {
        self.pulses
    }

    /// Whether the ramp has settled at zero velocity.
    pub fn is_standstill(&self) -> bool {
        self.velocity == 0.0 && self.target == 0.0
    }
}

impl Default for SoftStep {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionProfile for SoftStep {
    fn set_velocity_bound(&mut self, bound: u16) {
        self.bound = bound as f64;
        self.target = self.target.clamp(-self.bound, self.bound);
    }

    fn set_acceleration_limit(&mut self, limit: u16) {
        self.accel_per_tick = limit as f64;
    }

    fn set_target_velocity(&mut self, velocity: i16) {
        self.target = (velocity as f64).clamp(-self.bound, self.bound);
    }

    fn command_stop(&mut self) {
        self.target = 0.0;
    }

    fn advance(&mut self) {
        // One acceleration-limited step toward the target.
        let delta = self.target - self.velocity;
        self.velocity += delta.clamp(-self.accel_per_tick, self.accel_per_tick);

        // Integrate into whole step pulses, carrying the fraction.
        self.accum += self.velocity * self.tick;
        let whole = self.accum.trunc();
        self.accum -= whole;
        let steps = whole as i64;
        self.position += steps;
        self.pulses += steps.unsigned_abs();
    }
}
