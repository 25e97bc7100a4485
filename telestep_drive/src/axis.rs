//! Per-axis command dispatch.
//!
//! An [`AxisDriver`] sits between the gate and one motion profile. It
//! enforces the velocity bound, translates the wire command into
//! profile calls and guarantees the profile's cycle contract: exactly
//! one `advance()` per dispatched cycle, active or not. Skipping the
//! tick on inactive axes would freeze a deceleration ramp mid-flight
//! and leave the motor spinning at its last velocity.

use tracing::debug;

use telestep_common::command::{Axis, AxisCommand};
use telestep_common::motion::MotionProfile;

/// Last state dispatched to the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisState {
    pub active: bool,
    /// Velocity handed to the profile after clamping. Zero when
    /// inactive.
    pub velocity: i16,
}

/// Drives one motion profile from per-cycle axis commands.
pub struct AxisDriver<M: MotionProfile> {
    axis: Axis,
    profile: M,
    state: AxisState,
    bound: i16,
}

impl<M: MotionProfile> AxisDriver<M> {
    /// Wraps `profile`, configuring it with the given motion limits.
    pub fn new(axis: Axis, mut profile: M, velocity_bound: u16, acceleration_limit: u16) -> Self {
        profile.set_velocity_bound(velocity_bound);
        profile.set_acceleration_limit(acceleration_limit);
        Self {
            axis,
            profile,
            state: AxisState::default(),
            bound: velocity_bound.min(i16::MAX as u16) as i16,
        }
    }

    /// Dispatches one cycle's command to the profile.
    ///
    /// Active commands set the clamped velocity as the ramp target;
    /// inactive ones command a stop. Either way the profile is
    /// advanced exactly once.
    pub fn apply(&mut self, command: AxisCommand) {
        if command.active {
            let clamped = command.velocity.clamp(-self.bound, self.bound);
            if clamped != command.velocity {
                debug!(
                    axis = self.axis.label(),
                    requested = command.velocity,
                    clamped,
                    "velocity outside bound"
                );
            }
            self.profile.set_target_velocity(clamped);
            self.state = AxisState {
                active: true,
                velocity: clamped,
            };
        } else {
            self.profile.command_stop();
            self.state = AxisState {
                active: false,
                velocity: 0,
            };
        }
        self.profile.advance();
    }

    pub const fn axis(&self) -> Axis {
        self.axis
    }

    pub const fn state(&self) -> AxisState {
        self.state
    }

    pub fn profile(&self) -> &M {
        &self.profile
    }
}
