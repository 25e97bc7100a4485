//! Motion profile capability trait.
//!
//! A motion profile owns the velocity ramp and step generation for one
//! axis. The axis driver feeds it a target each cycle; the profile
//! moves the actual velocity toward that target no faster than its
//! acceleration limit and emits step pulses accordingly.

/// Trait defining the per-axis step generator.
///
/// # Units
///
/// Velocities are in speed units (the same scale as the wire command),
/// sign giving direction. The acceleration limit is in speed units per
/// cycle.
///
/// # Cycle contract
///
/// `advance()` must be called exactly once per control cycle,
/// including cycles in which the axis is stopping. A profile only
/// ramps inside `advance()`; setters change targets and limits without
/// moving anything.
pub trait MotionProfile {
    /// Sets the largest velocity magnitude the profile will run at.
    /// Targets beyond the bound are clamped to it.
    fn set_velocity_bound(&mut self, bound: u16);

    /// Sets the largest velocity change applied per `advance()`.
    fn set_acceleration_limit(&mut self, limit: u16);

    /// Sets the velocity the ramp works toward.
    fn set_target_velocity(&mut self, velocity: i16);

    /// Sets the target to zero so the ramp decelerates to standstill.
    fn command_stop(&mut self);

    /// Executes one cycle: one acceleration-limited velocity step plus
    /// the step pulses due at the resulting velocity.
    fn advance(&mut self);
}
