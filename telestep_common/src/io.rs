//! Digital output capability trait.

/// Trait defining a single digital output line.
///
/// The interlock controller drives the drive-enable line through this
/// trait, so the same logic runs against a GPIO pin or the recorded
/// pin used by the test rig.
///
/// `set_level()` is called every cycle with the wanted level, not only
/// on edges. Implementations must be idempotent and must not block.
pub trait EnableLine {
    /// Drives the line to `high`.
    fn set_level(&mut self, high: bool);
}
