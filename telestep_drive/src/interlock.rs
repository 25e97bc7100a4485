//! Global drive-enable interlock.
//!
//! The enable line is active-low at the power stage: driving it high
//! de-energises every axis at once, independent of whatever step
//! pulses the profiles are producing. The controller owns that
//! inversion so the rest of the code reasons in logical enable terms
//! and can never write a raw level.

use telestep_common::io::EnableLine;

/// Owns the enable line and maps logical enable onto its level.
pub struct InterlockController<E: EnableLine> {
    line: E,
}

impl<E: EnableLine> InterlockController<E> {
    /// Takes ownership of the line and immediately drives it to the
    /// disabled level, so the power stage is known-off from the first
    /// instruction on.
    pub fn new(mut line: E) -> Self {
        line.set_level(true);
        Self { line }
    }

    /// Dispatches this cycle's logical enable. Called every cycle,
    /// not only on changes.
    pub fn apply(&mut self, enable: bool) {
        self.line.set_level(!enable);
    }

    pub fn line(&self) -> &E {
        &self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordedLine {
        levels: Vec<bool>,
    }

    impl EnableLine for RecordedLine {
        fn set_level(&mut self, high: bool) {
            self.levels.push(high);
        }
    }

    #[test]
    fn construction_drives_disabled_level() {
        let interlock = InterlockController::new(RecordedLine::default());
        assert_eq!(interlock.line().levels, vec![true]);
    }

    #[test]
    fn logical_enable_is_inverted_onto_the_line() {
        let mut interlock = InterlockController::new(RecordedLine::default());
        interlock.apply(true);
        interlock.apply(false);
        interlock.apply(true);
        assert_eq!(interlock.line().levels, vec![true, false, true, false]);
    }

    #[test]
    fn apply_writes_every_cycle_even_without_changes() {
        let mut interlock = InterlockController::new(RecordedLine::default());
        for _ in 0..4 {
            interlock.apply(false);
        }
        assert_eq!(interlock.line().levels, vec![true; 5]);
    }
}
