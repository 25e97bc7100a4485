//! Recording digital output backend.

use telestep_common::io::EnableLine;

/// Enable line that remembers every level driven onto it.
///
/// Stands in for a GPIO pin in the simulation binary and the test
/// rig. The write history lets tests assert not just the final level
/// but the order the line moved through, which matters for the
/// interlock's "safe before anything else" guarantee.
#[derive(Debug, Default)]
pub struct RecordedPin {
    level: bool,
    writes: Vec<bool>,
}

impl RecordedPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level currently driven. Meaningless before the first write.
    pub const fn level(&self) -> bool {
        self.level
    }

    /// Every level driven onto the line, in order.
    pub fn writes(&self) -> &[bool] {
        &self.writes
    }
}

impl EnableLine for RecordedPin {
    fn set_level(&mut self, high: bool) {
        self.level = high;
        self.writes.push(high);
    }
}
